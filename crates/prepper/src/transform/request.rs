//! Typed transformation requests.
//!
//! Untyped input (CLI steps, HTTP bodies) is parsed with
//! [`TransformRequest::from_parts`]; anything that violates the request
//! contract is rejected here with [`PrepError::InvalidRequest`] and never
//! reaches the analysis service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{PrepError, Result};

/// The kind of transformation, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformAction {
    Impute,
    Encode,
    Scale,
    Drop,
}

impl TransformAction {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformAction::Impute => "impute",
            TransformAction::Encode => "encode",
            TransformAction::Scale => "scale",
            TransformAction::Drop => "drop",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TransformAction::Impute => "Impute Missing Values",
            TransformAction::Encode => "Encode Categorical",
            TransformAction::Scale => "Scale Numeric",
            TransformAction::Drop => "Drop Columns",
        }
    }
}

impl FromStr for TransformAction {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "impute" => Ok(TransformAction::Impute),
            "encode" => Ok(TransformAction::Encode),
            "scale" => Ok(TransformAction::Scale),
            "drop" => Ok(TransformAction::Drop),
            other => Err(PrepError::InvalidRequest(format!(
                "Unknown action '{}'. Use impute, encode, scale, or drop.",
                other
            ))),
        }
    }
}

impl fmt::Display for TransformAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How missing values are filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method", content = "value")]
pub enum ImputeMethod {
    Mean,
    Median,
    Mode,
    /// Fill with a fixed, non-empty value.
    Constant(String),
}

impl ImputeMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImputeMethod::Mean => "mean",
            ImputeMethod::Median => "median",
            ImputeMethod::Mode => "mode",
            ImputeMethod::Constant(_) => "constant",
        }
    }

    /// Parse a method name plus the optional constant value.
    pub fn parse(method: &str, value: Option<&str>) -> Result<Self> {
        match method.trim().to_lowercase().as_str() {
            "mean" => Ok(ImputeMethod::Mean),
            "median" => Ok(ImputeMethod::Median),
            "mode" => Ok(ImputeMethod::Mode),
            "constant" => match value {
                Some(v) if !v.is_empty() => Ok(ImputeMethod::Constant(v.to_string())),
                _ => Err(PrepError::InvalidRequest(
                    "Constant imputation requires a non-empty value".to_string(),
                )),
            },
            other => Err(PrepError::InvalidRequest(format!(
                "Unknown imputation method '{}'. Use mean, median, mode, or constant.",
                other
            ))),
        }
    }
}

/// How categorical columns are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeMethod {
    #[default]
    Onehot,
    Ordinal,
}

impl EncodeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeMethod::Onehot => "onehot",
            EncodeMethod::Ordinal => "ordinal",
        }
    }
}

impl FromStr for EncodeMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "onehot" | "one-hot" => Ok(EncodeMethod::Onehot),
            "ordinal" => Ok(EncodeMethod::Ordinal),
            other => Err(PrepError::InvalidRequest(format!(
                "Unknown encoding method '{}'. Use onehot or ordinal.",
                other
            ))),
        }
    }
}

/// How numeric columns are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    #[default]
    Standard,
    Minmax,
}

impl ScaleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMethod::Standard => "standard",
            ScaleMethod::Minmax => "minmax",
        }
    }
}

impl FromStr for ScaleMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ScaleMethod::Standard),
            "minmax" | "min-max" => Ok(ScaleMethod::Minmax),
            other => Err(PrepError::InvalidRequest(format!(
                "Unknown scaling method '{}'. Use standard or minmax.",
                other
            ))),
        }
    }
}

/// A transformation together with its action-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Transformation {
    Impute {
        #[serde(flatten)]
        method: ImputeMethod,
    },
    Encode { method: EncodeMethod },
    Scale { method: ScaleMethod },
    Drop,
}

impl Transformation {
    /// The action kind of this transformation.
    pub fn action(&self) -> TransformAction {
        match self {
            Transformation::Impute { .. } => TransformAction::Impute,
            Transformation::Encode { .. } => TransformAction::Encode,
            Transformation::Scale { .. } => TransformAction::Scale,
            Transformation::Drop => TransformAction::Drop,
        }
    }

    /// Check parameters that the type alone cannot rule out.
    pub fn validate(&self) -> Result<()> {
        match self {
            Transformation::Impute {
                method: ImputeMethod::Constant(value),
            } if value.is_empty() => Err(PrepError::InvalidRequest(
                "Constant imputation requires a non-empty value".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Wire parameters (`{"method": ..., "value": ...}`).
    pub fn params(&self) -> Value {
        match self {
            Transformation::Impute { method } => match method {
                ImputeMethod::Constant(value) => json!({ "method": "constant", "value": value }),
                other => json!({ "method": other.as_str() }),
            },
            Transformation::Encode { method } => json!({ "method": method.as_str() }),
            Transformation::Scale { method } => json!({ "method": method.as_str() }),
            Transformation::Drop => Value::Object(Map::new()),
        }
    }

    /// Short description, e.g. `impute (median)`.
    pub fn describe(&self) -> String {
        match self {
            Transformation::Impute { method } => match method {
                ImputeMethod::Constant(v) => format!("impute (constant '{}')", v),
                other => format!("impute ({})", other.as_str()),
            },
            Transformation::Encode { method } => format!("encode ({})", method.as_str()),
            Transformation::Scale { method } => format!("scale ({})", method.as_str()),
            Transformation::Drop => "drop".to_string(),
        }
    }
}

/// A validated request to transform a set of columns.
///
/// Fields are private so a request cannot be emptied after validation;
/// deserialized requests go through the same checks as [`TransformRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTransformRequest")]
pub struct TransformRequest {
    transformation: Transformation,
    columns: Vec<String>,
}

#[derive(Deserialize)]
struct RawTransformRequest {
    transformation: Transformation,
    columns: Vec<String>,
}

impl TryFrom<RawTransformRequest> for TransformRequest {
    type Error = PrepError;

    fn try_from(raw: RawTransformRequest) -> Result<Self> {
        Self::new(raw.transformation, raw.columns)
    }
}

impl TransformRequest {
    /// Build a request, validating the parameters and the column set.
    ///
    /// Columns are de-duplicated, keeping first-seen order.
    pub fn new<I, S>(transformation: Transformation, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if !unique.contains(&column) {
                unique.push(column);
            }
        }

        let request = Self {
            transformation,
            columns: unique,
        };
        request.validate()?;
        Ok(request)
    }

    /// Re-check the request contract: valid parameters, at least one
    /// column, no empty column names.
    pub fn validate(&self) -> Result<()> {
        self.transformation.validate()?;

        if self.columns.is_empty() {
            return Err(PrepError::InvalidRequest(
                "At least one column must be selected".to_string(),
            ));
        }
        if self.columns.iter().any(|c| c.is_empty()) {
            return Err(PrepError::InvalidRequest(
                "Column names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Target columns, never empty.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Parse an untyped `(action, columns, params)` triple.
    ///
    /// `params` follows the wire shape: `{"method": "...", "value": "..."}`.
    /// Encode and scale default to `onehot` and `standard`; impute has no
    /// default method.
    pub fn from_parts<I, S>(action: &str, columns: I, params: &Value) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action: TransformAction = action.parse()?;
        let method = params.get("method").and_then(Value::as_str);

        let transformation = match action {
            TransformAction::Impute => {
                let method = method.ok_or_else(|| {
                    PrepError::InvalidRequest("Imputation requires a method".to_string())
                })?;
                let value = params.get("value").and_then(Value::as_str);
                Transformation::Impute {
                    method: ImputeMethod::parse(method, value)?,
                }
            }
            TransformAction::Encode => Transformation::Encode {
                method: method
                    .map(str::parse::<EncodeMethod>)
                    .transpose()?
                    .unwrap_or_default(),
            },
            TransformAction::Scale => Transformation::Scale {
                method: method
                    .map(str::parse::<ScaleMethod>)
                    .transpose()?
                    .unwrap_or_default(),
            },
            TransformAction::Drop => Transformation::Drop,
        };

        Self::new(transformation, columns)
    }

    /// The action kind of this request.
    pub fn action(&self) -> TransformAction {
        self.transformation.action()
    }

    /// Wire parameters for the request.
    pub fn params(&self) -> Value {
        self.transformation.params()
    }
}

impl fmt::Display for TransformRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on [{}]",
            self.transformation.describe(),
            self.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_impute_constant() {
        let req = TransformRequest::from_parts(
            "impute",
            ["city"],
            &json!({ "method": "constant", "value": "Unknown" }),
        )
        .unwrap();

        assert_eq!(req.action(), TransformAction::Impute);
        assert_eq!(
            req.params(),
            json!({ "method": "constant", "value": "Unknown" })
        );
    }

    #[test]
    fn test_constant_requires_value() {
        let err = TransformRequest::from_parts("impute", ["a"], &json!({ "method": "constant" }))
            .unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));

        let err = TransformRequest::from_parts(
            "impute",
            ["a"],
            &json!({ "method": "constant", "value": "" }),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_impute_requires_known_method() {
        let err =
            TransformRequest::from_parts("impute", ["a"], &json!({ "method": "knn" })).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));

        let err = TransformRequest::from_parts("impute", ["a"], &json!({})).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = TransformRequest::from_parts("rename", ["a"], &json!({})).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_empty_columns_rejected() {
        let err = TransformRequest::new(Transformation::Drop, Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_columns_deduplicated_in_order() {
        let req = TransformRequest::new(Transformation::Drop, ["b", "a", "b"]).unwrap();
        assert_eq!(req.columns(), ["b", "a"]);
    }

    #[test]
    fn test_new_rejects_empty_constant() {
        let err = TransformRequest::new(
            Transformation::Impute {
                method: ImputeMethod::Constant(String::new()),
            },
            ["a"],
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_new_rejects_empty_column_name() {
        let err = TransformRequest::new(Transformation::Drop, ["a", ""]).unwrap_err();
        assert!(matches!(err, PrepError::InvalidRequest(_)));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: TransformRequest = serde_json::from_value(json!({
            "transformation": { "action": "drop" },
            "columns": ["a", "a"]
        }))
        .unwrap();
        assert_eq!(ok.columns(), ["a"]);

        let no_columns = serde_json::from_value::<TransformRequest>(json!({
            "transformation": { "action": "drop" },
            "columns": []
        }));
        assert!(no_columns.is_err());

        let empty_constant = serde_json::from_value::<TransformRequest>(json!({
            "transformation": { "action": "impute", "method": "constant", "value": "" },
            "columns": ["a"]
        }));
        assert!(empty_constant.is_err());
    }

    #[test]
    fn test_transformation_serializes_flat() {
        let constant = Transformation::Impute {
            method: ImputeMethod::Constant("x".to_string()),
        };
        let value = serde_json::to_value(&constant).unwrap();
        assert_eq!(
            value,
            json!({ "action": "impute", "method": "constant", "value": "x" })
        );
        assert_eq!(
            serde_json::from_value::<Transformation>(value).unwrap(),
            constant
        );

        let median = Transformation::Impute {
            method: ImputeMethod::Median,
        };
        assert_eq!(
            serde_json::to_value(&median).unwrap(),
            json!({ "action": "impute", "method": "median" })
        );
        assert_eq!(
            serde_json::to_value(Transformation::Encode {
                method: EncodeMethod::Ordinal
            })
            .unwrap(),
            json!({ "action": "encode", "method": "ordinal" })
        );
    }

    #[test]
    fn test_encode_and_scale_defaults() {
        let enc = TransformRequest::from_parts("encode", ["c"], &json!({})).unwrap();
        assert_eq!(enc.params(), json!({ "method": "onehot" }));

        let scale = TransformRequest::from_parts("scale", ["n"], &Value::Null).unwrap();
        assert_eq!(scale.params(), json!({ "method": "standard" }));

        let drop = TransformRequest::from_parts("drop", ["n"], &json!({})).unwrap();
        assert_eq!(drop.params(), json!({}));
    }

    #[test]
    fn test_display() {
        let req = TransformRequest::new(
            Transformation::Scale {
                method: ScaleMethod::Minmax,
            },
            ["x", "y"],
        )
        .unwrap();
        assert_eq!(req.to_string(), "scale (minmax) on [x, y]");
    }
}
