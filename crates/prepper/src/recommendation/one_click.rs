//! Mapping recommendation text to a transformation.

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::transform::{
    EncodeMethod, ImputeMethod, ScaleMethod, TransformRequest, Transformation,
};

/// What a recommendation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    DropSuggested,
    ImputeSuggested,
    EncodeSuggested,
    ScaleSuggested,
    /// No one-click fix is available.
    Unmapped,
}

impl RecommendationKind {
    /// Classify recommendation text. Case-insensitive, first match wins:
    /// `drop`, then `imput`, then `encode`, then `scal` or `transform`.
    ///
    /// "Consider dropping or encoding this column" is a drop suggestion.
    pub fn classify(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("drop") {
            RecommendationKind::DropSuggested
        } else if text.contains("imput") {
            RecommendationKind::ImputeSuggested
        } else if text.contains("encode") {
            RecommendationKind::EncodeSuggested
        } else if text.contains("scal") || text.contains("transform") {
            RecommendationKind::ScaleSuggested
        } else {
            RecommendationKind::Unmapped
        }
    }

    /// The transformation a one-click fix applies, if any.
    pub fn transformation(&self) -> Option<Transformation> {
        match self {
            RecommendationKind::DropSuggested => Some(Transformation::Drop),
            RecommendationKind::ImputeSuggested => Some(Transformation::Impute {
                method: ImputeMethod::Mean,
            }),
            RecommendationKind::EncodeSuggested => Some(Transformation::Encode {
                method: EncodeMethod::Onehot,
            }),
            RecommendationKind::ScaleSuggested => Some(Transformation::Scale {
                method: ScaleMethod::Standard,
            }),
            RecommendationKind::Unmapped => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, RecommendationKind::Unmapped)
    }
}

/// Build the one-click request for a recommendation on `column`.
pub fn one_click_request(column: &str, text: &str) -> Result<TransformRequest> {
    let transformation = RecommendationKind::classify(text)
        .transformation()
        .ok_or_else(|| PrepError::UnmappableRecommendation(text.to_string()))?;
    TransformRequest::new(transformation, [column])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformAction;

    #[test]
    fn test_classify_original_recommendations() {
        let cases = [
            (
                "Consider dropping this column due to excessive missing data.",
                RecommendationKind::DropSuggested,
            ),
            (
                "Consider imputing missing values.",
                RecommendationKind::ImputeSuggested,
            ),
            (
                "Consider dropping or encoding this column due to high cardinality.",
                RecommendationKind::DropSuggested,
            ),
            (
                "Consider scaling or transforming this column due to high outlier risk.",
                RecommendationKind::ScaleSuggested,
            ),
            ("Encode this column", RecommendationKind::EncodeSuggested),
            ("Log-transform skewed values", RecommendationKind::ScaleSuggested),
            ("Looks fine", RecommendationKind::Unmapped),
        ];

        for (text, expected) in cases {
            assert_eq!(RecommendationKind::classify(text), expected, "{}", text);
        }
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(
            RecommendationKind::classify("DROP IT"),
            RecommendationKind::DropSuggested
        );
        assert_eq!(
            RecommendationKind::classify("Impute Missing Values"),
            RecommendationKind::ImputeSuggested
        );
    }

    #[test]
    fn test_one_click_request() {
        let req = one_click_request("age", "Consider imputing missing values.").unwrap();
        assert_eq!(req.action(), TransformAction::Impute);
        assert_eq!(req.columns(), ["age"]);
        assert_eq!(req.params()["method"], "mean");

        let req = one_click_request("age", "scale it").unwrap();
        assert_eq!(req.params()["method"], "standard");
    }

    #[test]
    fn test_unmappable() {
        let err = one_click_request("age", "Looks fine").unwrap_err();
        assert!(matches!(err, PrepError::UnmappableRecommendation(_)));
    }
}
