//! CLI argument definitions using clap.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use prepper::TransformRequest;
use serde_json::json;

/// Prepper: undoable cleaning pipeline for tabular data
#[derive(Parser)]
#[command(name = "prepper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analysis service URL (default: in-process service)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Rows to request for each preview
    #[arg(long, global = true, value_name = "N")]
    pub rows: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a dataset: column stats, quality heatmap and recommendations
    Profile {
        /// Path to the data file (CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Number of healthiest columns to pick for visualization
        #[arg(long)]
        top: Option<usize>,
    },

    /// Run a sequence of cleaning steps and export the result
    Run {
        /// Path to the data file (CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Step to run, in order (e.g. impute:age:median, drop:id, undo, fix:city)
        #[arg(short, long = "step", value_name = "STEP", required = true)]
        steps: Vec<Step>,

        /// Write the final preview to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the final workspace status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the workspace as a JSON API
    Serve {
        /// Path to the data file (CSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Port for the web server
        #[arg(short, long, default_value = "3141")]
        port: u16,
    },
}

/// One step of a `run` pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Transform(TransformRequest),
    Undo,
    /// One-click the first visible recommendation for a column.
    Fix(String),
    /// Dismiss every visible recommendation for a column.
    Dismiss(String),
}

fn split_columns(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("undo") {
            return Ok(Step::Undo);
        }

        let mut parts = s.splitn(3, ':');
        let action = parts.next().unwrap_or_default().to_lowercase();
        let target = parts
            .next()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| format!("Step '{}' names no columns", s))?;
        let method = parts.next();

        let params = match (action.as_str(), method) {
            ("fix", None) => return Ok(Step::Fix(target.trim().to_string())),
            ("dismiss", None) => return Ok(Step::Dismiss(target.trim().to_string())),
            ("impute", Some(method)) => match method.split_once('=') {
                Some((method, value)) => json!({ "method": method, "value": value }),
                None => json!({ "method": method }),
            },
            ("impute", None) => {
                return Err(format!(
                    "Step '{}' needs a method: impute:COLS:mean|median|mode|constant=VALUE",
                    s
                ));
            }
            ("encode" | "scale", Some(method)) => json!({ "method": method }),
            ("encode" | "scale" | "drop", None) => json!({}),
            _ => return Err(format!("Unknown step '{}'", s)),
        };

        TransformRequest::from_parts(&action, split_columns(target), &params)
            .map(Step::Transform)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepper::transform::{EncodeMethod, ImputeMethod, ScaleMethod};
    use prepper::Transformation;

    fn transform(step: &str) -> TransformRequest {
        match step.parse::<Step>().unwrap() {
            Step::Transform(req) => req,
            other => panic!("expected a transformation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_impute() {
        let req = transform("impute:age,income:median");
        assert_eq!(req.columns(), ["age", "income"]);
        assert_eq!(
            *req.transformation(),
            Transformation::Impute {
                method: ImputeMethod::Median
            }
        );
    }

    #[test]
    fn test_parse_impute_constant_keeps_colons() {
        let req = transform("impute:city:constant=n/a:x");
        assert_eq!(
            *req.transformation(),
            Transformation::Impute {
                method: ImputeMethod::Constant("n/a:x".to_string())
            }
        );
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(
            *transform("encode:city").transformation(),
            Transformation::Encode {
                method: EncodeMethod::Onehot
            }
        );
        assert_eq!(
            *transform("scale:age:minmax").transformation(),
            Transformation::Scale {
                method: ScaleMethod::Minmax
            }
        );
        assert_eq!(*transform("drop:id").transformation(), Transformation::Drop);
    }

    #[test]
    fn test_parse_session_steps() {
        assert_eq!("undo".parse::<Step>().unwrap(), Step::Undo);
        assert_eq!(
            "fix:age".parse::<Step>().unwrap(),
            Step::Fix("age".to_string())
        );
        assert_eq!(
            "dismiss:flag".parse::<Step>().unwrap(),
            Step::Dismiss("flag".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("impute:age".parse::<Step>().is_err());
        assert!("drop".parse::<Step>().is_err());
        assert!("drop:,".parse::<Step>().is_err());
        assert!("rename:a:b".parse::<Step>().is_err());
        assert!("scale:age:log".parse::<Step>().is_err());
    }
}
