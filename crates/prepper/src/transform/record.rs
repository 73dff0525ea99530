//! Records of applied transformations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::{TransformAction, TransformRequest, Transformation};

/// One successfully applied transformation in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRecord {
    /// What was applied, with its parameters.
    pub transformation: Transformation,
    /// Target columns (never empty).
    pub columns: Vec<String>,
    /// When the service confirmed the transformation.
    pub applied_at: DateTime<Utc>,
}

impl TransformationRecord {
    /// Record a request the service has just accepted.
    pub fn from_request(request: &TransformRequest) -> Self {
        Self {
            transformation: request.transformation().clone(),
            columns: request.columns().to_vec(),
            applied_at: Utc::now(),
        }
    }

    /// The action kind of the record.
    pub fn action(&self) -> TransformAction {
        self.transformation.action()
    }
}
