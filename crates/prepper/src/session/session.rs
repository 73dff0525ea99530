//! A session bound to one dataset snapshot.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::input::Dataset;
use crate::transform::{TransformRequest, TransformationRecord};

/// Opaque session token issued by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A session and its linear transformation history.
///
/// The history length is the local undo depth. `can_undo` mirrors the
/// service's last word on whether undo is possible, which wins over the local
/// depth in both directions: it may be false while history is non-empty
/// (after a failed undo) and true while history is empty (when a malformed
/// apply response left the local record behind the service).
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub dataset: Arc<Dataset>,
    pub created_at: DateTime<Utc>,
    history: Vec<TransformationRecord>,
    can_undo: bool,
}

impl Session {
    /// Bind a fresh session to `dataset`. History starts empty.
    pub fn new(id: SessionId, dataset: Arc<Dataset>) -> Self {
        Self {
            id,
            dataset,
            created_at: Utc::now(),
            history: Vec::new(),
            can_undo: false,
        }
    }

    /// Applied transformations, oldest first.
    pub fn history(&self) -> &[TransformationRecord] {
        &self.history
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Whether undo is offered; the service's flag, not the local depth.
    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    pub(crate) fn record_applied(&mut self, request: &TransformRequest) {
        self.history.push(TransformationRecord::from_request(request));
        self.can_undo = true;
    }

    /// Pop one record and adopt the service's flag. Returns the popped record.
    ///
    /// When the service says nothing is left to undo, local history is
    /// cleared so the two cannot drift apart.
    pub(crate) fn record_undone(&mut self, service_can_undo: bool) -> Option<TransformationRecord> {
        let popped = self.history.pop();
        if !service_can_undo {
            self.history.clear();
        }
        self.can_undo = service_can_undo;
        popped
    }

    pub(crate) fn disable_undo(&mut self) {
        self.can_undo = false;
    }
}
