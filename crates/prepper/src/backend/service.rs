//! The contract the workspace needs from an analysis service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::input::Dataset;
use crate::session::{Session, SessionId};
use crate::stats::StatsMap;
use crate::transform::TransformRequest;

/// A table as the service returns it: column names plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

/// Response to an undo: the restored table and whether more undo is possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoPayload {
    #[serde(flatten)]
    pub table: TablePayload,
    pub can_undo: bool,
}

/// Executes transformations and computes column statistics for sessions.
///
/// The service owns each session's transformation history; the client only
/// mirrors its depth. Calls block until the service answers.
pub trait AnalysisService: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Ingest a dataset and start a session for it.
    fn create_session(&self, dataset: &Dataset) -> Result<SessionId>;

    /// First `row_limit` rows of the session's current table.
    fn preview(&self, session: &Session, row_limit: usize) -> Result<TablePayload>;

    /// Apply one transformation and record it for undo.
    fn apply_transformation(
        &self,
        session: &Session,
        request: &TransformRequest,
        row_limit: usize,
    ) -> Result<TablePayload>;

    /// Revert the most recent transformation.
    fn undo(&self, session: &Session, row_limit: usize) -> Result<UndoPayload>;

    /// Statistics for every column of the current table.
    fn column_stats(&self, session: &Session) -> Result<StatsMap>;

    /// Release whatever the service holds for a session the client has
    /// replaced. The session must not be used afterwards.
    fn close_session(&self, session: &Session) -> Result<()>;
}
