//! Scripted analysis service for tests.

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{PrepError, Result};
use crate::input::Dataset;
use crate::session::{Session, SessionId};
use crate::stats::StatsMap;
use crate::transform::{TransformRequest, Transformation};

use super::service::{AnalysisService, TablePayload, UndoPayload};

#[derive(Debug, Default)]
struct MockState {
    table: TablePayload,
    stats: StatsMap,
    history: Vec<(TablePayload, StatsMap)>,
    sessions: usize,
    reject_sessions: Option<String>,
    reject_next_apply: Option<String>,
    reject_undo: Option<String>,
    fail_stats: bool,
    forced_can_undo: Option<bool>,
    malformed_next: bool,
    calls: Vec<String>,
}

/// Service returning a fixed table and stats.
///
/// `drop` removes the named columns from both; other transformations leave
/// them unchanged. Every mutation is pushed on a history stack so undo
/// behaves like a real service unless overridden.
#[derive(Debug, Default)]
pub struct MockService {
    state: Mutex<MockState>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `columns` and `data`.
    pub fn with_table(self, columns: &[&str], data: Vec<Vec<Value>>) -> Self {
        self.state.lock().table = TablePayload {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            data,
        };
        self
    }

    pub fn with_stats(self, stats: StatsMap) -> Self {
        self.state.lock().stats = stats;
        self
    }

    /// Replace the stats served from now on.
    pub fn set_stats(&self, stats: StatsMap) {
        self.state.lock().stats = stats;
    }

    /// Reject every dataset.
    pub fn reject_sessions(&self, message: &str) {
        self.state.lock().reject_sessions = Some(message.to_string());
    }

    /// Reject the next transformation only.
    pub fn reject_next_apply(&self, message: &str) {
        self.state.lock().reject_next_apply = Some(message.to_string());
    }

    /// Reject every undo until cleared.
    pub fn reject_undo(&self, message: Option<&str>) {
        self.state.lock().reject_undo = message.map(str::to_string);
    }

    pub fn fail_stats(&self, fail: bool) {
        self.state.lock().fail_stats = fail;
    }

    /// Report this `can_undo` regardless of history.
    pub fn force_can_undo(&self, can_undo: Option<bool>) {
        self.state.lock().forced_can_undo = can_undo;
    }

    /// Make the next table response have a short row.
    pub fn malformed_next_response(&self) {
        self.state.lock().malformed_next = true;
    }

    /// Names of the calls received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }
}

impl MockState {
    fn respond(&mut self, table: TablePayload, row_limit: usize) -> TablePayload {
        let mut table = TablePayload {
            columns: table.columns,
            data: table.data.into_iter().take(row_limit).collect(),
        };
        if std::mem::take(&mut self.malformed_next) {
            // one value short, or one too many when there are no columns
            let bad_row = match table.columns.len() {
                0 => vec![Value::Null],
                n => vec![Value::Null; n - 1],
            };
            table.data.push(bad_row);
        }
        table
    }
}

fn drop_columns(table: &TablePayload, stats: &StatsMap, columns: &[String]) -> (TablePayload, StatsMap) {
    let keep: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !columns.contains(*name))
        .map(|(i, _)| i)
        .collect();

    let table = TablePayload {
        columns: keep.iter().map(|&i| table.columns[i].clone()).collect(),
        data: table
            .data
            .iter()
            .map(|row| keep.iter().filter_map(|&i| row.get(i).cloned()).collect())
            .collect(),
    };
    let stats = stats
        .iter()
        .filter(|(name, _)| !columns.contains(*name))
        .map(|(name, stat)| (name.clone(), stat.clone()))
        .collect();
    (table, stats)
}

impl AnalysisService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    fn create_session(&self, dataset: &Dataset) -> Result<SessionId> {
        let mut state = self.state.lock();
        state.calls.push("create_session".to_string());
        if let Some(message) = &state.reject_sessions {
            return Err(PrepError::SessionCreation {
                dataset: dataset.name.clone(),
                message: message.clone(),
            });
        }
        state.sessions += 1;
        state.history.clear();
        Ok(SessionId::new(format!("mock-{}", state.sessions)))
    }

    fn preview(&self, _session: &Session, row_limit: usize) -> Result<TablePayload> {
        let mut state = self.state.lock();
        state.calls.push("preview".to_string());
        let table = state.table.clone();
        Ok(state.respond(table, row_limit))
    }

    fn apply_transformation(
        &self,
        _session: &Session,
        request: &TransformRequest,
        row_limit: usize,
    ) -> Result<TablePayload> {
        let mut state = self.state.lock();
        state.calls.push(format!("apply:{}", request.action()));
        if let Some(message) = state.reject_next_apply.take() {
            return Err(PrepError::Transformation(message));
        }

        let previous = (state.table.clone(), state.stats.clone());
        if let Transformation::Drop = request.transformation() {
            let (table, stats) = drop_columns(&state.table, &state.stats, request.columns());
            state.table = table;
            state.stats = stats;
        }
        state.history.push(previous);

        let table = state.table.clone();
        Ok(state.respond(table, row_limit))
    }

    fn undo(&self, _session: &Session, row_limit: usize) -> Result<UndoPayload> {
        let mut state = self.state.lock();
        state.calls.push("undo".to_string());
        if let Some(message) = &state.reject_undo {
            return Err(PrepError::NothingToUndo(message.clone()));
        }
        let (table, stats) = state
            .history
            .pop()
            .ok_or_else(|| PrepError::NothingToUndo("No history to undo".to_string()))?;
        state.table = table;
        state.stats = stats;

        let can_undo = state
            .forced_can_undo
            .unwrap_or(!state.history.is_empty());
        let table = state.table.clone();
        Ok(UndoPayload {
            table: state.respond(table, row_limit),
            can_undo,
        })
    }

    fn column_stats(&self, _session: &Session) -> Result<StatsMap> {
        let mut state = self.state.lock();
        state.calls.push("column_stats".to_string());
        if state.fail_stats {
            return Err(PrepError::Backend("stats unavailable".to_string()));
        }
        Ok(state.stats.clone())
    }

    fn close_session(&self, session: &Session) -> Result<()> {
        self.state
            .lock()
            .calls
            .push(format!("close_session:{}", session.id));
        Ok(())
    }
}
