//! In-process analysis service.
//!
//! Keeps a linear stack of table snapshots per session: the parsed dataset at
//! the bottom, one entry per applied transformation above it. Undo pops the
//! top; the bottom is never popped.

mod ops;
mod profile;
mod values;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{PrepError, Result};
use crate::input::{DataTable, Dataset, Parser};
use crate::session::{Session, SessionId};
use crate::stats::StatsMap;
use crate::transform::TransformRequest;

use super::service::{AnalysisService, TablePayload, UndoPayload};

use self::values::ColumnKind;

/// Bytes of the dataset hashed into a session id.
const SESSION_HASH_BYTES: usize = 1024 * 1024;

/// Runs transformations and profiling in this process.
#[derive(Default)]
pub struct LocalService {
    parser: Parser,
    sessions: RwLock<HashMap<SessionId, Vec<DataTable>>>,
}

impl LocalService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse with a custom parser (fixed delimiter, row cap).
    pub fn with_parser(parser: Parser) -> Self {
        Self {
            parser,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Snapshots held for a session, including the original table.
    pub fn stack_depth(&self, id: &SessionId) -> usize {
        self.sessions.read().get(id).map(Vec::len).unwrap_or(0)
    }

    fn parse(&self, dataset: &Dataset) -> Result<DataTable> {
        self.parser
            .parse_dataset(dataset)
            .map_err(|e| PrepError::SessionCreation {
                dataset: dataset.name.clone(),
                message: e.to_string(),
            })
    }

    /// `<sha256 of the first MiB>_<unix seconds>`, suffixed when two
    /// identical uploads land in the same second.
    fn session_id(&self, dataset: &Dataset) -> SessionId {
        let head = &dataset.bytes[..dataset.bytes.len().min(SESSION_HASH_BYTES)];
        let digest = Sha256::digest(head);
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let base = format!("{:x}_{}", digest, secs);

        let sessions = self.sessions.read();
        let mut id = SessionId::new(base.clone());
        let mut n = 1;
        while sessions.contains_key(&id) {
            id = SessionId::new(format!("{}_{}", base, n));
            n += 1;
        }
        id
    }

    /// Current table of a session. Unknown sessions start from their dataset.
    fn with_stack<R>(
        &self,
        session: &Session,
        f: impl FnOnce(&mut Vec<DataTable>) -> Result<R>,
    ) -> Result<R> {
        if !self.sessions.read().contains_key(&session.id) {
            let table = self.parse(&session.dataset)?;
            self.sessions
                .write()
                .entry(session.id.clone())
                .or_insert_with(|| vec![table]);
        }

        let mut sessions = self.sessions.write();
        let stack = sessions
            .get_mut(&session.id)
            .ok_or_else(|| PrepError::Backend(format!("Session '{}' vanished", session.id)))?;
        f(stack)
    }
}

/// First `row_limit` rows with cells typed per column.
fn payload(table: &DataTable, row_limit: usize) -> TablePayload {
    let kinds: Vec<ColumnKind> = (0..table.column_count())
        .map(|i| ColumnKind::infer(table.column_values(i)))
        .collect();

    let data = table
        .rows
        .iter()
        .take(row_limit)
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.to_json(cell))
                .collect()
        })
        .collect();

    TablePayload {
        columns: table.headers.clone(),
        data,
    }
}

fn top(stack: &[DataTable]) -> Result<&DataTable> {
    stack
        .last()
        .ok_or_else(|| PrepError::Backend("Session has no table".to_string()))
}

impl AnalysisService for LocalService {
    fn name(&self) -> &str {
        "local"
    }

    fn create_session(&self, dataset: &Dataset) -> Result<SessionId> {
        let table = self.parse(dataset)?;
        let id = self.session_id(dataset);
        info!(
            session = %id,
            rows = table.row_count(),
            columns = table.column_count(),
            "Created local session"
        );
        self.sessions.write().insert(id.clone(), vec![table]);
        Ok(id)
    }

    fn preview(&self, session: &Session, row_limit: usize) -> Result<TablePayload> {
        self.with_stack(session, |stack| Ok(payload(top(stack)?, row_limit)))
    }

    fn apply_transformation(
        &self,
        session: &Session,
        request: &TransformRequest,
        row_limit: usize,
    ) -> Result<TablePayload> {
        self.with_stack(session, |stack| {
            let next = ops::apply(top(stack)?, request)?;
            let response = payload(&next, row_limit);
            stack.push(next);
            debug!(session = %session.id, depth = stack.len() - 1, "Applied {}", request);
            Ok(response)
        })
    }

    fn undo(&self, session: &Session, row_limit: usize) -> Result<UndoPayload> {
        self.with_stack(session, |stack| {
            if stack.len() <= 1 {
                return Err(PrepError::NothingToUndo("No history to undo".to_string()));
            }
            stack.pop();
            Ok(UndoPayload {
                table: payload(top(stack)?, row_limit),
                can_undo: stack.len() > 1,
            })
        })
    }

    fn column_stats(&self, session: &Session) -> Result<StatsMap> {
        self.with_stack(session, |stack| Ok(profile::column_stats(top(stack)?)))
    }

    fn close_session(&self, session: &Session) -> Result<()> {
        if let Some(stack) = self.sessions.write().remove(&session.id) {
            debug!(session = %session.id, snapshots = stack.len(), "Closed local session");
        }
        Ok(())
    }
}
