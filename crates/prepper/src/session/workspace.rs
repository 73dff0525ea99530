//! The workspace: one live session and everything derived from it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{AnalysisService, TablePayload};
use crate::config::PrepperConfig;
use crate::error::{PrepError, Result};
use crate::input::Dataset;
use crate::preview::{PreviewTable, to_delimited};
use crate::recommendation::{
    DismissalSet, Recommendation, one_click_request, visible_recommendations,
};
use crate::stats::{Heatmap, StatsCache, StatsMap, VizKind};
use crate::transform::{TransformRequest, TransformationRecord};

use super::session::Session;

/// Snapshot of the workspace for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceStatus {
    pub backend: String,
    pub session_id: Option<String>,
    pub dataset: Option<String>,
    pub dataset_hash: Option<String>,
    pub preview_rows: usize,
    pub columns: usize,
    pub undo_depth: usize,
    pub can_undo: bool,
    pub history: Vec<TransformationRecord>,
    pub stats_stale: bool,
    pub display_columns: Vec<String>,
    pub visible_recommendations: usize,
    pub dismissed: usize,
}

/// Owns the current session and the state the presentation layer reads.
///
/// Mutating operations take `&mut self`, so calls against one workspace are
/// serialized. Every failing operation leaves the previous state in place.
///
/// # Example
///
/// ```no_run
/// use prepper::{Dataset, PrepperConfig, TransformRequest, Workspace};
///
/// # fn main() -> prepper::Result<()> {
/// let mut workspace = Workspace::from_config(PrepperConfig::default())?;
/// workspace.open(Dataset::from_path("data.csv")?)?;
///
/// let request = TransformRequest::from_parts("drop", ["id"], &serde_json::json!({}))?;
/// workspace.apply(request)?;
/// workspace.undo()?;
/// # Ok(())
/// # }
/// ```
pub struct Workspace {
    service: Arc<dyn AnalysisService>,
    config: PrepperConfig,
    session: Option<Session>,
    preview: PreviewTable,
    stats: StatsCache,
    dismissals: DismissalSet,
}

impl Workspace {
    /// Workspace backed by `service`.
    pub fn new(service: Arc<dyn AnalysisService>, config: PrepperConfig) -> Self {
        Self {
            service,
            config,
            session: None,
            preview: PreviewTable::default(),
            stats: StatsCache::new(),
            dismissals: DismissalSet::new(),
        }
    }

    /// Workspace backed by the service `config` names.
    pub fn from_config(config: PrepperConfig) -> Result<Self> {
        let service = config.build_service()?;
        Ok(Self::new(service, config))
    }

    pub fn config(&self) -> &PrepperConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The projected table currently shown.
    pub fn preview(&self) -> &PreviewTable {
        &self.preview
    }

    pub fn stats(&self) -> &StatsCache {
        &self.stats
    }

    pub fn dismissals(&self) -> &DismissalSet {
        &self.dismissals
    }

    pub fn undo_depth(&self) -> usize {
        self.session.as_ref().map(Session::undo_depth).unwrap_or(0)
    }

    pub fn can_undo(&self) -> bool {
        self.session.as_ref().is_some_and(Session::can_undo)
    }

    pub fn history(&self) -> &[TransformationRecord] {
        self.session.as_ref().map(Session::history).unwrap_or(&[])
    }

    fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| PrepError::InvalidRequest("No dataset is loaded".to_string()))
    }

    fn project(payload: TablePayload) -> Result<PreviewTable> {
        PreviewTable::project(payload.columns, payload.data)
    }

    /// Start a new session for `dataset`, replacing the current one.
    ///
    /// History, stats, display selection and dismissals all start over. If
    /// the service rejects the dataset the current session is kept;
    /// otherwise the replaced session is closed on the service.
    pub fn open(&mut self, dataset: Dataset) -> Result<&PreviewTable> {
        let dataset = Arc::new(dataset);
        let id = self.service.create_session(&dataset)?;
        let session = Session::new(id, Arc::clone(&dataset));
        let preview = Self::project(self.service.preview(&session, self.config.row_limit)?)?;

        info!(
            session = %session.id,
            dataset = %dataset.name,
            bytes = dataset.size_bytes(),
            backend = self.service.name(),
            "Session created"
        );

        if let Some(old) = self.session.replace(session) {
            if let Err(e) = self.service.close_session(&old) {
                warn!(session = %old.id, error = %e, "Failed to close replaced session");
            }
        }
        self.preview = preview;
        self.stats.clear();
        self.dismissals.clear();

        if let Err(e) = self.refresh_stats(true) {
            warn!(error = %e, "Initial stats load failed");
        }
        Ok(&self.preview)
    }

    /// Apply a transformation to the current session.
    ///
    /// On success the history grows by one, undo becomes available and stats
    /// are refreshed. A stats failure at that point is logged and leaves the
    /// cache marked stale; the transformation itself still counts.
    pub fn apply(&mut self, request: TransformRequest) -> Result<&PreviewTable> {
        let session = self.require_session()?;
        request.validate()?;

        if let Some(unknown) = request
            .columns()
            .iter()
            .find(|c| !self.preview.columns.contains(*c))
        {
            return Err(PrepError::InvalidRequest(format!(
                "Unknown column '{}'",
                unknown
            )));
        }

        let payload =
            self.service
                .apply_transformation(session, &request, self.config.row_limit)?;
        let preview = Self::project(payload).inspect_err(|e| {
            warn!(error = %e, "Service applied {} but its response was malformed", request);
        })?;

        if let Some(session) = self.session.as_mut() {
            session.record_applied(&request);
            info!(depth = session.undo_depth(), "Applied {}", request);
        }
        self.preview = preview;

        if let Err(e) = self.refresh_stats(false) {
            warn!(error = %e, "Stats refresh failed after transformation");
        }
        Ok(&self.preview)
    }

    /// Revert the most recent transformation.
    ///
    /// Fails with [`PrepError::NothingToUndo`] without calling the service
    /// when undo is unavailable. Availability follows the service's last
    /// `can_undo` flag, even past the end of the local history; a failed
    /// undo disables it until the next successful transformation.
    pub fn undo(&mut self) -> Result<&PreviewTable> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| PrepError::InvalidRequest("No dataset is loaded".to_string()))?;

        if !session.can_undo() {
            return Err(PrepError::NothingToUndo(
                "No transformation to undo".to_string(),
            ));
        }

        let payload = match self.service.undo(session, self.config.row_limit) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, depth = session.undo_depth(), "Undo failed; disabling undo");
                session.disable_undo();
                return Err(e);
            }
        };

        let preview = match Self::project(payload.table) {
            Ok(preview) => preview,
            Err(e) => {
                warn!(error = %e, "Undo response was malformed; disabling undo");
                session.disable_undo();
                return Err(e);
            }
        };

        let local_depth = session.undo_depth().saturating_sub(1);
        if payload.can_undo != (local_depth > 0) {
            warn!(
                local_depth,
                service_can_undo = payload.can_undo,
                "Undo availability disagrees with the service; following the service"
            );
        }
        if let Some(record) = session.record_undone(payload.can_undo) {
            info!(depth = session.undo_depth(), "Undid {}", record.transformation.describe());
        }
        self.preview = preview;

        if let Err(e) = self.refresh_stats(false) {
            warn!(error = %e, "Stats refresh failed after undo");
        }
        Ok(&self.preview)
    }

    /// Fetch stats and replace the cache wholesale, then reconcile dismissals.
    ///
    /// With `reset_defaults_if_missing`, an empty display selection is filled
    /// with the healthiest columns. On failure the old snapshot stays and is
    /// marked stale; the call can simply be retried.
    pub fn refresh_stats(&mut self, reset_defaults_if_missing: bool) -> Result<()> {
        let session = self.require_session()?;
        let stats = match self.service.column_stats(session) {
            Ok(stats) => stats,
            Err(e) => {
                self.stats.mark_stale();
                return Err(e);
            }
        };

        self.stats
            .replace(stats, reset_defaults_if_missing, self.config.display_columns);
        self.dismissals.reconcile(self.stats.stats());
        debug!(
            columns = self.stats.stats().len(),
            dismissed = self.dismissals.len(),
            "Stats refreshed"
        );
        Ok(())
    }

    /// Current stats snapshot.
    pub fn column_stats(&self) -> &StatsMap {
        self.stats.stats()
    }

    /// Hide one recommendation for one column.
    pub fn dismiss(&mut self, column: &str, recommendation: &str) {
        self.dismissals.dismiss(column, recommendation);
    }

    /// Apply the one-click fix for a recommendation and dismiss it.
    ///
    /// Returns `Ok(false)` without touching anything when the text maps to no
    /// transformation.
    pub fn apply_recommendation(&mut self, column: &str, recommendation: &str) -> Result<bool> {
        let request = match one_click_request(column, recommendation) {
            Ok(request) => request,
            Err(PrepError::UnmappableRecommendation(text)) => {
                debug!(column, recommendation = %text, "No one-click fix; skipping");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        self.apply(request)?;
        self.dismissals.dismiss(column, recommendation);
        // a drop removes the column the dismissal was keyed on
        self.dismissals.reconcile(self.stats.stats());
        Ok(true)
    }

    /// Recommendations not dismissed, in column then service order.
    pub fn visible_recommendations(&self) -> Vec<Recommendation> {
        visible_recommendations(self.stats.stats(), &self.dismissals)
    }

    pub fn heatmap(&self) -> Heatmap {
        Heatmap::from_stats(self.stats.stats())
    }

    pub fn display_columns(&self) -> &[String] {
        self.stats.display_columns()
    }

    pub fn select_display_columns<I, S>(&mut self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stats.select_display_columns(columns)
    }

    pub fn set_viz(&mut self, column: &str, kind: VizKind) -> Result<()> {
        self.stats.set_viz(column, kind)
    }

    pub fn viz_for(&self, column: &str) -> Option<VizKind> {
        self.stats.viz_for(column)
    }

    /// The preview as delimited text.
    pub fn export(&self) -> String {
        to_delimited(&self.preview, self.config.delimiter)
    }

    /// Write [`Workspace::export`] to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.export()).map_err(|e| PrepError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn status(&self) -> WorkspaceStatus {
        let session = self.session.as_ref();
        WorkspaceStatus {
            backend: self.service.name().to_string(),
            session_id: session.map(|s| s.id.to_string()),
            dataset: session.map(|s| s.dataset.name.clone()),
            dataset_hash: session.map(|s| s.dataset.hash.clone()),
            preview_rows: self.preview.row_count(),
            columns: self.preview.column_count(),
            undo_depth: self.undo_depth(),
            can_undo: self.can_undo(),
            history: self.history().to_vec(),
            stats_stale: self.stats.is_stale(),
            display_columns: self.stats.display_columns().to_vec(),
            visible_recommendations: self.visible_recommendations().len(),
            dismissed: self.dismissals.len(),
        }
    }
}
