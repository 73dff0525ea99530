//! Stats handlers: column stats, heatmap, refresh and display selection.

use axum::{extract::State, Json};
use indexmap::IndexMap;
use prepper::{Heatmap, StatsMap, VizKind, Workspace};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for the stats endpoint.
#[derive(Serialize)]
pub struct StatsResponse {
    pub stats: StatsMap,
    pub display_columns: Vec<String>,
    /// Chart per display column.
    pub viz: IndexMap<String, VizKind>,
    /// The last refresh failed; `stats` is the previous snapshot.
    pub stale: bool,
}

impl StatsResponse {
    fn of(workspace: &Workspace) -> Self {
        let display_columns = workspace.display_columns().to_vec();
        let viz = display_columns
            .iter()
            .filter_map(|c| workspace.viz_for(c).map(|kind| (c.clone(), kind)))
            .collect();

        Self {
            stats: workspace.column_stats().clone(),
            display_columns,
            viz,
            stale: workspace.stats().is_stale(),
        }
    }
}

/// Request body for a stats refresh.
#[derive(Deserialize, Default)]
pub struct RefreshBody {
    #[serde(default)]
    pub reset_defaults_if_missing: bool,
}

/// Request body for selecting display columns.
#[derive(Deserialize)]
pub struct DisplayColumnsBody {
    pub columns: Vec<String>,
}

/// Request body for choosing a chart.
#[derive(Deserialize)]
pub struct VizBody {
    pub column: String,
    pub kind: VizKind,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::of(&*state.lock().await))
}

/// GET /api/heatmap
pub async fn get_heatmap(State(state): State<AppState>) -> Json<Heatmap> {
    Json(state.lock().await.heatmap())
}

/// POST /api/refresh
pub async fn refresh_stats(
    State(state): State<AppState>,
    body: Option<Json<RefreshBody>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Json(body) = body.unwrap_or_default();

    let response = state
        .mutate(move |ws| {
            ws.refresh_stats(body.reset_defaults_if_missing)?;
            Ok(StatsResponse::of(ws))
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/display-columns
pub async fn select_display_columns(
    State(state): State<AppState>,
    Json(body): Json<DisplayColumnsBody>,
) -> Result<Json<StatsResponse>, ApiError> {
    let mut workspace = state.lock().await;
    workspace.select_display_columns(body.columns)?;
    Ok(Json(StatsResponse::of(&workspace)))
}

/// POST /api/viz
pub async fn set_viz(
    State(state): State<AppState>,
    Json(body): Json<VizBody>,
) -> Result<Json<StatsResponse>, ApiError> {
    let mut workspace = state.lock().await;
    workspace.set_viz(&body.column, body.kind)?;
    Ok(Json(StatsResponse::of(&workspace)))
}
