//! Session handlers: dataset upload, preview, transform, undo and export.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use prepper::{Dataset, PreviewTable, TransformRequest, Workspace, WorkspaceStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Preview plus undo availability, returned by every table-changing call.
#[derive(Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub table: PreviewTable,
    pub undo_depth: usize,
    pub can_undo: bool,
}

impl PreviewResponse {
    pub fn of(workspace: &Workspace) -> Self {
        Self {
            table: workspace.preview().clone(),
            undo_depth: workspace.undo_depth(),
            can_undo: workspace.can_undo(),
        }
    }
}

/// Query for the dataset upload.
#[derive(Deserialize)]
pub struct DatasetQuery {
    /// File name recorded for the dataset.
    pub name: Option<String>,
}

/// Request body for a transformation.
#[derive(Deserialize)]
pub struct TransformBody {
    pub action: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub params: Value,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<WorkspaceStatus> {
    Json(state.lock().await.status())
}

/// GET /api/preview
pub async fn get_preview(State(state): State<AppState>) -> Json<PreviewResponse> {
    Json(PreviewResponse::of(&*state.lock().await))
}

/// GET /api/export
pub async fn get_export(State(state): State<AppState>) -> impl IntoResponse {
    let text = state.lock().await.export();
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], text)
}

/// POST /api/dataset?name=FILE with the raw file as body.
pub async fn upload_dataset(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
    body: Bytes,
) -> Result<Json<PreviewResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Dataset body is empty".to_string()));
    }
    let name = query.name.unwrap_or_else(|| "upload.csv".to_string());
    let dataset = Dataset::from_bytes(name, body.to_vec());

    let response = state
        .mutate(move |ws| {
            ws.open(dataset)?;
            Ok(PreviewResponse::of(ws))
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/transform
pub async fn apply_transform(
    State(state): State<AppState>,
    Json(body): Json<TransformBody>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let request = TransformRequest::from_parts(&body.action, body.columns, &body.params)?;

    let response = state
        .mutate(move |ws| {
            ws.apply(request)?;
            Ok(PreviewResponse::of(ws))
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/undo
pub async fn undo_transform(
    State(state): State<AppState>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let response = state
        .mutate(|ws| {
            ws.undo()?;
            Ok(PreviewResponse::of(ws))
        })
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::handlers::test_support::loaded_state;
    use serde_json::json;

    fn body(action: &str, columns: &[&str], params: Value) -> Json<TransformBody> {
        Json(TransformBody {
            action: action.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            params,
        })
    }

    #[tokio::test]
    async fn test_transform_then_undo() {
        let state = loaded_state();

        let Json(applied) = apply_transform(State(state.clone()), body("drop", &["id"], json!({})))
            .await
            .unwrap();
        assert_eq!(applied.table.columns, vec!["age", "city", "flag"]);
        assert_eq!(applied.undo_depth, 1);
        assert!(applied.can_undo);

        let Json(undone) = undo_transform(State(state.clone())).await.unwrap();
        assert_eq!(undone.table.columns, vec!["id", "age", "city", "flag"]);
        assert!(!undone.can_undo);
    }

    #[tokio::test]
    async fn test_invalid_transform_is_bad_request() {
        let state = loaded_state();
        let err = apply_transform(State(state), body("rename", &["id"], Value::Null))
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ApiError::Prep(prepper::PrepError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_undo_without_history() {
        let state = loaded_state();
        let err = undo_transform(State(state)).await.err().unwrap();
        assert!(matches!(
            err,
            ApiError::Prep(prepper::PrepError::NothingToUndo(_))
        ));
    }

    #[tokio::test]
    async fn test_busy_workspace_rejects_mutation() {
        let state = loaded_state();
        let _held = state.lock().await;

        let err = undo_transform(State(state.clone())).await.err().unwrap();
        assert!(matches!(err, ApiError::Busy));
    }

    #[tokio::test]
    async fn test_upload_replaces_session() {
        let state = loaded_state();
        let Json(preview) = upload_dataset(
            State(state.clone()),
            Query(DatasetQuery {
                name: Some("small.csv".to_string()),
            }),
            Bytes::from_static(b"x,y\n1,2\n"),
        )
        .await
        .unwrap();

        assert_eq!(preview.table.columns, vec!["x", "y"]);
        let Json(status) = get_status(State(state)).await;
        assert_eq!(status.dataset.as_deref(), Some("small.csv"));
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let state = loaded_state();
        let err = upload_dataset(
            State(state),
            Query(DatasetQuery { name: None }),
            Bytes::new(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
