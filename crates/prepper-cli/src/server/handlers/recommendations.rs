//! Recommendation handlers: visible list, dismissals and one-click fixes.

use axum::{extract::State, Json};
use prepper::{DismissalSet, Recommendation, Workspace};
use serde::{Deserialize, Serialize};

use super::session::PreviewResponse;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response for the recommendations endpoint.
#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub dismissed: DismissalSet,
}

impl RecommendationsResponse {
    fn of(workspace: &Workspace) -> Self {
        Self {
            recommendations: workspace.visible_recommendations(),
            dismissed: workspace.dismissals().clone(),
        }
    }
}

/// Request body naming one recommendation.
#[derive(Deserialize)]
pub struct RecommendationBody {
    pub column: String,
    pub recommendation: String,
}

/// Response after a one-click fix.
#[derive(Serialize)]
pub struct ApplyRecommendationResponse {
    /// False when the recommendation maps to no transformation.
    pub applied: bool,
    pub preview: PreviewResponse,
    pub recommendations: Vec<Recommendation>,
}

/// GET /api/recommendations
pub async fn get_recommendations(State(state): State<AppState>) -> Json<RecommendationsResponse> {
    Json(RecommendationsResponse::of(&*state.lock().await))
}

/// POST /api/recommendations/dismiss
pub async fn dismiss_recommendation(
    State(state): State<AppState>,
    Json(body): Json<RecommendationBody>,
) -> Json<RecommendationsResponse> {
    let mut workspace = state.lock().await;
    workspace.dismiss(&body.column, &body.recommendation);
    Json(RecommendationsResponse::of(&workspace))
}

/// POST /api/recommendations/apply
pub async fn apply_recommendation(
    State(state): State<AppState>,
    Json(body): Json<RecommendationBody>,
) -> Result<Json<ApplyRecommendationResponse>, ApiError> {
    let response = state
        .mutate(move |ws| {
            let applied = ws.apply_recommendation(&body.column, &body.recommendation)?;
            Ok(ApplyRecommendationResponse {
                applied,
                preview: PreviewResponse::of(ws),
                recommendations: ws.visible_recommendations(),
            })
        })
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::handlers::test_support::loaded_state;

    fn body(column: &str, recommendation: &str) -> Json<RecommendationBody> {
        Json(RecommendationBody {
            column: column.to_string(),
            recommendation: recommendation.to_string(),
        })
    }

    #[tokio::test]
    async fn test_dismiss_hides_recommendation() {
        let state = loaded_state();
        let Json(before) = get_recommendations(State(state.clone())).await;
        let first = before.recommendations[0].clone();

        let Json(after) =
            dismiss_recommendation(State(state), body(&first.column, &first.text)).await;

        assert!(!after.recommendations.contains(&first));
        assert!(after.dismissed.is_dismissed(&first.column, &first.text));
    }

    #[tokio::test]
    async fn test_one_click_drop() {
        let state = loaded_state();
        let Json(listing) = get_recommendations(State(state.clone())).await;
        let rec = listing
            .recommendations
            .iter()
            .find(|r| r.column == "flag")
            .unwrap()
            .clone();

        let Json(response) = apply_recommendation(State(state), body(&rec.column, &rec.text))
            .await
            .unwrap();

        assert!(response.applied);
        assert!(!response.preview.table.columns.contains(&"flag".to_string()));
        assert!(response.preview.can_undo);
    }

    #[tokio::test]
    async fn test_unmappable_recommendation_is_skipped() {
        let state = loaded_state();
        let Json(response) = apply_recommendation(State(state), body("age", "Looks fine"))
            .await
            .unwrap();

        assert!(!response.applied);
        assert_eq!(response.preview.undo_depth, 0);
    }
}
