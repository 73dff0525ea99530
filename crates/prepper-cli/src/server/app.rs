//! Axum application setup.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Largest dataset accepted by the upload endpoint.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session
        .route("/status", get(handlers::get_status))
        .route(
            "/dataset",
            post(handlers::upload_dataset).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/preview", get(handlers::get_preview))
        .route("/transform", post(handlers::apply_transform))
        .route("/undo", post(handlers::undo_transform))
        .route("/export", get(handlers::get_export))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        .route("/heatmap", get(handlers::get_heatmap))
        .route("/refresh", post(handlers::refresh_stats))
        .route("/display-columns", post(handlers::select_display_columns))
        .route("/viz", post(handlers::set_viz))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        .route(
            "/recommendations/dismiss",
            post(handlers::dismiss_recommendation),
        )
        .route(
            "/recommendations/apply",
            post(handlers::apply_recommendation),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Start the web server and run until Ctrl+C.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
