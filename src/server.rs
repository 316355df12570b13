//! HTTP server exposing the timeline to the presentation layer.
//!
//! Provides [`serve`], which wires a [`TimelineService`] into an axum router
//! and runs it until ctrl-c.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use keepsake::config::KeepsakeConfig;
use keepsake::service::TimelineService;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
}

#[derive(Debug, Serialize)]
struct ImageResponse {
    id: String,
    image: String,
}

/// Build the API router over a shared service.
pub fn router(service: Arc<TimelineService>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/summary", get(summary))
        .route("/api/timeline", get(timeline))
        .route("/api/memories/{id}/image", get(image))
        .route("/api/stats", get(stats))
        .route("/api/cache/clear", post(clear_cache))
        .with_state(service)
}

async fn summary(State(service): State<Arc<TimelineService>>) -> impl IntoResponse {
    Json(service.load_metadata().await)
}

async fn timeline(
    State(service): State<Arc<TimelineService>>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    Json(service.timeline_page(query.page).await)
}

async fn image(
    State(service): State<Arc<TimelineService>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let image = service.resolve_image_by_id(&id).await;
    Json(ImageResponse { id, image })
}

async fn stats(State(service): State<Arc<TimelineService>>) -> impl IntoResponse {
    match service.stats().await {
        Some(stats) => Json(stats).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "failed to load memories").into_response(),
    }
}

async fn clear_cache(State(service): State<Arc<TimelineService>>) -> StatusCode {
    service.clear_cache();
    StatusCode::NO_CONTENT
}

/// Start the HTTP server.
pub async fn serve(config: KeepsakeConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let service = Arc::new(TimelineService::from_config(&config)?);
    let summary = service.load_metadata().await;
    tracing::info!(
        total = summary.total,
        pages = summary.page_count,
        "memory catalog ready"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "keepsake listening at http://{bind_addr}/api");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
