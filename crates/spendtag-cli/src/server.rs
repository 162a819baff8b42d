//! HTTP surface for the classification pipeline.
//!
//! `POST /api/ai/suggest-category` always answers 200 with a label; upstream
//! model trouble only shows up as `"source": "rule-based"`.

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use spendtag_ai::Pipeline;
use spendtag_core::{ClassificationInput, ClassificationResult, Label};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    pipeline: Pipeline,
}

/// Build the application router.
pub fn router(pipeline: Pipeline) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/categories", get(categories))
        .route("/ai/suggest-category", post(suggest_category))
        .with_state(AppState { pipeline });

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, pipeline: Pipeline) -> anyhow::Result<()> {
    let model_enabled = pipeline.model_enabled();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let local = listener.local_addr().context("reading bound address")?;

    info!(addr = %local, model_enabled, "spendtag listening");
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

// ── Handlers ──

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/categories
async fn categories() -> Json<Vec<&'static str>> {
    Json(Label::ALL.iter().map(Label::as_str).collect())
}

/// POST /api/ai/suggest-category
///
/// An unreadable body is classified as an empty expense rather than rejected.
async fn suggest_category(
    State(state): State<AppState>,
    payload: Result<Json<ClassificationInput>, JsonRejection>,
) -> Json<ClassificationResult> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable suggest-category body, classifying as empty");
            ClassificationInput::default()
        }
    };
    Json(state.pipeline.classify(&input).await)
}
