//! HTTP surface of the presentation shell
//!
//! Serves the single page plus the JSON endpoints it drives.

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::models::{currency_catalog, CurrencyCode};
use crate::state::{Shell, SubmitOutcome};

const INDEX_HTML: &str = include_str!("ui/index.html");

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SelectionRequest {
    pub from: String,
    pub to: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn with_data<T: Serialize>(mut self, data: T) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub shell: Arc<Shell>,
}

/// =============================
/// Handlers
/// =============================

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "orchestrator": state.shell.orchestrator().status(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn currencies() -> Json<ApiResponse> {
    Json(ApiResponse::success(currency_catalog()))
}

async fn render_state(State(state): State<ApiState>) -> Json<ApiResponse> {
    Json(ApiResponse::success(state.shell.render().await))
}

async fn select_pair(
    State(state): State<ApiState>,
    Json(req): Json<SelectionRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let parsed = req
        .from
        .parse::<CurrencyCode>()
        .and_then(|from| req.to.parse::<CurrencyCode>().map(|to| (from, to)));

    match parsed {
        Ok((from, to)) => {
            state.shell.select_pair(from, to).await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(state.shell.render().await)),
            )
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string()))),
    }
}

async fn swap(State(state): State<ApiState>) -> Json<ApiResponse> {
    state.shell.swap().await;
    Json(ApiResponse::success(state.shell.render().await))
}

async fn convert(State(state): State<ApiState>) -> (StatusCode, Json<ApiResponse>) {
    // Detached so a dropped connection cannot leave the session marked busy.
    let shell = state.shell.clone();
    let outcome = match tokio::spawn(async move { shell.submit().await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Conversion task aborted: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Conversion task aborted: {}", e))),
            );
        }
    };

    let view = state.shell.render().await;
    match outcome {
        SubmitOutcome::Completed => (StatusCode::OK, Json(ApiResponse::success(view))),
        SubmitOutcome::Failed(message) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::error(message).with_data(view)),
        ),
        SubmitOutcome::AlreadyRunning => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("A conversion is already running".into()).with_data(view)),
        ),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(shell: Arc<Shell>) -> Router {
    let state = ApiState { shell };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/currencies", get(currencies))
        .route("/api/state", get(render_state))
        .route("/api/selection", put(select_pair))
        .route("/api/swap", post(swap))
        .route("/api/convert", post(convert))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    shell: Arc<Shell>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(shell);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Shell listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shell stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
}
