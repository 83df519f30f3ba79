//! HTTP surface: `POST /sensors` for readings, `GET /health` for probes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::IngestError;
use crate::ingest::IngestionHandler;

const SUCCESS_MESSAGE: &str = "Data processed and updated successfully.";
const FAILURE_MESSAGE: &str = "Failed to process and update data.";

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<IngestionHandler>,
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    #[serde(rename = "Response")]
    response: &'static str,
    #[serde(rename = "Alerts")]
    alerts: Vec<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: AppState) -> Router {
    // Sensors post from arbitrary origins (browser dashboards, device
    // bridges), so this route alone is open to CORS.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let sensors = Router::new()
        .route("/sensors", post(ingest_reading))
        .layer(cors);

    Router::new()
        .merge(sensors)
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ingest_reading(State(state): State<AppState>, body: Bytes) -> Response {
    let handler = Arc::clone(&state.handler);
    let result = tokio::task::spawn_blocking(move || handler.handle_body(&body)).await;

    match result {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(IngestResponse {
                response: SUCCESS_MESSAGE,
                alerts: outcome.alerts,
            }),
        )
            .into_response(),
        Ok(Err(IngestError::Validation(e))) => {
            info!(component = "ingest", "rejected reading: {e}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Ok(Err(e)) => {
            error!(component = "ingest", "reading not processed: {e}");
            internal_error()
        }
        Err(join_err) => {
            error!(component = "ingest", "ingestion task aborted: {join_err}");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": FAILURE_MESSAGE })),
    )
        .into_response()
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(component = "system", "listening on {addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(component = "system", "failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!(component = "system", "shutdown signal received");
}
