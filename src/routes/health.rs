use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::{AppState, StoreBackend};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    store: &'static str,
    database: &'static str,
    timestamp: String,
    uptime: u64,
    active_sessions: usize,
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
}

async fn root(State(state): State<AppState>) -> Response {
    let database = match state.backend() {
        StoreBackend::Postgres(store) => match store.ping().await {
            Ok(()) => "connected",
            Err(err) => {
                tracing::warn!(error = %err, "database ping failed");
                "disconnected"
            }
        },
        StoreBackend::Memory(_) => "not_configured",
    };
    let healthy = database != "disconnected";

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        store: state.backend().name(),
        database,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        active_sessions: state.learning().active_sessions(),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
    })
    .into_response()
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
