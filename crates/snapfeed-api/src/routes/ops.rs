//! Health and metrics endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::state::{AppState, MetricsHandle};

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// Register descriptions for every counter the service emits
pub fn describe_metrics() {
    metrics::describe_counter!("snapfeed_signups_total", "Accounts created");
    metrics::describe_counter!("snapfeed_logins_total", "Login attempts by outcome");
    metrics::describe_counter!(
        "snapfeed_authz_denied_total",
        "Mutations rejected because the caller does not own the post"
    );
    metrics::describe_counter!("snapfeed_health_checks_total", "Health check requests");
}

/// GET /health - liveness plus a database round trip
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    metrics::counter!("snapfeed_health_checks_total").increment(1);

    let database_ok = database_reachable(&state).await;
    let (status, label) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database: if database_ok { "up" } else { "down" },
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn database_reachable(state: &AppState) -> bool {
    match state.db.count_users().await {
        Ok(_) => true,
        Err(e) => {
            warn!("Health check database probe failed: {}", e);
            false
        }
    }
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}

/// GET /metrics - Prometheus metrics endpoint
async fn get_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Create metrics routes with the Prometheus handle
pub fn metrics_routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(handle)
}
