//! API routes

mod auth;
mod ops;
mod pages;
mod posts;
pub mod types;


use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use snapfeed_auth::session_middleware;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::state::{AppState, MetricsHandle};

pub use auth::{clear_session_cookie, session_cookie};
pub use ops::describe_metrics;

/// Create the main router
///
/// Everything except signup, login and health sits behind the session
/// middleware, which rejects the request before any handler runs.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let protected = Router::new()
        .route("/", get(posts::feed))
        .route("/post", post(posts::create_post))
        .route("/delete/{id}", post(posts::delete_post))
        .route("/update/{id}", post(posts::update_post))
        .route("/logout", get(auth::logout))
        .nest_service("/uploads", ServeDir::new(state.images.root()))
        .route_layer(from_fn_with_state(state.tokens.clone(), session_middleware));

    let body_limit = state.max_upload_bytes;

    let mut router = Router::new()
        .merge(ops::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(ops::metrics_routes(handle));
    }

    router
}
