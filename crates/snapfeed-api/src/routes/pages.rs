//! Embedded signup and login pages

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rust_embed::Embed;

/// Static form pages bundled into the binary
#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../static"]
struct Pages;

/// Serve one embedded page, 404 when it is not bundled
pub fn page(name: &str) -> Response {
    match <Pages as Embed>::get(name) {
        Some(content) => Html(content.data.into_owned()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
