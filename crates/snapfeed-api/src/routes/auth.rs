//! Signup, login and logout routes

use axum::{
    Form, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect},
    routing::get,
};
use snapfeed_auth::{AuthUser, SESSION_COOKIE};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::pages::page;
use super::types::CredentialsForm;

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, ttl_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}")
}

/// `Set-Cookie` value that removes the session token
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// GET /signup
async fn signup_form() -> impl IntoResponse {
    page("signup.html")
}

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, ApiError> {
    state.auth.signup(&form.username, &form.password).await?;
    Ok(Redirect::to("/login"))
}

/// GET /login
async fn login_form() -> impl IntoResponse {
    page("login.html")
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.auth.login(&form.username, &form.password).await?;
    let cookie = session_cookie(&token, state.tokens.ttl_seconds());

    Ok(([(SET_COOKIE, cookie)], Redirect::to("/")))
}

/// GET /logout (session required)
///
/// Tokens are stateless, so logging out only tells the client to drop it.
pub async fn logout(user: AuthUser) -> impl IntoResponse {
    info!("User {} logged out", user.id);
    ([(SET_COOKIE, clear_session_cookie())], Redirect::to("/login"))
}

/// Create public auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi", 3600);
        assert!(cookie.starts_with("token=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.ends_with("Max-Age=3600"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
