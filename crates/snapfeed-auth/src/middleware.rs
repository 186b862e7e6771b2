//! Session middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use snapfeed_db::UserId;
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::TokenCodec;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

/// Identity attached to a request after its session token verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
}

/// Session middleware
///
/// Rejects the request with 401 unless the `token` cookie holds a valid
/// session token; on success the `AuthUser` is added to request extensions.
/// The embedded id is trusted as is, no database lookup happens here.
pub async fn session_middleware(
    State(tokens): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let jar = CookieJar::from_headers(request.headers());

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        debug!("Rejecting {}: no session cookie", request.uri().path());
        return Err(AuthError::MissingSession);
    };

    let id = tokens.verify(cookie.value()).inspect_err(|e| {
        debug!("Rejecting {}: {}", request.uri().path(), e);
    })?;

    request.extensions_mut().insert(AuthUser { id });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthError::MissingSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header::COOKIE},
        middleware::from_fn_with_state,
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.id.to_string()
    }

    fn app(tokens: Arc<TokenCodec>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(from_fn_with_state(tokens, session_middleware))
    }

    async fn send(router: Router, cookie: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/me");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_valid_cookie_attaches_identity() {
        let tokens = Arc::new(TokenCodec::new("secret", 1));
        let token = tokens.issue(UserId::new(5)).unwrap();

        let (status, body) = send(app(tokens), Some(format!("token={}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "5");
    }

    #[tokio::test]
    async fn test_cookie_among_others() {
        let tokens = Arc::new(TokenCodec::new("secret", 1));
        let token = tokens.issue(UserId::new(9)).unwrap();

        let (status, body) =
            send(app(tokens), Some(format!("theme=dark; token={}; lang=en", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "9");
    }

    #[tokio::test]
    async fn test_missing_cookie_rejected() {
        let tokens = Arc::new(TokenCodec::new("secret", 1));

        let (status, body) = send(app(tokens.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Unauthorized"));

        let (status, _) = send(app(tokens), Some("other=value".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let tokens = Arc::new(TokenCodec::new("secret", 1));
        let foreign = TokenCodec::new("other-secret", 1)
            .issue(UserId::new(5))
            .unwrap();

        let cookies = vec![
            "token=".to_string(),
            "token=garbage".to_string(),
            format!("token={}", foreign),
        ];
        for cookie in cookies {
            let (status, _) = send(app(tokens.clone()), Some(cookie.clone())).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "cookie {:?}", cookie);
        }
    }

    #[tokio::test]
    async fn test_extractor_without_layer_rejects() {
        let router = Router::new().route("/me", get(whoami));

        let (status, _) = send(router, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
