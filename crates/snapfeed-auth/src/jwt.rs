//! Session token signing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use snapfeed_db::UserId;
use tracing::debug;

use crate::error::AuthError;

/// Upper bound on accepted token length; longer input is rejected before decoding
pub const MAX_TOKEN_LENGTH: usize = 4096;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// HS256 codec for session tokens
///
/// A token carries exactly one identity claim. Nothing is stored server
/// side, so rotating the secret is the only way to revoke issued tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
}

impl TokenCodec {
    /// Create a new codec
    pub fn new(secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_hours,
        }
    }

    /// Token lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.token_ttl_hours.checked_mul(3600).unwrap_or(i64::MAX)
    }

    /// Issue a token bound to a user
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.token_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Internal(format!(
                    "Token lifetime of {} hours is out of range",
                    self.token_ttl_hours
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing session token for user {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token and return the identity it carries
    ///
    /// Empty, oversized, malformed and badly signed tokens are all
    /// `InvalidToken`; an expired one is `TokenExpired`.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Err(AuthError::InvalidToken);
        }

        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        token_data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken)
    }
}
