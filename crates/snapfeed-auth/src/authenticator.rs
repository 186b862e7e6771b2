//! Signup and login flows

use snapfeed_db::{Database, DbError, NewUser, User};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::TokenCodec;
use crate::password::{hash_password, verify_password};

/// Maximum allowed username length
pub const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length in bytes (bounds hashing cost)
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Verified in place of a real hash when the user does not exist, so an
/// unknown username costs the same as a wrong password.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidInput("Username cannot be empty".to_string()));
    }
    // ASCII letters, digits, `_` and `-` only
    if !username
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(AuthError::InvalidInput(
            "Username can only contain ASCII letters, digits, underscores, and hyphens".to_string(),
        ));
    }
    // Bytes and characters agree once the name is ASCII
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

/// Validate password presence and length
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidInput("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password exceeds maximum length of {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Orchestrates credential storage and token issuance
#[derive(Clone)]
pub struct Authenticator {
    db: Database,
    tokens: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(db: Database, tokens: Arc<TokenCodec>) -> Self {
        Self { db, tokens }
    }

    /// Register a new user. Does not log the user in.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        debug!("Signup attempt for user: {}", username);

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))??;

        let user = self
            .db
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => AuthError::DuplicateUser,
                other => AuthError::Database(other),
            })?;

        metrics::counter!("snapfeed_signups_total").increment(1);
        info!("Created user: {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        validate_username(username).map_err(|_| AuthError::InvalidCredentials)?;
        if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
            return Err(AuthError::InvalidCredentials);
        }

        debug!("Login attempt for user: {}", username);

        let user = self.db.find_user_by_username(username).await?;

        let hash_to_verify = match &user {
            Some(u) => u.password_hash.clone(),
            None => DUMMY_HASH.to_string(),
        };
        let user_exists = user.is_some();
        let password = password.to_string();
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash_to_verify))
                .await
                .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?;

        // A broken stored hash is a server fault; the dummy hash never is
        let password_valid = match password_valid {
            Ok(valid) => valid,
            Err(e) if user_exists => return Err(e),
            Err(_) => false,
        };

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => {
                metrics::counter!("snapfeed_logins_total", "outcome" => "failure").increment(1);
                warn!("Failed login for user: {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(user.id)?;

        metrics::counter!("snapfeed_logins_total", "outcome" => "success").increment(1);
        info!("User {} logged in successfully", user.username);
        Ok(token)
    }
}
