//! Snapfeed Authentication and Authorization
//!
//! This crate provides password hashing, signed session tokens carried in a
//! cookie, the login/signup flow and single-owner resource checks.

pub mod authenticator;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use jwt::{Claims, MAX_TOKEN_TTL_HOURS, TokenCodec};
pub use middleware::{AuthUser, SESSION_COOKIE, session_middleware};
pub use ownership::{Owned, authorize};
pub use password::{hash_password, verify_password};
