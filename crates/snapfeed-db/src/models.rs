//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing identifiers from strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidUserId(String),
    InvalidPostId(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserId(s) => write!(f, "Invalid user id: {}", s),
            ParseError::InvalidPostId(s) => write!(f, "Invalid post id: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse the canonical integer form of an identifier.
///
/// Accepts surrounding whitespace, a leading `+` and leading zeros, so
/// `"42"`, `" 42 "`, `"+42"` and `"042"` all name the same row.
fn parse_canonical_id(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// User identifier assigned by the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical_id(s)
            .map(UserId)
            .ok_or_else(|| ParseError::InvalidUserId(s.to_string()))
    }
}

/// Post identifier assigned by the post store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical_id(s)
            .map(PostId)
            .ok_or_else(|| ParseError::InvalidPostId(s.to_string()))
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Image post model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Creating user; never reassigned
    pub owner_id: UserId,
    /// Stored image filename
    pub image: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author's username, as listed in the feed
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub post: Post,
    /// `None` when the author row is gone
    pub owner: Option<String>,
}

/// New post (for insertion)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: UserId,
    pub image: String,
    pub caption: String,
}

/// Post changes. The caption is always replaced, the image only when present.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub image: Option<String>,
    pub caption: String,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.try_get("id")?),
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Post {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId(row.try_get("id")?),
            owner_id: UserId(row.try_get("owner_id")?),
            image: row.try_get("image")?,
            caption: row.try_get("caption")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for FeedPost {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(FeedPost {
            post: Post::try_from(row)?,
            owner: row.try_get("owner")?,
        })
    }
}
