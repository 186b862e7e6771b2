//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use snapfeed_db::{Post, PostId, UserId};

/// Feed page size
pub const PAGE_SIZE: i64 = 4;

// ==================== Auth Types ====================

/// Form-encoded signup/login fields
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ==================== Feed Types ====================

/// Feed query parameters
///
/// `page` is kept as a string so a non-numeric value falls back to page 1
/// instead of rejecting the request.
#[derive(Deserialize, Default)]
pub struct FeedQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl FeedQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// Post as shown in the feed
#[derive(Serialize)]
pub struct PostResponse {
    pub id: PostId,
    pub owner_id: UserId,
    pub owner: Option<String>,
    pub image_url: String,
    pub caption: String,
    pub mine: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PostResponse {
    pub fn new(post: Post, owner: Option<String>, viewer: UserId) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            owner,
            image_url: format!("/uploads/{}", post.image),
            caption: post.caption,
            mine: post.owner_id == viewer,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// One page of the feed
#[derive(Serialize)]
pub struct FeedResponse {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub posts: Vec<PostResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> FeedQuery {
        FeedQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("3")).page(), 3);
        assert_eq!(query(Some(" 2 ")).page(), 2);
        assert_eq!(query(Some("abc")).page(), 1);
        assert_eq!(query(Some("0")).page(), 1);
        assert_eq!(query(Some("-4")).page(), 1);
    }
}
