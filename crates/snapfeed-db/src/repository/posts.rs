//! Post operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{FeedPost, NewPost, Post, PostId, UpdatePost};
use crate::repository::Database;
use crate::utils::page_offset;

impl Database {
    // ==================== Post Operations ====================

    /// Insert a new post
    pub async fn create_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (owner_id, image, caption, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(post.owner_id.as_i64())
        .bind(&post.image)
        .bind(&post.caption)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Post {
            id: PostId::new(id),
            owner_id: post.owner_id,
            image: post.image,
            caption: post.caption,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a post by ID
    pub async fn find_post(&self, id: PostId) -> Result<Option<Post>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, owner_id, image, caption, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Post::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update a post's caption and, when given, its image
    ///
    /// `owner_id` is not part of the statement and can never change.
    pub async fn update_post(&self, id: PostId, update: UpdatePost) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET caption = ?, image = COALESCE(?, image), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.caption)
        .bind(&update.image)
        .bind(now.to_rfc3339())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post
    pub async fn delete_post(&self, id: PostId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List one page of posts with their authors, newest first
    pub async fn list_posts(&self, page: i64, per_page: i64) -> Result<Vec<FeedPost>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id AS id, p.owner_id AS owner_id, p.image AS image,
                   p.caption AS caption, p.created_at AS created_at,
                   p.updated_at AS updated_at, u.username AS owner
            FROM posts p
            LEFT JOIN users u ON u.id = p.owner_id
            ORDER BY p.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(per_page)
        .bind(page_offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| FeedPost::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Count all posts
    pub async fn count_posts(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}
