//! Credential store operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewUser, User, UserId};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Fails with `DbError::Duplicate` when the username is taken, whether
    /// detected up front or by the UNIQUE constraint on a concurrent insert.
    pub async fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        let existing = self.find_user_by_username(&user.username).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.username)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("User '{}' already exists", user.username)))?;

        let id: i64 = result.get("id");
        debug!("Stored credential for user {}", id);

        Ok(User {
            id: UserId::new(id),
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
        })
    }

    /// Get a user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Count stored credentials
    pub async fn count_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: format!("hash-of-{}", username),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = Database::in_memory().await.unwrap();

        let created = db.create_user(new_user("alice")).await.unwrap();
        assert_eq!(created.username, "alice");

        let found = db.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "hash-of-alice");
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let db = Database::in_memory().await.unwrap();

        assert!(db.find_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = Database::in_memory().await.unwrap();

        db.create_user(new_user("alice")).await.unwrap();
        let err = db.create_user(new_user("alice")).await.unwrap_err();

        assert!(matches!(err, DbError::Duplicate(_)));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let db = Database::in_memory().await.unwrap();

        let alice = db.create_user(new_user("alice")).await.unwrap();
        let bob = db.create_user(new_user("bob")).await.unwrap();

        assert_ne!(alice.id, bob.id);
        assert_eq!(db.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(new_user("alice")).await.unwrap();

        // Skip the lookup so the UNIQUE constraint is what rejects the row
        let err = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind("alice")
        .bind("other-hash")
        .bind(Utc::now().to_rfc3339())
        .execute(&db.pool)
        .await
        .unwrap_err();

        assert!(matches!(
            DbError::from_insert(err, "alice"),
            DbError::Duplicate(_)
        ));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_signups_store_one_user() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("users.db").display());
        let db = Database::new(&url).await.unwrap();

        for round in 0..10 {
            let username = format!("user{}", round);
            let (first, second) = tokio::join!(
                db.create_user(new_user(&username)),
                db.create_user(new_user(&username))
            );
            let results = [first, second];

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(
                results
                    .iter()
                    .any(|r| matches!(r, Err(DbError::Duplicate(_))))
            );
        }

        assert_eq!(db.count_users().await.unwrap(), 10);
        db.close().await;
    }
}
