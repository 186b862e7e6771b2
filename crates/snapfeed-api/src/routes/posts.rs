//! Feed and post mutation routes

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::Redirect,
};
use bytes::Bytes;
use snapfeed_auth::{AuthError, AuthUser, authorize};
use snapfeed_db::{DbError, NewPost, PostId, UpdatePost};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{FeedQuery, FeedResponse, PAGE_SIZE, PostResponse};

/// Maximum caption length in characters
const MAX_CAPTION_LENGTH: usize = 2200;

/// Fields of a post create/update form
struct PostUpload {
    image: Option<(String, Bytes)>,
    caption: String,
}

/// Read the `image` and `caption` fields of a multipart form
async fn read_post_form(mut multipart: Multipart) -> Result<PostUpload, ApiError> {
    let mut image = None;
    let mut caption = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    image = Some((file_name, data));
                }
            }
            "caption" => caption = field.text().await?,
            _ => debug!("Ignoring unexpected form field: {}", name),
        }
    }

    if caption.chars().count() > MAX_CAPTION_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Caption exceeds maximum length of {} characters",
            MAX_CAPTION_LENGTH
        )));
    }

    Ok(PostUpload { image, caption })
}

/// Remove an image saved for a write that did not go through
async fn discard_image(state: &AppState, image: &str) {
    if let Err(e) = state.images.delete(image).await {
        warn!("Failed to remove orphaned image {}: {}", image, e);
    }
}

/// Turn the outcome of a post update into the handler result
///
/// Any failure removes the newly saved image, if there is one.
async fn settle_update(
    state: &AppState,
    new_image: Option<&str>,
    outcome: Result<bool, DbError>,
) -> Result<(), ApiError> {
    let err: ApiError = match outcome {
        Ok(true) => return Ok(()),
        // Removed concurrently by its owner
        Ok(false) => AuthError::ResourceNotFound.into(),
        Err(e) => e.into(),
    };

    if let Some(image) = new_image {
        discard_image(state, image).await;
    }
    Err(err)
}

/// Parse a path id; an unparsable id names no post
fn parse_post_id(raw: &str) -> Result<PostId, ApiError> {
    raw.parse::<PostId>()
        .map_err(|_| ApiError::Auth(AuthError::ResourceNotFound))
}

/// GET / (session required)
pub async fn feed(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let page = query.page();
    let posts = state.db.list_posts(page, PAGE_SIZE).await?;
    let total = state.db.count_posts().await?;

    let entries = posts
        .into_iter()
        .map(|entry| PostResponse::new(entry.post, entry.owner, user.id))
        .collect();

    Ok(Json(FeedResponse {
        page,
        per_page: PAGE_SIZE,
        total,
        posts: entries,
    }))
}

/// POST /post (session required)
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = read_post_form(multipart).await?;
    let (file_name, data) = form
        .image
        .ok_or_else(|| ApiError::BadRequest("An image file is required".to_string()))?;

    let image = state.images.save(&file_name, data).await?;

    let created = state
        .db
        .create_post(NewPost {
            owner_id: user.id,
            image: image.clone(),
            caption: form.caption,
        })
        .await;

    let post = match created {
        Ok(post) => post,
        Err(e) => {
            discard_image(&state, &image).await;
            return Err(e.into());
        }
    };

    info!("User {} created post {}", user.id, post.id);
    Ok(Redirect::to("/"))
}

/// POST /delete/{id} (session required, owner only)
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let post_id = parse_post_id(&id)?;
    let fetched = state.db.find_post(post_id).await?;
    let post = authorize(fetched.as_ref(), &user)?;

    if !state.db.delete_post(post.id).await? {
        // Removed concurrently by its owner
        return Err(AuthError::ResourceNotFound.into());
    }

    if let Err(e) = state.images.delete(&post.image).await {
        warn!("Failed to remove image {} of post {}: {}", post.image, post.id, e);
    }

    info!("User {} deleted post {}", user.id, post.id);
    Ok(Redirect::to("/"))
}

/// POST /update/{id} (session required, owner only)
///
/// Ownership is checked before the form body is read, so a rejected
/// request never writes an image.
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let post_id = parse_post_id(&id)?;
    let fetched = state.db.find_post(post_id).await?;
    let post = authorize(fetched.as_ref(), &user)?;

    let form = read_post_form(multipart).await?;

    let new_image = match form.image {
        Some((file_name, data)) => Some(state.images.save(&file_name, data).await?),
        None => None,
    };

    let outcome = state
        .db
        .update_post(
            post.id,
            UpdatePost {
                image: new_image.clone(),
                caption: form.caption,
            },
        )
        .await;
    settle_update(&state, new_image.as_deref(), outcome).await?;

    if new_image.is_some()
        && let Err(e) = state.images.delete(&post.image).await
    {
        warn!("Failed to remove replaced image {}: {}", post.image, e);
    }

    info!("User {} updated post {}", user.id, post.id);
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};
    use snapfeed_auth::TokenCodec;
    use snapfeed_db::Database;
    use snapfeed_storage::LocalImageStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn setup() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::in_memory().await.unwrap();
        let tokens = Arc::new(TokenCodec::new("test-secret", 1));
        let images = Arc::new(LocalImageStore::new(dir.path()).await.unwrap());
        (AppState::new(db, tokens, images, 1024), dir)
    }

    async fn saved_image(state: &AppState) -> String {
        state
            .images
            .save("new.png", Bytes::from_static(b"png"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_update_removes_new_image() {
        let (state, _dir) = setup().await;
        let image = saved_image(&state).await;
        let path = state.images.path(&image).unwrap();

        let outcome = Err(DbError::Migration("disk I/O error".to_string()));
        let err = settle_update(&state, Some(&image), outcome).await.unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_update_of_vanished_post_removes_new_image() {
        let (state, _dir) = setup().await;
        let image = saved_image(&state).await;
        let path = state.images.path(&image).unwrap();

        let err = settle_update(&state, Some(&image), Ok(false)).await.unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_update_keeps_new_image() {
        let (state, _dir) = setup().await;
        let image = saved_image(&state).await;
        let path = state.images.path(&image).unwrap();

        settle_update(&state, Some(&image), Ok(true)).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_failed_caption_update_has_nothing_to_remove() {
        let (state, _dir) = setup().await;

        let outcome = Err(DbError::Migration("disk I/O error".to_string()));
        assert!(settle_update(&state, None, outcome).await.is_err());
    }
}
