//! Post service
//!
//! Handles post reads and writes, falling back to the upstream API for
//! posts that are not stored locally.

use std::sync::Arc;

use crate::data::{Database, NewPost, Post, PostChanges};
use crate::error::{AppError, USER_NOT_FOUND};
use crate::metrics::{FALLBACK_FETCHES_TOTAL, POSTS_TOTAL};
use crate::upstream::PostSource;

/// Post service
#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
    upstream: Arc<dyn PostSource>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>, upstream: Arc<dyn PostSource>) -> Self {
        Self { db, upstream }
    }

    /// All posts by a user
    ///
    /// # Errors
    /// `NotFound` when the user has no local posts. The upstream is not consulted.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        let posts = self.db.list_posts_by_user(user_id).await?;
        if posts.is_empty() {
            return Err(AppError::post_not_found());
        }

        Ok(posts)
    }

    /// All local posts, unpaginated
    pub async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        self.db.list_posts().await
    }

    /// Get a post, materializing it from the upstream on local miss
    pub async fn get(&self, id: i64) -> Result<Post, AppError> {
        if let Some(post) = self.db.get_post(id).await? {
            return Ok(post);
        }

        self.materialize(id).await
    }

    /// Fetch a post from the upstream and store it locally
    ///
    /// Concurrent calls for the same missing ID each hit the upstream; the
    /// store keeps whichever insert lands first and every caller gets that
    /// stored row back.
    pub async fn materialize(&self, id: i64) -> Result<Post, AppError> {
        tracing::info!(post_id = id, "Post missing locally, fetching from upstream");

        let fetched = match self.upstream.fetch_post(id).await {
            Ok(post) => post,
            Err(error) => {
                FALLBACK_FETCHES_TOTAL.with_label_values(&["failed"]).inc();
                tracing::warn!(post_id = id, %error, "Fallback fetch failed");
                return Err(error);
            }
        };

        if self.db.insert_post_if_absent(&fetched).await? {
            POSTS_TOTAL.inc();
        } else {
            tracing::debug!(
                post_id = fetched.id,
                "Post was stored concurrently, keeping existing row"
            );
        }
        FALLBACK_FETCHES_TOTAL
            .with_label_values(&["materialized"])
            .inc();

        self.db.get_post(fetched.id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "post {} vanished right after being stored",
                fetched.id
            ))
        })
    }

    /// Create a post after checking its author exists upstream
    ///
    /// # Errors
    /// `BadRequest` when the upstream does not know `user_id`.
    pub async fn create(&self, post: NewPost) -> Result<Post, AppError> {
        let Some(user) = self.upstream.fetch_user(post.user_id).await? else {
            tracing::info!(user_id = post.user_id, "Rejected post for unknown user");
            return Err(AppError::BadRequest(USER_NOT_FOUND.to_string()));
        };

        let stored = self.db.insert_post(&post).await?;
        POSTS_TOTAL.inc();
        tracing::info!(
            post_id = stored.id,
            user_id = stored.user_id,
            username = ?user.username,
            "Post created"
        );

        Ok(stored)
    }

    /// Delete a post
    ///
    /// # Returns
    /// The post as it was before removal
    pub async fn delete(&self, id: i64) -> Result<Post, AppError> {
        let post = self
            .db
            .get_post(id)
            .await?
            .ok_or_else(AppError::post_not_found)?;

        if self.db.delete_post(id).await? {
            POSTS_TOTAL.dec();
        }
        tracing::info!(post_id = id, "Post deleted");

        Ok(post)
    }

    /// Overwrite the title and/or body of a post
    ///
    /// An empty change set returns the post without writing.
    pub async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, AppError> {
        let mut post = self
            .db
            .get_post(id)
            .await?
            .ok_or_else(AppError::post_not_found)?;

        if changes.is_empty() {
            return Ok(post);
        }

        changes.apply_to(&mut post);
        self.db.update_post(&post).await?;
        tracing::info!(post_id = id, "Post updated");

        Ok(post)
    }
}
