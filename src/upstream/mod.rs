//! Upstream post/user API
//!
//! The remote collaborator that owns the canonical post and user data.
//! It is consulted for posts missing locally and for user existence
//! checks on creation. Handlers only see the [`PostSource`] trait.

mod client;

use axum::async_trait;
use serde::Deserialize;

use crate::data::Post;
use crate::error::AppError;

pub use client::HttpPostSource;

/// User record as returned by the upstream
///
/// Only the existence of the record matters; the fields are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Read-only access to the upstream API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch a post by ID
    ///
    /// # Errors
    /// Transport failures, non-success statuses (including 404) and
    /// payloads missing any post field are all errors.
    async fn fetch_post(&self, id: i64) -> Result<Post, AppError>;

    /// Fetch a user by ID
    ///
    /// # Returns
    /// `None` when the upstream answers with an empty object.
    async fn fetch_user(&self, user_id: i64) -> Result<Option<RemoteUser>, AppError>;
}
