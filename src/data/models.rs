//! Data models
//!
//! Rust structs representing database entities.

use serde::{Deserialize, Serialize};

/// A post record
///
/// Serialized with the camelCase `userId` key used on the wire by both
/// this service and the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

/// A post that has not been assigned an ID yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub body: String,
}

/// Partial update of a post
///
/// Only `title` and `body` can change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PostChanges {
    /// True when no field would be touched
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    /// Overwrite the fields present in this change set
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(body) = self.body {
            post.body = body;
        }
    }
}
