//! SQLite database operations
//!
//! All database access goes through this module.

use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Instant;

use super::models::*;
use crate::error::AppError;
use crate::metrics::observe_db_query;

const POSTS: &str = "posts";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id      INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        title   TEXT    NOT NULL,
        body    TEXT    NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id)",
];

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file (and its parent directory) if it doesn't
    /// exist, then creates the schema if missing.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or schema setup fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await.map_err(|e| {
                tracing::error!(error = %e, "Schema setup failed");
                e
            })?;
        }

        tracing::info!(path = %path.display(), "Database connected");

        Ok(Self { pool })
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Get every post, in rowid order
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let started = Instant::now();
        let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        observe_db_query("select", POSTS, started.elapsed());

        Ok(posts)
    }

    /// Get every post written by `user_id`
    pub async fn list_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        let started = Instant::now();
        let posts =
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        observe_db_query("select", POSTS, started.elapsed());

        Ok(posts)
    }

    /// Get post by ID
    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let started = Instant::now();
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        observe_db_query("select", POSTS, started.elapsed());

        Ok(post)
    }

    /// Insert a new post and let SQLite assign its ID
    ///
    /// # Returns
    /// The stored post, including the assigned ID
    pub async fn insert_post(&self, post: &NewPost) -> Result<Post, AppError> {
        let started = Instant::now();
        let stored = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, body)
            VALUES (?, ?, ?)
            RETURNING id, user_id, title, body
            "#,
        )
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.body)
        .fetch_one(&self.pool)
        .await?;
        observe_db_query("insert", POSTS, started.elapsed());

        Ok(stored)
    }

    /// Insert a post with a caller-supplied ID unless that ID is taken.
    ///
    /// This is atomic at the SQL statement level, so two writers racing
    /// on the same ID cannot both insert.
    ///
    /// # Returns
    /// `true` if inserted, `false` if a row with the ID already existed.
    pub async fn insert_post_if_absent(&self, post: &Post) -> Result<bool, AppError> {
        let started = Instant::now();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, title, body)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.body)
        .execute(&self.pool)
        .await?;
        observe_db_query("insert", POSTS, started.elapsed());

        Ok(result.rows_affected() == 1)
    }

    /// Write the mutable fields (title, body) of an existing post
    pub async fn update_post(&self, post: &Post) -> Result<(), AppError> {
        let started = Instant::now();
        sqlx::query("UPDATE posts SET title = ?, body = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.body)
            .bind(post.id)
            .execute(&self.pool)
            .await?;
        observe_db_query("update", POSTS, started.elapsed());

        Ok(())
    }

    /// Delete post by ID
    ///
    /// # Returns
    /// `true` if a row was removed
    pub async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        observe_db_query("delete", POSTS, started.elapsed());

        Ok(result.rows_affected() > 0)
    }

    /// Count stored posts
    pub async fn count_posts(&self) -> Result<i64, AppError> {
        let started = Instant::now();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        observe_db_query("count", POSTS, started.elapsed());

        Ok(count)
    }
}
