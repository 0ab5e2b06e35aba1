//! Common test utilities for E2E tests

#![allow(dead_code)]

pub mod schema_validator;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::async_trait;
use postmirror::data::Post;
use postmirror::error::AppError;
use postmirror::upstream::{PostSource, RemoteUser};
use postmirror::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server whose upstream knows user 1 and posts 1..=3
    pub async fn new() -> Self {
        Self::with_upstream(Arc::new(StubUpstream::typical())).await
    }

    /// Create a test server backed by the given upstream
    pub async fn with_upstream(upstream: Arc<dyn PostSource>) -> Self {
        postmirror::metrics::init_metrics();

        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = test_config(db_path, "http://127.0.0.1:9");

        // Initialize app state
        let state = AppState::with_upstream(config, upstream).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = postmirror::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Store a post directly, bypassing the API
    pub async fn seed_post(&self, user_id: i64, title: &str, body: &str) -> Post {
        self.state
            .db
            .insert_post(&postmirror::data::NewPost {
                user_id,
                title: title.to_string(),
                body: body.to_string(),
            })
            .await
            .unwrap()
    }
}

/// Configuration pointing at a temp database and the given upstream
pub fn test_config(db_path: std::path::PathBuf, upstream_base_url: &str) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            max_body_bytes: 65536,
        },
        database: config::DatabaseConfig { path: db_path },
        upstream: config::UpstreamConfig {
            base_url: upstream_base_url.to_string(),
            timeout_seconds: 5,
            user_agent: "postmirror-test".to_string(),
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Upstream post in the shape the public API serves
pub fn remote_post(id: i64) -> Post {
    Post {
        id,
        user_id: (id - 1) / 10 + 1,
        title: format!("remote title {id}"),
        body: format!("remote body {id}"),
    }
}

/// In-process upstream that counts calls
#[derive(Default)]
pub struct StubUpstream {
    posts: Mutex<HashMap<i64, Post>>,
    users: HashSet<i64>,
    pub post_fetches: AtomicUsize,
    pub user_fetches: AtomicUsize,
}

impl StubUpstream {
    /// Knows user 1 and posts 1, 2 and 3
    pub fn typical() -> Self {
        let stub = Self {
            users: HashSet::from([1]),
            ..Self::default()
        };
        for id in 1..=3 {
            stub.add_post(remote_post(id));
        }
        stub
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    pub fn post_fetch_count(&self) -> usize {
        self.post_fetches.load(Ordering::SeqCst)
    }

    pub fn user_fetch_count(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for StubUpstream {
    async fn fetch_post(&self, id: i64) -> Result<Post, AppError> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        self.posts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("GET /posts/{id} returned 404 Not Found")))
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<RemoteUser>, AppError> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.contains(&user_id).then(|| RemoteUser {
            id: Some(user_id),
            username: Some(format!("user{user_id}")),
            ..RemoteUser::default()
        }))
    }
}
