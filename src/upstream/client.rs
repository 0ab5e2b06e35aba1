//! `reqwest` implementation of [`PostSource`]

use std::time::{Duration, Instant};

use axum::async_trait;
use reqwest::StatusCode;

use super::{PostSource, RemoteUser};
use crate::config::UpstreamConfig;
use crate::data::Post;
use crate::error::AppError;
use crate::metrics::observe_upstream_request;

/// HTTP client for the upstream API
///
/// Requests are sent once; there is no retry.
#[derive(Debug, Clone)]
pub struct HttpPostSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostSource {
    /// Build a client from configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use an existing client against `base_url`
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, resource: &str, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, resource, id)
    }

    /// GET `{base}/{resource}/{id}` and record metrics
    async fn get(
        &self,
        resource: &'static str,
        id: i64,
    ) -> Result<(StatusCode, reqwest::Response), AppError> {
        let url = self.url(resource, id);
        let started = Instant::now();

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                observe_upstream_request(resource, status.as_str(), started.elapsed());
                tracing::debug!(%url, status = status.as_u16(), "Upstream responded");
                Ok((status, response))
            }
            Err(error) => {
                observe_upstream_request(resource, "error", started.elapsed());
                tracing::warn!(%url, %error, "Upstream request failed");
                Err(error.into())
            }
        }
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_post(&self, id: i64) -> Result<Post, AppError> {
        let (status, response) = self.get("posts", id).await?;

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GET {} returned {}",
                self.url("posts", id),
                status
            )));
        }

        let post: Post = response.json().await.map_err(|e| {
            AppError::Upstream(format!("malformed post payload for id {id}: {e}"))
        })?;

        if post.id != id {
            tracing::warn!(
                requested_id = id,
                returned_id = post.id,
                "Upstream returned a post with a different id"
            );
        }

        Ok(post)
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<RemoteUser>, AppError> {
        let (status, response) = self.get("users", user_id).await?;

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            AppError::Upstream(format!("malformed user payload for id {user_id}: {e}"))
        })?;

        let Some(object) = payload.as_object() else {
            return Err(AppError::Upstream(format!(
                "user payload for id {user_id} is not an object"
            )));
        };

        // The upstream answers unknown users with `{}`, usually alongside a 404.
        if object.is_empty() {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "GET {} returned {}",
                self.url("users", user_id),
                status
            )));
        }

        let user = serde_json::from_value(payload).map_err(|e| {
            AppError::Upstream(format!("malformed user payload for id {user_id}: {e}"))
        })?;

        Ok(Some(user))
    }
}
