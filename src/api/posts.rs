//! Post endpoints

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};

use super::dto::{CreatePostRequest, UpdatePostRequest, decode_body};
use crate::AppState;
use crate::data::Post;
use crate::error::AppError;

/// Message for path segments that are not positive integers
const ROUTE_NOT_FOUND: &str = "The requested URL was not found on the server.";

/// Create posts router
pub fn posts_router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/posts", get(list_user_posts))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

/// Path IDs are positive integers; anything else does not match a route.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(ROUTE_NOT_FOUND.to_string()))
}

/// GET /users/:user_id/posts
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Post>>, AppError> {
    let user_id = parse_id(&user_id)?;
    let posts = state.posts.list_by_user(user_id).await?;

    Ok(Json(posts))
}

/// GET /posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let posts = state.posts.list_all().await?;

    Ok(Json(posts))
}

/// GET /posts/:id
///
/// Answers 200 even when the post had to be fetched and stored first.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id)?;
    let post = state.posts.get(id).await?;

    Ok(Json(post))
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let new_post = decode_body::<CreatePostRequest>(&body).validate()?;
    let post = state.posts.create(new_post).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id)?;
    let changes = decode_body::<UpdatePostRequest>(&body).validate()?;
    let post = state.posts.update(id, changes).await?;

    Ok(Json(post))
}

/// DELETE /posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id)?;
    let post = state.posts.delete(id).await?;

    Ok(Json(post))
}
