use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::db::follows;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct FollowRequest {
    pub username: String,
    pub avatar: Option<String>,
}

/// POST /api/social/follow
///
/// Idempotent: following an already-followed player refreshes its
/// `addedAt` rather than creating a second edge.
pub async fn follow(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(req): Json<FollowRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let target = req.username.trim();
    if target.is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".into()));
    }

    follows::follow(&pool, user.id, target, req.avatar.as_deref()).await?;

    Ok(Json(json!({ "username": target, "following": true })))
}

/// DELETE /api/social/follow/{username}. A no-op when not following.
pub async fn unfollow(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    follows::unfollow(&pool, user.id, &username).await?;

    Ok(Json(json!({ "username": username, "following": false })))
}

/// GET /api/social/follow/{username}
pub async fn is_following(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let following = follows::is_following(&pool, user.id, &username).await?;

    Ok(Json(json!({ "username": username, "following": following })))
}

/// GET /api/social/following, most recently followed first.
pub async fn list_following(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let players = follows::list_followed(&pool, user.id).await?;

    Ok(Json(json!({ "total": players.len(), "players": players })))
}
