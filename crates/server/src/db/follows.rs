use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowedPlayer {
    pub username: String,
    pub avatar: Option<String>,
    pub added_at: chrono::DateTime<chrono::Utc>,
}

/// Follow a player. The edge is keyed by the lower-cased target username,
/// so follows differing only by case collapse into one row; re-following
/// refreshes `added_at`.
pub async fn follow(
    pool: &PgPool,
    follower_id: i64,
    target_username: &str,
    avatar: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO follows (follower_id, target_key, username, avatar)
           VALUES ($1, $2, $3, $4)
           ON CONFLICT (follower_id, target_key) DO UPDATE SET
               username = EXCLUDED.username,
               avatar = EXCLUDED.avatar,
               added_at = NOW()"#,
    )
    .bind(follower_id)
    .bind(target_username.to_lowercase())
    .bind(target_username)
    .bind(avatar)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
    Ok(())
}

/// Unfollow. Removing an edge that does not exist is a no-op.
pub async fn unfollow(
    pool: &PgPool,
    follower_id: i64,
    target_username: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND target_key = $2")
        .bind(follower_id)
        .bind(target_username.to_lowercase())
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(())
}

pub async fn is_following(
    pool: &PgPool,
    follower_id: i64,
    target_username: &str,
) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND target_key = $2)",
    )
    .bind(follower_id)
    .bind(target_username.to_lowercase())
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

/// Players the account follows, most recently followed first.
pub async fn list_followed(
    pool: &PgPool,
    follower_id: i64,
) -> Result<Vec<FollowedPlayer>, AppError> {
    sqlx::query_as::<_, FollowedPlayer>(
        r#"SELECT username, avatar, added_at
           FROM follows
           WHERE follower_id = $1
           ORDER BY added_at DESC"#,
    )
    .bind(follower_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}
