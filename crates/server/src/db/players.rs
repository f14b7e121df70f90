use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::clients::chess_com::{PlayerProfile, PlayerStats};
use crate::error::AppError;

/// Cached Chess.com profile row ("usuaris" in the original data model).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRow {
    #[serde(skip_serializing)]
    pub username_key: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub joined: Option<i64>,
    pub last_online: Option<i64>,
    pub followers: i32,
    pub is_streamer: bool,
    pub status: Option<String>,
    pub twitch_url: Option<String>,
    pub stats: Option<JsonValue>,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

const PLAYER_COLUMNS: &str = "username_key, username, name, avatar, location, joined, \
     last_online, followers, is_streamer, status, twitch_url, stats, fetched_at";

/// Merge-upsert a fetched profile snapshot. Concurrent writers for the
/// same player overwrite each other with identical data, which is benign.
pub async fn upsert_player(
    pool: &PgPool,
    profile: &PlayerProfile,
    stats: Option<&PlayerStats>,
) -> Result<(), AppError> {
    let stats_json = match stats {
        Some(s) => Some(serde_json::to_value(s).map_err(|e| AppError::Internal(e.to_string()))?),
        None => None,
    };

    sqlx::query(
        r#"INSERT INTO players (
            username_key, username, name, avatar, location, joined,
            last_online, followers, is_streamer, status, twitch_url, stats
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (username_key) DO UPDATE SET
            username = EXCLUDED.username,
            name = EXCLUDED.name,
            avatar = EXCLUDED.avatar,
            location = EXCLUDED.location,
            joined = EXCLUDED.joined,
            last_online = EXCLUDED.last_online,
            followers = EXCLUDED.followers,
            is_streamer = EXCLUDED.is_streamer,
            status = EXCLUDED.status,
            twitch_url = EXCLUDED.twitch_url,
            stats = COALESCE(EXCLUDED.stats, players.stats),
            fetched_at = NOW()"#,
    )
    .bind(profile.username.to_lowercase())
    .bind(&profile.username)
    .bind(&profile.name)
    .bind(&profile.avatar)
    .bind(&profile.location)
    .bind(profile.joined)
    .bind(profile.last_online)
    .bind(profile.followers)
    .bind(profile.is_streamer)
    .bind(&profile.status)
    .bind(&profile.twitch_url)
    .bind(stats_json)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(())
}

pub async fn get_player(pool: &PgPool, username: &str) -> Result<Option<PlayerRow>, AppError> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE username_key = $1"
    ))
    .bind(username.to_lowercase())
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Every cached player, for the community-wide scan.
pub async fn all_players(pool: &PgPool) -> Result<Vec<PlayerRow>, AppError> {
    sqlx::query_as::<_, PlayerRow>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players ORDER BY username_key"
    ))
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}
