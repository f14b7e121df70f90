use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::AppError;

/// Today's stored snapshot, if someone already loaded the leaderboard.
pub async fn get_snapshot(pool: &PgPool, day: &str) -> Result<Option<JsonValue>, AppError> {
    let row: Option<(JsonValue,)> =
        sqlx::query_as("SELECT players FROM top_players_daily WHERE day = $1")
            .bind(day)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Sqlx)?;

    Ok(row.map(|r| r.0))
}

/// First load of the day stores the snapshot; a concurrent first load
/// overwrites it with the same data.
pub async fn save_snapshot(
    pool: &PgPool,
    day: &str,
    mode: &str,
    source: &str,
    players: &JsonValue,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO top_players_daily (day, mode, source, players)
           VALUES ($1, $2, $3, $4)
           ON CONFLICT (day) DO UPDATE SET
               mode = EXCLUDED.mode,
               source = EXCLUDED.source,
               players = EXCLUDED.players"#,
    )
    .bind(day)
    .bind(mode)
    .bind(source)
    .bind(players)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
    Ok(())
}
