use serde_json::Value as JsonValue;
use sqlx::PgPool;

use chess_core::game_data::GameRecord;

use crate::error::AppError;

/// A stored game document, one player's perspective.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub id: String,
    pub username: String,
    pub end_time: Option<i64>,
    pub opening: String,
    pub eco: Option<String>,
    pub color: String,
    pub result: String,
    pub opponent_username: String,
    pub opponent_rating: Option<i32>,
    pub first_move: Option<String>,
    pub time_class: String,
    pub move_count: i32,
    pub url: Option<String>,
    pub pgn: Option<String>,
    pub analysis: Option<JsonValue>,
    pub analyzed_at: Option<chrono::DateTime<chrono::Utc>>,
}

const GAME_COLUMNS: &str = "id, username, end_time, opening, eco, color, result, \
     opponent_username, opponent_rating, first_move, time_class, move_count, url, pgn, \
     analysis, analyzed_at";

/// Merge-upsert a batch of game records. A game is written at most once
/// per id; re-syncs overwrite the same fields with the same data, so
/// concurrent writers are benign. Returns the number of rows written.
pub async fn upsert_games(pool: &PgPool, records: &[GameRecord]) -> Result<i64, AppError> {
    let mut count = 0i64;

    for record in records {
        sqlx::query(
            r#"INSERT INTO games (
                id, username, end_time, opening, eco, color, result,
                opponent_username, opponent_rating, first_move, time_class,
                move_count, url, pgn
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                end_time = EXCLUDED.end_time,
                opening = EXCLUDED.opening,
                eco = EXCLUDED.eco,
                color = EXCLUDED.color,
                result = EXCLUDED.result,
                opponent_username = EXCLUDED.opponent_username,
                opponent_rating = EXCLUDED.opponent_rating,
                first_move = EXCLUDED.first_move,
                time_class = EXCLUDED.time_class,
                move_count = EXCLUDED.move_count,
                url = EXCLUDED.url,
                pgn = EXCLUDED.pgn,
                updated_at = NOW()"#,
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(record.timestamp)
        .bind(&record.opening)
        .bind(&record.eco)
        .bind(&record.color)
        .bind(&record.result)
        .bind(&record.opponent_username)
        .bind(record.opponent_rating)
        .bind(&record.first_move)
        .bind(&record.time_class)
        .bind(record.move_count as i32)
        .bind(&record.url)
        .bind(&record.pgn)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;

        count += 1;
    }

    Ok(count)
}

pub async fn get_game(pool: &PgPool, game_id: &str) -> Result<Option<StoredGame>, AppError> {
    sqlx::query_as::<_, StoredGame>(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE id = $1"
    ))
    .bind(game_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Persist a computed analysis back onto its game, the memoization cache
/// that later reads short-circuit on.
pub async fn save_analysis(
    pool: &PgPool,
    game_id: &str,
    analysis: &JsonValue,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE games SET analysis = $2, analyzed_at = NOW(), updated_at = NOW() WHERE id = $1",
    )
    .bind(game_id)
    .bind(analysis)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
    Ok(())
}
