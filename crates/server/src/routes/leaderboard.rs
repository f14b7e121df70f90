use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use crate::clients::chess_com::ChessComClient;
use crate::db::leaderboard;
use crate::error::AppError;

const LEADERBOARD_MODE: &str = "live_rapid";
const LEADERBOARD_SIZE: usize = 50;

/// GET /api/leaderboard/top
///
/// One snapshot per calendar day: the first request fetches the live
/// rapid top list and stores it; everyone else that day reads the stored
/// copy.
pub async fn get_top_players(
    Extension(pool): Extension<PgPool>,
    Extension(client): Extension<ChessComClient>,
) -> Result<Json<JsonValue>, AppError> {
    let day = chrono::Utc::now().format("%Y-%m-%d").to_string();

    if let Some(players) = leaderboard::get_snapshot(&pool, &day).await? {
        return Ok(Json(json!({
            "day": day,
            "mode": LEADERBOARD_MODE,
            "players": players,
            "cached": true,
        })));
    }

    let players = client
        .fetch_leaderboard(LEADERBOARD_SIZE)
        .await
        .map_err(AppError::Internal)?;
    if players.is_empty() {
        return Err(AppError::NotFound(
            "Leaderboard returned no players".into(),
        ));
    }

    let players_json =
        serde_json::to_value(&players).map_err(|e| AppError::Internal(e.to_string()))?;
    leaderboard::save_snapshot(
        &pool,
        &day,
        LEADERBOARD_MODE,
        "https://api.chess.com/pub/leaderboards",
        &players_json,
    )
    .await?;
    tracing::info!("Stored leaderboard snapshot for {day}");

    Ok(Json(json!({
        "day": day,
        "mode": LEADERBOARD_MODE,
        "players": players_json,
        "cached": false,
    })))
}
