use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use chess_core::analysis::{self, SimulatedAccuracy};

use crate::config::Config;
use crate::db::games;
use crate::error::AppError;

/// GET /api/games/{game_id}
pub async fn get_game(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<String>,
) -> Result<Json<games::StoredGame>, AppError> {
    let game = games::get_game(&pool, &game_id)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))?;

    Ok(Json(game))
}

/// GET /api/games/{game_id}/analysis
///
/// Memoized per game id: a stored result is returned as-is, otherwise the
/// game is analyzed (after the configured artificial delay standing in for
/// a real engine pass) and the result merged back onto the game row.
pub async fn get_game_analysis(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Config>,
    Path(game_id): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let game = games::get_game(&pool, &game_id)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))?;

    if let Some(stored) = game.analysis {
        return Ok(Json(stored));
    }

    let pgn = game
        .pgn
        .filter(|p| !p.is_empty())
        .ok_or(AppError::Unprocessable("Game has no PGN to analyze".into()))?;

    tokio::time::sleep(std::time::Duration::from_millis(config.analysis_delay_ms)).await;

    let result = analysis::analyze_game(&pgn, &SimulatedAccuracy)
        .map_err(|e| AppError::Unprocessable(format!("Could not analyze game: {e}")))?;

    let body = json!({
        "opening": result.opening,
        "accuracy": {
            "white": result.accuracy.white,
            "black": result.accuracy.black,
        },
        "analysis": {
            "blunders": { "white": result.blunders.white, "black": result.blunders.black },
            "aggressiveness": {
                "white": result.aggressiveness.white,
                "black": result.aggressiveness.black,
            },
            "captures": { "white": result.captures.white, "black": result.captures.black },
            "checks": { "white": result.checks.white, "black": result.checks.black },
            "materialDiff": result.material_diff,
        },
        "processedAt": chrono::Utc::now().timestamp_millis(),
    });

    games::save_analysis(&pool, &game_id, &body).await?;
    tracing::info!("Analyzed game {game_id}");

    Ok(Json(body))
}
