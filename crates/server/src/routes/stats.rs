use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use chess_core::aggregate::{self, PlayerAggregate};
use chess_core::game_data::GameRecord;
use chess_core::openings::UNKNOWN_OPENING;

use crate::clients::chess_com::ChessComClient;
use crate::config::Config;
use crate::db::games;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct StatsQuery {
    pub limit: Option<usize>,
}

/// GET /api/players/{username}/stats
///
/// Fetch the player's most recent games, aggregate them, and persist the
/// classified ones. Upstream failures degrade to an empty aggregate.
pub async fn get_player_stats(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Config>,
    Extension(client): Extension<ChessComClient>,
    Path(username): Path<String>,
    Query(q): Query<StatsQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let limit = q.limit.unwrap_or(config.recent_games_limit).clamp(1, 100);

    let recent = client
        .fetch_recent_games(&username, limit)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Recent games fetch failed for {username}: {e}");
            Vec::new()
        });

    let agg = aggregate::aggregate_games(&recent, &username);

    // Persist classified games; unclassifiable ones are not worth keeping.
    let records: Vec<GameRecord> = recent
        .iter()
        .map(|g| GameRecord::from_api(g, &username))
        .filter(|r| r.opening != UNKNOWN_OPENING)
        .collect();
    let saved = games::upsert_games(&pool, &records).await?;
    if saved > 0 {
        tracing::info!("Stored {saved} classified games for {username}");
    }

    Ok(Json(aggregate_response(&agg, saved)))
}

/// Winrates are derived here, at serialization time, from the stored
/// counts.
fn aggregate_response(agg: &PlayerAggregate, saved_games: i64) -> JsonValue {
    let by_opening: Vec<JsonValue> = agg
        .by_opening
        .iter()
        .map(|o| {
            json!({
                "name": &o.name,
                "games": o.games,
                "wins": o.wins,
                "losses": o.losses,
                "draws": o.draws,
                "winrate": o.winrate(),
            })
        })
        .collect();

    json!({
        "username": &agg.username,
        "total": agg.total,
        "wins": agg.wins,
        "losses": agg.losses,
        "draws": agg.draws,
        "winrate": agg.winrate(),
        "whiteGames": agg.white_games,
        "blackGames": agg.black_games,
        "byOpening": by_opening,
        "byTimeClass": &agg.by_time_class,
        "avgOpponentRating": agg.avg_opponent_rating,
        "topFirstMove": &agg.top_first_move,
        "streaks": {
            "current": agg.streaks.current,
            "bestWinStreak": agg.streaks.best_win_streak,
        },
        "savedGames": saved_games,
    })
}
