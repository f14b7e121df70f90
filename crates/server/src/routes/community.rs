use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use crate::auth::middleware::MaybeAuthUser;
use crate::clients::chess_com::PlayerStats;
use crate::db::players;
use crate::error::AppError;

const MODES: [&str; 4] = ["rapid", "blitz", "bullet", "daily"];

/// GET /api/community/stats
///
/// Aggregates over every cached player profile, recomputed from the
/// source rows on each request.
pub async fn get_community_stats(
    Extension(pool): Extension<PgPool>,
    maybe_user: MaybeAuthUser,
) -> Result<Json<JsonValue>, AppError> {
    let rows = players::all_players(&pool).await?;

    let mut rating_sums = [0i64; 4];
    let mut mode_counts = [0u32; 4];
    let mut active_last_7_days = 0u32;

    let week_ago = chrono::Utc::now().timestamp() - 7 * 24 * 3600;

    let parsed: Vec<(String, Option<PlayerStats>)> = rows
        .iter()
        .map(|row| {
            let stats = row
                .stats
                .clone()
                .and_then(|v| serde_json::from_value(v).ok());
            (row.username_key.clone(), stats)
        })
        .collect();

    for (row, (_, stats)) in rows.iter().zip(&parsed) {
        if row.last_online.is_some_and(|last| last >= week_ago) {
            active_last_7_days += 1;
        }

        let Some(stats) = stats else { continue };
        for (i, mode) in mode_ratings(stats).into_iter().enumerate() {
            if let Some(rating) = mode {
                rating_sums[i] += rating as i64;
                mode_counts[i] += 1;
            }
        }
    }

    let avg_ratings: Vec<(&str, Option<i64>)> = MODES
        .iter()
        .enumerate()
        .map(|(i, mode)| {
            let avg = if mode_counts[i] > 0 {
                Some((rating_sums[i] as f64 / mode_counts[i] as f64).round() as i64)
            } else {
                None
            };
            (*mode, avg)
        })
        .collect();

    let most_played_mode = MODES
        .iter()
        .enumerate()
        .max_by_key(|(i, _)| mode_counts[*i])
        .filter(|(i, _)| mode_counts[*i] > 0)
        .map(|(_, mode)| *mode);

    let total_modes: u32 = mode_counts.iter().sum();
    let community_style = if total_modes == 0 {
        "No rated players yet"
    } else if mode_counts[1] as f64 / total_modes as f64 > 0.45 {
        "Blitz-focused community"
    } else if mode_counts[0] as f64 / total_modes as f64 > 0.45 {
        "Methodical community (rapid dominant)"
    } else {
        "Diverse community"
    };

    let player_style_match = match maybe_user.0.as_ref().and_then(|u| u.chess_username.clone()) {
        Some(chess_username) => {
            let key = chess_username.to_lowercase();
            let own = parsed
                .iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, stats)| stats.as_ref());
            match (own.and_then(top_mode), most_played_mode) {
                (Some(own_mode), Some(community_mode)) if own_mode == community_mode => {
                    "Your style matches the community."
                }
                (Some(_), Some(_)) => "Your style differs from the community pattern.",
                _ => "Not enough data.",
            }
        }
        None => "Not enough data.",
    };

    let mode_distribution: JsonValue = MODES
        .iter()
        .enumerate()
        .map(|(i, mode)| (mode.to_string(), json!(mode_counts[i])))
        .collect::<serde_json::Map<_, _>>()
        .into();
    let avg_ratings: JsonValue = avg_ratings
        .into_iter()
        .map(|(mode, avg)| (mode.to_string(), json!(avg)))
        .collect::<serde_json::Map<_, _>>()
        .into();

    Ok(Json(json!({
        "totalPlayers": rows.len(),
        "avgRatings": avg_ratings,
        "modeDistribution": mode_distribution,
        "mostPlayedMode": most_played_mode,
        "activeLast7Days": active_last_7_days,
        "communityStyle": community_style,
        "playerStyleMatch": player_style_match,
    })))
}

fn mode_ratings(stats: &PlayerStats) -> [Option<i32>; 4] {
    [
        stats.rapid.map(|m| m.rating),
        stats.blitz.map(|m| m.rating),
        stats.bullet.map(|m| m.rating),
        stats.daily.map(|m| m.rating),
    ]
}

/// The mode this player has the most games in.
fn top_mode(stats: &PlayerStats) -> Option<&'static str> {
    let games = [
        stats.rapid.map(|m| m.games).unwrap_or(0),
        stats.blitz.map(|m| m.games).unwrap_or(0),
        stats.bullet.map(|m| m.games).unwrap_or(0),
        stats.daily.map(|m| m.games).unwrap_or(0),
    ];
    MODES
        .iter()
        .enumerate()
        .max_by_key(|(i, _)| games[*i])
        .filter(|(i, _)| games[*i] > 0)
        .map(|(_, mode)| *mode)
}
