use std::collections::BTreeMap;

use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value as JsonValue};

use chess_core::aggregate::TimeClassRecord;
use chess_core::outcome::Outcome;

use crate::auth::middleware::AuthUser;
use crate::clients::chess_com::ChessComClient;
use crate::config::Config;
use crate::error::AppError;

/// GET /api/rivalry/{opponent}
///
/// Head-to-head record between the caller's linked Chess.com account and
/// the named opponent, scanned from the opponent's most recent monthly
/// archives (the configured window, default 12). Long shared histories
/// are under-sampled by that window, a cost tradeoff. Nothing
/// is cached; every view re-fetches and re-scans.
pub async fn get_rivalry(
    Extension(config): Extension<Config>,
    Extension(client): Extension<ChessComClient>,
    user: AuthUser,
    Path(opponent): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let me = user
        .chess_username
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AppError::BadRequest(
            "No Chess.com username linked to account".into(),
        ))?
        .to_string();

    let all_archives = client.fetch_archives(&opponent).await.unwrap_or_else(|e| {
        tracing::warn!("Archive index fetch failed for {opponent}: {e}");
        Vec::new()
    });
    let archives = scan_window(all_archives, config.rivalry_archive_window);

    let me_key = me.to_lowercase();
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut draws = 0u32;
    let mut detailed: BTreeMap<String, TimeClassRecord> = BTreeMap::new();
    let mut shared_games: Vec<JsonValue> = Vec::new();

    for archive_url in &archives {
        let month_games = client
            .fetch_archive_games(archive_url)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Skipping archive {archive_url}: {e}");
                Vec::new()
            });

        for game in month_games {
            let involves_me = game.white.username.eq_ignore_ascii_case(&me_key)
                || game.black.username.eq_ignore_ascii_case(&me_key);
            if !involves_me {
                continue;
            }

            let (side, _) = game.perspective(&me);
            let outcome = Outcome::from_token(&side.result);
            match outcome {
                Outcome::Win => wins += 1,
                Outcome::Loss => losses += 1,
                Outcome::Draw => draws += 1,
            }

            let time_class = game.time_class.clone().unwrap_or_else(|| "unknown".into());
            let bucket = detailed.entry(time_class.clone()).or_default();
            bucket.total += 1;
            match outcome {
                Outcome::Win => bucket.wins += 1,
                Outcome::Loss => bucket.losses += 1,
                Outcome::Draw => bucket.draws += 1,
            }

            shared_games.push(json!({
                "id": game.derived_id(&me),
                "url": game.url,
                "endTime": game.end_time,
                "timeClass": time_class,
                "result": outcome.as_str(),
            }));
        }
    }

    Ok(Json(json!({
        "me": me,
        "opponent": opponent,
        "wins": wins,
        "losses": losses,
        "draws": draws,
        "total": wins + losses + draws,
        "detailed": detailed,
        "games": shared_games,
        "archivesScanned": archives.len(),
    })))
}

/// The archive URLs a scan actually visits: the `window` most recent
/// months, newest first. The index arrives oldest-first from the API.
fn scan_window(mut archives: Vec<String>, window: usize) -> Vec<String> {
    archives.reverse();
    archives.truncate(window);
    archives
}
