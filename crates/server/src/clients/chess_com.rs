//! Chess.com public API client.
//!
//! Non-2xx responses are a normal "no data" outcome and come back as
//! `None`/empty; only transport and decode failures surface as errors.
//! No call is ever retried.

use std::time::Duration;

use futures::{stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chess_core::game_data::ApiGame;

/// Courtesy pause between consecutive upstream calls.
const REQUEST_PACING: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub followers: i32,
    #[serde(default)]
    pub is_streamer: bool,
    #[serde(default)]
    pub joined: Option<i64>,
    #[serde(default)]
    pub last_online: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub twitch_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModeStats {
    pub rating: i32,
    pub games: i32,
    pub win: i32,
    pub loss: i32,
    pub draw: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PuzzleStats {
    pub rating: i32,
    pub best: i32,
    pub total: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub rapid: Option<ModeStats>,
    pub blitz: Option<ModeStats>,
    pub bullet: Option<ModeStats>,
    pub daily: Option<ModeStats>,
    pub puzzles: Option<PuzzleStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rank: Option<i32>,
    #[serde(default)]
    pub score: Option<i32>,
}

#[derive(Clone)]
pub struct ChessComClient {
    client: Client,
    base_url: String,
    archive_concurrency: usize,
}

impl ChessComClient {
    pub fn new(base_url: &str, archive_concurrency: usize) -> Self {
        let client = Client::builder()
            .user_agent("ChessStats/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            archive_concurrency: archive_concurrency.max(1),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Option<Value>, String> {
        tokio::time::sleep(REQUEST_PACING).await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if !resp.status().is_success() {
            return Ok(None);
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| format!("JSON parse error: {e}"))
    }

    /// GET /pub/player/{username}: the public profile, or None if the
    /// player does not exist.
    pub async fn fetch_player(&self, username: &str) -> Result<Option<PlayerProfile>, String> {
        let url = format!("{}/pub/player/{}", self.base_url, username.to_lowercase());
        match self.get_json(&url).await? {
            Some(data) => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| format!("Profile decode error: {e}")),
            None => Ok(None),
        }
    }

    /// GET /pub/player/{username}/stats: per-mode rating records.
    pub async fn fetch_player_stats(&self, username: &str) -> Result<Option<PlayerStats>, String> {
        let url = format!(
            "{}/pub/player/{}/stats",
            self.base_url,
            username.to_lowercase()
        );
        let Some(data) = self.get_json(&url).await? else {
            return Ok(None);
        };

        Ok(Some(PlayerStats {
            rapid: mode_stats(&data["chess_rapid"]),
            blitz: mode_stats(&data["chess_blitz"]),
            bullet: mode_stats(&data["chess_bullet"]),
            daily: mode_stats(&data["chess_daily"]),
            puzzles: puzzle_stats(&data["tactics"]),
        }))
    }

    /// GET /pub/player/{username}/games/archives: monthly archive URLs,
    /// oldest first as the API serves them.
    pub async fn fetch_archives(&self, username: &str) -> Result<Vec<String>, String> {
        let url = format!(
            "{}/pub/player/{}/games/archives",
            self.base_url,
            username.to_lowercase()
        );
        let Some(data) = self.get_json(&url).await? else {
            return Ok(vec![]);
        };

        Ok(data["archives"]
            .as_array()
            .map(|urls| {
                urls.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// One monthly archive's games, in the chronological order served.
    pub async fn fetch_archive_games(&self, archive_url: &str) -> Result<Vec<ApiGame>, String> {
        let Some(data) = self.get_json(archive_url).await? else {
            return Ok(vec![]);
        };

        match data.get("games") {
            Some(games) => serde_json::from_value(games.clone())
                .map_err(|e| format!("Archive decode error: {e}")),
            None => Ok(vec![]),
        }
    }

    /// Walk the monthly archives newest-first and flatten their games into
    /// a newest-first list capped at `limit`. Archives move through a
    /// bounded pipeline (`archive_concurrency` in flight, 1 = sequential);
    /// a failed archive is logged and skipped, never retried.
    pub async fn fetch_recent_games(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<ApiGame>, String> {
        let mut archives = self.fetch_archives(username).await?;
        if archives.is_empty() {
            return Ok(vec![]);
        }
        archives.reverse();

        let mut all = Vec::with_capacity(limit);
        let mut months = stream::iter(
            archives
                .into_iter()
                .map(|url| async move { (self.fetch_archive_games(&url).await, url) }),
        )
        .buffered(self.archive_concurrency);

        while let Some((result, url)) = months.next().await {
            let mut games = match result {
                Ok(games) => games,
                Err(e) => {
                    tracing::warn!("Skipping archive {url}: {e}");
                    continue;
                }
            };
            // Each archive runs oldest to newest; we want the tail first.
            games.reverse();
            for game in games {
                all.push(game);
                if all.len() >= limit {
                    return Ok(all);
                }
            }
        }

        Ok(all)
    }

    /// GET /pub/leaderboards: the live rapid top list, truncated to
    /// `count` entries.
    pub async fn fetch_leaderboard(&self, count: usize) -> Result<Vec<LeaderboardPlayer>, String> {
        let url = format!("{}/pub/leaderboards", self.base_url);
        let Some(data) = self.get_json(&url).await? else {
            return Ok(vec![]);
        };

        let Some(entries) = data["live_rapid"].as_array() else {
            return Ok(vec![]);
        };

        entries
            .iter()
            .take(count)
            .map(|entry| {
                serde_json::from_value(entry.clone())
                    .map_err(|e| format!("Leaderboard decode error: {e}"))
            })
            .collect()
    }
}

/// Map one raw per-mode block. Modes without a `last` rating are treated
/// as never played.
fn mode_stats(category: &Value) -> Option<ModeStats> {
    let rating = category.get("last")?.get("rating")?.as_i64()? as i32;
    let record = category.get("record").cloned().unwrap_or(Value::Null);
    let win = record.get("win").and_then(Value::as_i64).unwrap_or(0) as i32;
    let loss = record.get("loss").and_then(Value::as_i64).unwrap_or(0) as i32;
    let draw = record.get("draw").and_then(Value::as_i64).unwrap_or(0) as i32;

    Some(ModeStats {
        rating,
        games: win + loss + draw,
        win,
        loss,
        draw,
    })
}

fn puzzle_stats(tactics: &Value) -> Option<PuzzleStats> {
    let highest = tactics.get("highest")?;
    let rating = highest.get("rating").and_then(Value::as_i64).unwrap_or(0) as i32;
    Some(PuzzleStats {
        rating,
        best: rating,
        total: highest.get("games").and_then(Value::as_i64).unwrap_or(0) as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_stats_mapping() {
        let raw = json!({
            "last": { "rating": 1450 },
            "record": { "win": 10, "loss": 5, "draw": 2 }
        });
        let stats = mode_stats(&raw).unwrap();
        assert_eq!(stats.rating, 1450);
        assert_eq!(stats.games, 17);

        // A mode without a last rating was never played.
        assert!(mode_stats(&json!({})).is_none());
        assert!(mode_stats(&json!({ "record": { "win": 1 } })).is_none());
    }

    #[test]
    fn test_puzzle_stats_mapping() {
        let raw = json!({ "highest": { "rating": 2100, "games": 340 } });
        let stats = puzzle_stats(&raw).unwrap();
        assert_eq!(stats.rating, 2100);
        assert_eq!(stats.best, 2100);
        assert_eq!(stats.total, 340);

        assert!(puzzle_stats(&json!({})).is_none());
    }
}
