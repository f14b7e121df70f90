//! Typed Chess.com game payloads and the persisted per-game document.

use serde::{Deserialize, Serialize};

use crate::openings;
use crate::pgn;

/// One side of a completed game as served by the monthly archive endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSide {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiOpening {
    #[serde(default)]
    pub eco: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A completed game from a monthly archive. Sparse payloads still
/// deserialize; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiGame {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub time_class: Option<String>,
    #[serde(default = "default_rated")]
    pub rated: bool,
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default)]
    pub white: ApiSide,
    #[serde(default)]
    pub black: ApiSide,
    #[serde(default)]
    pub opening: Option<ApiOpening>,
}

fn default_rated() -> bool {
    true
}

fn default_rules() -> String {
    "chess".to_string()
}

impl ApiGame {
    /// Stable id: the game URL's last path segment, else a
    /// "{username}-{end_time}" fallback for games without a URL.
    pub fn derived_id(&self, username: &str) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            if let Some(segment) = url.trim_end_matches('/').rsplit('/').next() {
                if !segment.is_empty() {
                    return segment.to_string();
                }
            }
        }
        format!("{}-{}", username, self.end_time.unwrap_or(0))
    }

    pub fn is_white(&self, username: &str) -> bool {
        self.white.username.eq_ignore_ascii_case(username)
    }

    /// (own side, opponent side) for `username`: white on a
    /// case-insensitive match, black otherwise.
    pub fn perspective(&self, username: &str) -> (&ApiSide, &ApiSide) {
        if self.is_white(username) {
            (&self.white, &self.black)
        } else {
            (&self.black, &self.white)
        }
    }
}

/// The persisted per-game document, one player's perspective. Written at
/// most once per id; later writes merge-overwrite the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub username: String,
    pub timestamp: Option<i64>,
    pub opening: String,
    pub eco: Option<String>,
    pub color: String,
    pub result: String,
    pub opponent_username: String,
    pub opponent_rating: Option<i32>,
    pub first_move: Option<String>,
    pub time_class: String,
    pub move_count: u32,
    pub url: String,
    pub pgn: String,
}

impl GameRecord {
    pub fn from_api(game: &ApiGame, username: &str) -> GameRecord {
        let pgn_text = game.pgn.as_deref().unwrap_or("");
        let is_white = game.is_white(username);
        let (side, opponent) = game.perspective(username);
        let classified = openings::classify_opening(pgn_text);

        // The archive sometimes repeats the requested username on both
        // sides; fall back to the PGN header tags in that case.
        let mut opponent_name = opponent.username.clone();
        if opponent_name.is_empty() || opponent_name.eq_ignore_ascii_case(username) {
            if let Some(resolved) = pgn::resolve_opponent_name(pgn_text, username) {
                opponent_name = resolved;
            }
        }
        if opponent_name.is_empty() {
            opponent_name = "Unknown".to_string();
        }

        GameRecord {
            id: game.derived_id(username),
            username: username.to_string(),
            timestamp: game.end_time,
            opening: classified.name,
            eco: classified.eco,
            color: if is_white { "white" } else { "black" }.to_string(),
            result: if side.result.is_empty() {
                "unknown".to_string()
            } else {
                side.result.clone()
            },
            opponent_username: opponent_name,
            opponent_rating: opponent.rating,
            first_move: pgn::extract_first_move(pgn_text),
            time_class: game
                .time_class
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            move_count: pgn::count_moves(pgn_text),
            url: game.url.clone().unwrap_or_default(),
            pgn: pgn_text.to_string(),
        }
    }
}
