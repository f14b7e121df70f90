//! Result-token classification from one side's perspective.

use serde::{Deserialize, Serialize};

/// Win/loss/draw from the perspective of the side that reported the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Map a raw Chess.com per-side result token. "win" wins; the four
    /// terminal-loss tokens lose; everything else (agreed, stalemate,
    /// repetition, insufficient, 50move, timevsinsufficient, and any token
    /// the upstream API adds later) counts as a draw. The upstream
    /// vocabulary is not fully documented, so unknown tokens deliberately
    /// default to draw rather than erroring.
    pub fn from_token(token: &str) -> Outcome {
        match token {
            "win" => Outcome::Win,
            "checkmated" | "timeout" | "resigned" | "abandoned" => Outcome::Loss,
            _ => Outcome::Draw,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        }
    }

    pub fn is_win(self) -> bool {
        self == Outcome::Win
    }

    pub fn is_loss(self) -> bool {
        self == Outcome::Loss
    }
}
