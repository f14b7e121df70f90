//! Heuristic single-game analysis over a rules-aware replay.
//!
//! Move legality and side-to-move are delegated to shakmaty; this module
//! only counts what happened. The blunder counter is a proxy (an
//! uncompensated capture of a piece worth 3+), not a tactical evaluation:
//! sacrifices read as blunders and delayed recaptures hide real ones.

use serde::{Deserialize, Serialize};
use shakmaty::{san::SanPlus, Chess, Color, Position, Role};

use crate::pgn;

fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight | Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideCounts {
    pub white: u32,
    pub black: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracySplit {
    pub white: u32,
    pub black: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub opening: String,
    pub accuracy: AccuracySplit,
    pub blunders: SideCounts,
    pub aggressiveness: SideCounts,
    pub captures: SideCounts,
    pub checks: SideCounts,
    /// Point balance of captured material; positive favors white.
    pub material_diff: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no moves found in PGN")]
    EmptyMovetext,
    #[error("unparseable move `{san}` at ply {ply}")]
    BadSan { ply: usize, san: String },
    #[error("illegal move `{san}` at ply {ply}")]
    IllegalMove { ply: usize, san: String },
}

/// Accuracy source for a game. The default is a simulation placeholder;
/// the trait leaves room for an engine-backed estimator.
pub trait AccuracyEstimator: Send + Sync {
    fn estimate(&self, result: Option<&str>, ply_count: usize) -> AccuracySplit;
}

/// Placeholder estimator: a bounded random value nudged by result and game
/// length. Not derived from the replay, and not deterministic between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAccuracy;

impl AccuracyEstimator for SimulatedAccuracy {
    fn estimate(&self, result: Option<&str>, ply_count: usize) -> AccuracySplit {
        use rand::Rng;

        let mut rng = rand::rng();
        let mut white: f32 = 70.0 + rng.random_range(0.0..25.0);
        let mut black: f32 = 70.0 + rng.random_range(0.0..25.0);

        match result {
            Some("1-0") => {
                white = (white + 5.0).min(99.0);
                black = (black - 10.0).max(10.0);
            }
            Some("0-1") => {
                black = (black + 5.0).min(99.0);
                white = (white - 10.0).max(10.0);
            }
            _ => {}
        }
        if ply_count < 20 {
            white = (white + 5.0).min(99.0);
            black = (black + 5.0).min(99.0);
        }

        AccuracySplit {
            white: white.round() as u32,
            black: black.round() as u32,
        }
    }
}

/// Deterministic estimator for tests and offline recomputation.
#[derive(Debug, Clone, Copy)]
pub struct FixedAccuracy {
    pub white: u32,
    pub black: u32,
}

impl AccuracyEstimator for FixedAccuracy {
    fn estimate(&self, _result: Option<&str>, _ply_count: usize) -> AccuracySplit {
        AccuracySplit {
            white: self.white,
            black: self.black,
        }
    }
}

struct Ply {
    by_white: bool,
    captured_value: Option<i32>,
    gives_check: bool,
}

/// Replay a game's movetext and produce the heuristic counters. Malformed
/// or illegal movetext is a typed error, so callers can tell "nothing
/// interesting happened" apart from "failed to parse".
pub fn analyze_game(
    pgn_text: &str,
    estimator: &dyn AccuracyEstimator,
) -> Result<GameAnalysis, AnalysisError> {
    let moves = pgn::extract_moves(pgn_text);
    if moves.is_empty() {
        return Err(AnalysisError::EmptyMovetext);
    }

    let mut pos = Chess::default();
    let mut plies: Vec<Ply> = Vec::with_capacity(moves.len());

    for (i, san_str) in moves.iter().enumerate() {
        let san: SanPlus = san_str.parse().map_err(|_| AnalysisError::BadSan {
            ply: i,
            san: san_str.clone(),
        })?;
        let m = san
            .san
            .to_move(&pos)
            .map_err(|_| AnalysisError::IllegalMove {
                ply: i,
                san: san_str.clone(),
            })?;

        plies.push(Ply {
            by_white: pos.turn() == Color::White,
            captured_value: m.capture().map(piece_value),
            gives_check: san_str.contains('+') || san_str.contains('#'),
        });
        pos.play_unchecked(m);
    }

    let mut captures = SideCounts::default();
    let mut checks = SideCounts::default();
    let mut blunders = SideCounts::default();
    let mut material_diff = 0i32;

    for (i, ply) in plies.iter().enumerate() {
        if let Some(value) = ply.captured_value {
            if ply.by_white {
                captures.white += 1;
                material_diff += value;
            } else {
                captures.black += 1;
                material_diff -= value;
            }
        }
        if ply.gives_check {
            if ply.by_white {
                checks.white += 1;
            } else {
                checks.black += 1;
            }
        }

        // Uncompensated capture of a minor piece or better: the side that
        // moved just before the capture left it hanging.
        if i > 0 {
            if let Some(value) = ply.captured_value.filter(|v| *v >= 3) {
                let recaptured = plies
                    .get(i + 1)
                    .and_then(|next| next.captured_value)
                    .is_some_and(|next_value| next_value >= value);
                if !recaptured {
                    if plies[i - 1].by_white {
                        blunders.white += 1;
                    } else {
                        blunders.black += 1;
                    }
                }
            }
        }
    }

    let white_moves = plies.iter().filter(|p| p.by_white).count() as u32;
    let black_moves = plies.len() as u32 - white_moves;
    let aggressiveness = SideCounts {
        white: aggression(captures.white + checks.white, white_moves),
        black: aggression(captures.black + checks.black, black_moves),
    };

    let result = pgn::extract_header(pgn_text, "Result");
    let opening = pgn::extract_header(pgn_text, "Opening")
        .or_else(|| pgn::extract_header(pgn_text, "ECO").map(|eco| format!("ECO {eco}")))
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(GameAnalysis {
        opening,
        accuracy: estimator.estimate(result.as_deref(), plies.len()),
        blunders,
        aggressiveness,
        captures,
        checks,
        material_diff,
    })
}

fn aggression(active_moves: u32, own_moves: u32) -> u32 {
    if own_moves == 0 {
        return 0;
    }
    (active_moves as f64 / own_moves as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: FixedAccuracy = FixedAccuracy {
        white: 80,
        black: 80,
    };

    #[test]
    fn test_uncompensated_queen_capture() {
        // 4. Nxd5 wins the queen outright; black never recaptures.
        let pgn = "1. e4 d5 2. exd5 Qxd5 3. Nc3 e5 4. Nxd5";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.material_diff, 9);
        assert_eq!(a.captures, SideCounts { white: 2, black: 1 });
        // The queen was left hanging by black's previous move.
        assert_eq!(a.blunders, SideCounts { white: 0, black: 1 });
    }

    #[test]
    fn test_equal_knight_trade_balances_out() {
        let pgn = "1. e4 Nf6 2. Nc3 Nc6 3. Nd5 Nxd5 4. exd5";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.material_diff, 0);
        assert_eq!(a.captures, SideCounts { white: 1, black: 1 });
    }

    #[test]
    fn test_checks_counted_from_san_markers() {
        let pgn = "1. e4 e5 2. Qh5 Nc6 3. Qxf7#";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.checks, SideCounts { white: 1, black: 0 });
        assert_eq!(a.captures.white, 1);
        assert_eq!(a.material_diff, 1);
    }

    #[test]
    fn test_aggressiveness_rounded_percentage() {
        // White: 3 moves, 1 capture + 1 check = 67. Black: 2 quiet moves.
        let pgn = "1. e4 e5 2. Qh5 Nc6 3. Qxf7#";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.aggressiveness, SideCounts { white: 67, black: 0 });
    }

    #[test]
    fn test_opening_from_headers() {
        let pgn = "[Opening \"Italian Game\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.opening, "Italian Game");

        let pgn = "[ECO \"C50\"]\n\n1. e4 e5";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.opening, "ECO C50");

        let pgn = "1. e4 e5";
        let a = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.opening, "Unknown");
    }

    #[test]
    fn test_empty_movetext_is_an_error() {
        assert!(matches!(
            analyze_game("", &FIXED),
            Err(AnalysisError::EmptyMovetext)
        ));
    }

    #[test]
    fn test_illegal_movetext_is_an_error() {
        let pgn = "1. e4 e5 2. Qh7";
        assert!(matches!(
            analyze_game(pgn, &FIXED),
            Err(AnalysisError::IllegalMove { ply: 2, .. })
        ));
    }

    #[test]
    fn test_fixed_estimator_is_deterministic() {
        let pgn = "1. e4 e5 2. Nf3 Nc6";
        let a = analyze_game(pgn, &FIXED).unwrap();
        let b = analyze_game(pgn, &FIXED).unwrap();
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.material_diff, b.material_diff);
    }

    #[test]
    fn test_simulated_accuracy_ranges() {
        // Decisive result: winner in [70, 99], loser in [10, 99].
        for _ in 0..50 {
            let acc = SimulatedAccuracy.estimate(Some("1-0"), 40);
            assert!((70..=99).contains(&acc.white), "white {}", acc.white);
            assert!((10..=99).contains(&acc.black), "black {}", acc.black);
        }
        // Short games get the +5 nudge, still capped at 99.
        for _ in 0..50 {
            let acc = SimulatedAccuracy.estimate(None, 10);
            assert!((70..=99).contains(&acc.white));
            assert!((70..=99).contains(&acc.black));
        }
    }
}
