//! Single-pass aggregation of a game list into per-player statistics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::game_data::ApiGame;
use crate::openings::{self, UNKNOWN_OPENING};
use crate::outcome::Outcome;
use crate::pgn;

/// Per-opening tally. Winrate is derived at read time, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct OpeningRecord {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl OpeningRecord {
    /// Win percentage fixed to one decimal.
    pub fn winrate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.wins as f64 / self.games as f64 * 1000.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TimeClassRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub total: u32,
}

impl TimeClassRecord {
    fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }
}

/// Win/loss runs, walked oldest to newest. `current` is positive for a
/// run of wins, negative for a run of losses, zero after a draw.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StreakSummary {
    pub current: i32,
    pub best_win_streak: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerAggregate {
    pub username: String,
    pub total: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub white_games: u32,
    pub black_games: u32,
    pub by_opening: Vec<OpeningRecord>,
    pub by_time_class: BTreeMap<String, TimeClassRecord>,
    pub avg_opponent_rating: Option<i32>,
    pub top_first_move: Option<String>,
    pub streaks: StreakSummary,
}

impl PlayerAggregate {
    /// Overall win percentage, one decimal.
    pub fn winrate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.wins as f64 / self.total as f64 * 1000.0).round() / 10.0
    }
}

/// Fold a game list into counts. Expects the list newest-first (the order
/// the archive fetcher produces); streaks are computed over the reversed
/// walk. Games whose opening classifies as "Unknown Opening" stay out of
/// the per-opening table but still count everywhere else.
pub fn aggregate_games(games: &[ApiGame], username: &str) -> PlayerAggregate {
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut draws = 0u32;
    let mut white_games = 0u32;
    let mut black_games = 0u32;

    let mut opening_index: HashMap<String, usize> = HashMap::new();
    let mut by_opening: Vec<OpeningRecord> = Vec::new();
    let mut by_time_class: BTreeMap<String, TimeClassRecord> = BTreeMap::new();

    let mut rating_sum = 0i64;
    let mut rated_opponents = 0u32;
    let mut first_moves: HashMap<String, u32> = HashMap::new();

    for game in games {
        let pgn_text = game.pgn.as_deref().unwrap_or("");
        let (side, opponent) = game.perspective(username);
        let outcome = Outcome::from_token(&side.result);

        if game.is_white(username) {
            white_games += 1;
        } else {
            black_games += 1;
        }
        match outcome {
            Outcome::Win => wins += 1,
            Outcome::Loss => losses += 1,
            Outcome::Draw => draws += 1,
        }

        // Prefer the opening the archive already names; classify from the
        // PGN otherwise.
        let opening = game
            .opening
            .as_ref()
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| openings::classify_opening(pgn_text).name);
        if opening != UNKNOWN_OPENING {
            let idx = *opening_index.entry(opening.clone()).or_insert_with(|| {
                by_opening.push(OpeningRecord {
                    name: opening.clone(),
                    games: 0,
                    wins: 0,
                    losses: 0,
                    draws: 0,
                });
                by_opening.len() - 1
            });
            let record = &mut by_opening[idx];
            record.games += 1;
            match outcome {
                Outcome::Win => record.wins += 1,
                Outcome::Loss => record.losses += 1,
                Outcome::Draw => record.draws += 1,
            }
        }

        let time_class = game.time_class.as_deref().unwrap_or("unknown");
        by_time_class
            .entry(time_class.to_string())
            .or_default()
            .record(outcome);

        if let Some(rating) = opponent.rating {
            rating_sum += rating as i64;
            rated_opponents += 1;
        }
        if let Some(first) = pgn::extract_first_move(pgn_text) {
            *first_moves.entry(first).or_insert(0) += 1;
        }
    }

    // Descending by game count; sort_by is stable, so ties keep first-seen
    // order.
    by_opening.sort_by(|a, b| b.games.cmp(&a.games));

    let avg_opponent_rating = if rated_opponents > 0 {
        Some((rating_sum as f64 / rated_opponents as f64).round() as i32)
    } else {
        None
    };

    let top_first_move = first_moves
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(first_move, _)| first_move);

    let streaks = compute_streaks(games, username);

    PlayerAggregate {
        username: username.to_string(),
        total: wins + losses + draws,
        wins,
        losses,
        draws,
        white_games,
        black_games,
        by_opening,
        by_time_class,
        avg_opponent_rating,
        top_first_move,
        streaks,
    }
}

fn compute_streaks(games: &[ApiGame], username: &str) -> StreakSummary {
    let mut current = 0i32;
    let mut best_win_streak = 0u32;

    for game in games.iter().rev() {
        let (side, _) = game.perspective(username);
        match Outcome::from_token(&side.result) {
            Outcome::Win => {
                current = if current > 0 { current + 1 } else { 1 };
                best_win_streak = best_win_streak.max(current as u32);
            }
            Outcome::Loss => {
                current = if current < 0 { current - 1 } else { -1 };
            }
            Outcome::Draw => {
                current = 0;
            }
        }
    }

    StreakSummary {
        current,
        best_win_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::ApiSide;

    fn game(
        white: &str,
        black: &str,
        white_result: &str,
        black_result: &str,
        time_class: &str,
        pgn: &str,
    ) -> ApiGame {
        ApiGame {
            pgn: Some(pgn.to_string()),
            time_class: Some(time_class.to_string()),
            white: ApiSide {
                username: white.to_string(),
                rating: Some(1500),
                result: white_result.to_string(),
            },
            black: ApiSide {
                username: black.to_string(),
                rating: Some(1400),
                result: black_result.to_string(),
            },
            ..Default::default()
        }
    }

    const SICILIAN: &str = "1. e4 c5 2. Nf3 d6";
    const FRENCH: &str = "1. e4 e6 2. d4 d5";
    const IRREGULAR: &str = "1. a3 a6 2. b3";

    #[test]
    fn test_global_counts_both_colors() {
        // alice: white in 3 games (2 wins, 1 loss), black in 2 (1 win,
        // 1 draw).
        let games = vec![
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "win", "checkmated", "blitz", SICILIAN),
            game("alice", "bob", "timeout", "win", "rapid", FRENCH),
            game("bob", "alice", "checkmated", "win", "rapid", FRENCH),
            game("bob", "alice", "stalemate", "stalemate", "bullet", SICILIAN),
        ];

        let agg = aggregate_games(&games, "Alice");
        assert_eq!(agg.wins, 3);
        assert_eq!(agg.losses, 1);
        assert_eq!(agg.draws, 1);
        assert_eq!(agg.total, 5);
        assert_eq!(agg.white_games, 3);
        assert_eq!(agg.black_games, 2);
    }

    #[test]
    fn test_unknown_opening_excluded_from_breakdown_only() {
        let games = vec![
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "blitz", IRREGULAR),
        ];

        let agg = aggregate_games(&games, "alice");
        assert_eq!(agg.total, 2);
        assert_eq!(agg.wins, 2);
        assert_eq!(agg.by_opening.len(), 1);
        assert_eq!(agg.by_opening[0].name, "Sicilian Defense");
        assert_eq!(agg.by_opening[0].games, 1);
    }

    #[test]
    fn test_opening_breakdown_ordering_and_winrate() {
        let games = vec![
            game("alice", "bob", "win", "resigned", "blitz", FRENCH),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "resigned", "win", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
        ];

        let agg = aggregate_games(&games, "alice");
        assert_eq!(agg.by_opening[0].name, "Sicilian Defense");
        assert_eq!(agg.by_opening[0].games, 3);
        assert_eq!(agg.by_opening[0].winrate(), 66.7);
        assert_eq!(agg.by_opening[1].name, "French Defense");
        assert_eq!(agg.by_opening[1].winrate(), 100.0);
    }

    #[test]
    fn test_named_opening_from_archive_preferred() {
        let mut g = game("alice", "bob", "win", "resigned", "blitz", SICILIAN);
        g.opening = Some(crate::game_data::ApiOpening {
            eco: Some("B23".to_string()),
            name: Some("Closed Sicilian".to_string()),
        });
        let agg = aggregate_games(&[g], "alice");
        assert_eq!(agg.by_opening[0].name, "Closed Sicilian");
    }

    #[test]
    fn test_time_class_buckets() {
        let games = vec![
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "timeout", "win", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "rapid", FRENCH),
        ];

        let agg = aggregate_games(&games, "alice");
        let blitz = &agg.by_time_class["blitz"];
        assert_eq!((blitz.wins, blitz.losses, blitz.total), (1, 1, 2));
        let rapid = &agg.by_time_class["rapid"];
        assert_eq!((rapid.wins, rapid.total), (1, 1));
    }

    #[test]
    fn test_avg_opponent_rating_and_top_first_move() {
        let games = vec![
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("bob", "alice", "resigned", "win", "blitz", FRENCH),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
        ];

        let agg = aggregate_games(&games, "alice");
        // Opponents rated 1400, 1500, 1400.
        assert_eq!(agg.avg_opponent_rating, Some(1433));
        assert_eq!(agg.top_first_move.as_deref(), Some("e4"));
    }

    #[test]
    fn test_streaks_walk_oldest_first() {
        // Newest-first input: loss, then three wins before it.
        let games = vec![
            game("alice", "bob", "resigned", "win", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
            game("alice", "bob", "win", "resigned", "blitz", SICILIAN),
        ];

        let agg = aggregate_games(&games, "alice");
        assert_eq!(agg.streaks.best_win_streak, 3);
        assert_eq!(agg.streaks.current, -1);
    }

    #[test]
    fn test_empty_input() {
        let agg = aggregate_games(&[], "alice");
        assert_eq!(agg.total, 0);
        assert_eq!(agg.winrate(), 0.0);
        assert!(agg.by_opening.is_empty());
        assert_eq!(agg.avg_opponent_rating, None);
        assert_eq!(agg.top_first_move, None);
    }
}
