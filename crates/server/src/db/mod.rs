pub mod accounts;
pub mod activity;
pub mod follows;
pub mod games;
pub mod leaderboard;
pub mod players;
pub mod pool;
