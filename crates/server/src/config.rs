use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
    pub host: String,
    pub port: u16,
    pub chess_api_base: String,
    /// Default number of recent games aggregated per stats request.
    pub recent_games_limit: usize,
    /// How many monthly archives a rivalry scan covers, newest first.
    pub rivalry_archive_window: usize,
    /// Archive fetches in flight at once. 1 keeps the original sequential
    /// behavior; raise it to trade upstream burst risk for latency.
    pub archive_fetch_concurrency: usize,
    /// Artificial pause before heuristic analysis resolves.
    pub analysis_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string()),
            jwt_expire_hours: env::var("JWT_EXPIRE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(168), // 7 days
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            chess_api_base: env::var("CHESS_API_BASE")
                .unwrap_or_else(|_| "https://api.chess.com".to_string()),
            recent_games_limit: env::var("RECENT_GAMES_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25),
            rivalry_archive_window: env::var("RIVALRY_ARCHIVE_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            archive_fetch_concurrency: env::var("ARCHIVE_FETCH_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            analysis_delay_ms: env::var("ANALYSIS_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
        }
    }
}
