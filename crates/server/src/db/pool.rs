use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run the full Postgres schema migration inline.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Accounts (app authentication + linked Chess.com username)
CREATE TABLE IF NOT EXISTS accounts (
    id            BIGSERIAL PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    display_name  TEXT,
    chess_username TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_accounts_email_lower
    ON accounts (LOWER(email));
CREATE INDEX IF NOT EXISTS idx_accounts_username_lower
    ON accounts (LOWER(username));

-- Chess.com profile cache, keyed by normalized username
CREATE TABLE IF NOT EXISTS players (
    username_key TEXT PRIMARY KEY,
    username     TEXT NOT NULL,
    name         TEXT,
    avatar       TEXT,
    location     TEXT,
    joined       BIGINT,
    last_online  BIGINT,
    followers    INTEGER NOT NULL DEFAULT 0,
    is_streamer  BOOLEAN NOT NULL DEFAULT FALSE,
    status       TEXT,
    twitch_url   TEXT,
    stats        JSONB,
    fetched_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Completed games, keyed by the id derived from the game URL.
-- Immutable once written; re-writes merge the same fields.
CREATE TABLE IF NOT EXISTS games (
    id                TEXT PRIMARY KEY,
    username          TEXT NOT NULL,
    end_time          BIGINT,
    opening           TEXT NOT NULL,
    eco               TEXT,
    color             TEXT NOT NULL,
    result            TEXT NOT NULL,
    opponent_username TEXT NOT NULL,
    opponent_rating   INTEGER,
    first_move        TEXT,
    time_class        TEXT NOT NULL,
    move_count        INTEGER NOT NULL DEFAULT 0,
    url               TEXT,
    pgn               TEXT,
    analysis          JSONB,
    analyzed_at       TIMESTAMPTZ,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_games_username_lower
    ON games (LOWER(username));
CREATE INDEX IF NOT EXISTS idx_games_end_time
    ON games (end_time DESC);

-- Follow edges: at most one row per (follower, normalized target)
CREATE TABLE IF NOT EXISTS follows (
    follower_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    target_key  TEXT NOT NULL,
    username    TEXT NOT NULL,
    avatar      TEXT,
    added_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (follower_id, target_key)
);

CREATE INDEX IF NOT EXISTS idx_follows_added_at
    ON follows (follower_id, added_at DESC);

-- One leaderboard snapshot per calendar day
CREATE TABLE IF NOT EXISTS top_players_daily (
    day        TEXT PRIMARY KEY,
    mode       TEXT NOT NULL,
    source     TEXT NOT NULL,
    players    JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Page-view log backing the activity analytics
CREATE TABLE IF NOT EXISTS web_activity (
    id       BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL DEFAULT 'anonymous',
    page     TEXT NOT NULL,
    at       BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_web_activity_at
    ON web_activity (at DESC);
"#;
