use server::clients::chess_com::ChessComClient;
use server::config;
use server::db;
use server::routes;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    // Connect to Postgres
    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run schema migrations
    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // One Chess.com client for the whole process; handlers receive it via
    // an Extension rather than reaching for a global.
    let chess_client = ChessComClient::new(
        &config.chess_api_base,
        config.archive_fetch_concurrency,
    );

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        // Own profile (display name, linked Chess.com username)
        .route("/api/users/me", put(routes::profile::update_profile))
        // Player lookups
        .route("/api/players/{username}", get(routes::profile::get_player))
        .route(
            "/api/players/{username}/stats",
            get(routes::stats::get_player_stats),
        )
        .route("/api/rivalry/{opponent}", get(routes::rivalry::get_rivalry))
        // Stored games + memoized analysis
        .route("/api/games/{game_id}", get(routes::games::get_game))
        .route(
            "/api/games/{game_id}/analysis",
            get(routes::games::get_game_analysis),
        )
        // Social graph
        .route("/api/social/follow", post(routes::social::follow))
        .route(
            "/api/social/follow/{username}",
            get(routes::social::is_following).delete(routes::social::unfollow),
        )
        .route("/api/social/following", get(routes::social::list_following))
        // Community-wide views
        .route("/api/leaderboard/top", get(routes::leaderboard::get_top_players))
        .route(
            "/api/community/stats",
            get(routes::community::get_community_stats),
        )
        // Activity log
        .route("/api/activity", post(routes::activity::record_visit))
        .route(
            "/api/analytics/activity",
            get(routes::activity::get_activity_overview),
        )
        // Shared state
        .layer(Extension(pool))
        .layer(Extension(config.clone()))
        .layer(Extension(chess_client))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
