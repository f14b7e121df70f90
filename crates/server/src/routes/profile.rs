use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use crate::auth::middleware::AuthUser;
use crate::clients::chess_com::ChessComClient;
use crate::db::{accounts, players};
use crate::error::AppError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub chess_username: Option<String>,
}

/// GET /api/players/{username}
///
/// Read-through profile cache: serve the stored snapshot when present,
/// otherwise fetch profile + stats from Chess.com, merge-upsert, and
/// serve that. An upstream miss is a 404, not an error.
pub async fn get_player(
    Extension(pool): Extension<PgPool>,
    Extension(client): Extension<ChessComClient>,
    Path(username): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    if let Some(row) = players::get_player(&pool, &username).await? {
        return Ok(Json(json!({ "player": row, "cached": true })));
    }

    let profile = client
        .fetch_player(&username)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Player not found".into()))?;

    // Stats are best-effort; a player without rated games has none.
    let stats = client
        .fetch_player_stats(&profile.username)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Stats fetch failed for {}: {e}", profile.username);
            None
        });

    players::upsert_player(&pool, &profile, stats.as_ref()).await?;

    let row = players::get_player(&pool, &profile.username)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to read back cached player".into()))?;

    Ok(Json(json!({ "player": row, "cached": false })))
}

/// PUT /api/users/me
///
/// Display-name and Chess.com-username updates. A chess username is
/// verified against the Chess.com API before it is linked.
pub async fn update_profile(
    Extension(pool): Extension<PgPool>,
    Extension(client): Extension<ChessComClient>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<super::auth::UserResponse>, AppError> {
    if let Some(ref dn) = req.display_name {
        if dn.is_empty() {
            return Err(AppError::BadRequest("Display name cannot be empty".into()));
        }
        if dn.len() > 50 {
            return Err(AppError::BadRequest(
                "Display name must be at most 50 characters".into(),
            ));
        }
    }

    if let Some(ref cc) = req.chess_username {
        if cc.is_empty() || cc.len() > 50 {
            return Err(AppError::BadRequest(
                "Chess.com username must be between 1 and 50 characters".into(),
            ));
        }
        let found = client
            .fetch_player(cc)
            .await
            .map_err(AppError::Internal)?
            .is_some();
        if !found {
            return Err(AppError::BadRequest("Chess.com user not found".into()));
        }
    }

    let updated = accounts::update_account(
        &pool,
        user.id,
        req.display_name.as_deref(),
        req.chess_username.as_deref(),
    )
    .await?;

    Ok(Json(super::auth::account_to_response(&updated)))
}
