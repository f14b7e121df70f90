use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub username: String,
    pub page: String,
    /// Epoch milliseconds.
    pub at: i64,
}

pub async fn record(
    pool: &PgPool,
    username: &str,
    page: &str,
    at_ms: i64,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO web_activity (username, page, at) VALUES ($1, $2, $3)")
        .bind(username)
        .bind(page)
        .bind(at_ms)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(())
}

/// Full log, newest first. The analytics view recomputes its aggregates
/// from this on every request rather than maintaining counters.
pub async fn all_logs(pool: &PgPool) -> Result<Vec<ActivityLog>, AppError> {
    sqlx::query_as::<_, ActivityLog>(
        "SELECT username, page, at FROM web_activity ORDER BY at DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}
