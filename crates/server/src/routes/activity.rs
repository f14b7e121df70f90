use std::collections::HashMap;

use axum::{Extension, Json};
use chrono::Timelike;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use crate::auth::middleware::MaybeAuthUser;
use crate::db::activity;
use crate::error::AppError;

const RECENT_LOGS: usize = 50;
const TOP_USERS: usize = 10;

#[derive(Deserialize)]
pub struct RecordVisitRequest {
    pub page: String,
}

/// POST /api/activity
pub async fn record_visit(
    Extension(pool): Extension<PgPool>,
    maybe_user: MaybeAuthUser,
    Json(req): Json<RecordVisitRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let page = req.page.trim();
    if page.is_empty() {
        return Err(AppError::BadRequest("Page cannot be empty".into()));
    }

    let username = maybe_user
        .0
        .map(|u| u.username)
        .unwrap_or_else(|| "anonymous".to_string());

    activity::record(
        &pool,
        &username,
        page,
        chrono::Utc::now().timestamp_millis(),
    )
    .await?;

    Ok(Json(json!({ "recorded": true })))
}

/// GET /api/analytics/activity
///
/// Everything the analytics view needs in one pass over the log.
pub async fn get_activity_overview(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<JsonValue>, AppError> {
    let logs = activity::all_logs(&pool).await?;
    let now_ms = chrono::Utc::now().timestamp_millis();

    let total_visits = logs.len();
    let week_ago_ms = now_ms - 7 * 24 * 3600 * 1000;
    let visits_this_week = logs.iter().filter(|l| l.at >= week_ago_ms).count();

    let mut users: HashMap<&str, u32> = HashMap::new();
    let mut by_day: HashMap<String, u32> = HashMap::new();
    let mut by_hour = [0u32; 24];

    for log in &logs {
        *users.entry(log.username.as_str()).or_insert(0) += 1;
        if let Some(dt) = chrono::DateTime::from_timestamp_millis(log.at) {
            *by_day.entry(dt.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
            by_hour[dt.hour() as usize] += 1;
        }
    }

    // Logs are newest-first; the oldest entry anchors the avg/day window.
    let days_active = logs
        .last()
        .map(|oldest| ((now_ms - oldest.at) as f64 / (24.0 * 3600.0 * 1000.0)).round() as i64)
        .unwrap_or(0)
        .max(1);
    let avg_per_day = (total_visits as f64 / days_active as f64 * 10.0).round() / 10.0;

    let mut top_users: Vec<(&str, u32)> = users.iter().map(|(u, c)| (*u, *c)).collect();
    top_users.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_users: Vec<JsonValue> = top_users
        .into_iter()
        .take(TOP_USERS)
        .map(|(username, visits)| json!({ "username": username, "visits": visits }))
        .collect();

    let mut by_day: Vec<(String, u32)> = by_day.into_iter().collect();
    by_day.sort_by(|a, b| a.0.cmp(&b.0));
    let by_day: Vec<JsonValue> = by_day
        .into_iter()
        .map(|(day, visits)| json!({ "day": day, "visits": visits }))
        .collect();

    let recent: Vec<&activity::ActivityLog> = logs.iter().take(RECENT_LOGS).collect();

    Ok(Json(json!({
        "totalVisits": total_visits,
        "uniqueUsers": users.len(),
        "visitsThisWeek": visits_this_week,
        "avgPerDay": avg_per_day,
        "byDay": by_day,
        "byHour": by_hour.to_vec(),
        "topUsers": top_users,
        "recent": recent,
    })))
}
