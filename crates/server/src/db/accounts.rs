use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub chess_username: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

const ACCOUNT_COLUMNS: &str =
    "id, username, email, password_hash, display_name, chess_username, created_at";

pub async fn create_account(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    chess_username: Option<&str>,
) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as(
        r#"INSERT INTO accounts (username, email, password_hash, chess_username, display_name)
           VALUES ($1, $2, $3, $4, $1)
           RETURNING id"#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(chess_username)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

pub async fn get_account_by_id(pool: &PgPool, id: i64) -> Result<Option<Account>, AppError> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn get_account_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Account>, AppError> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE LOWER(email) = LOWER($1))")
            .bind(email)
            .fetch_one(pool)
            .await
            .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM accounts WHERE LOWER(username) = LOWER($1))")
            .bind(username)
            .fetch_one(pool)
            .await
            .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

/// Partial profile update; absent fields keep their current value.
pub async fn update_account(
    pool: &PgPool,
    account_id: i64,
    display_name: Option<&str>,
    chess_username: Option<&str>,
) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>(&format!(
        r#"UPDATE accounts SET
            display_name = COALESCE($2, display_name),
            chess_username = COALESCE($3, chess_username)
        WHERE id = $1
        RETURNING {ACCOUNT_COLUMNS}"#
    ))
    .bind(account_id)
    .bind(display_name)
    .bind(chess_username)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn update_password_hash(
    pool: &PgPool,
    account_id: i64,
    new_hash: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
        .bind(account_id)
        .bind(new_hash)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(())
}
