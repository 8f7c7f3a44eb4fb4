//! User account persistence (`users` table, unique key on `email`).

use sqlx::MySqlPool;
use tracing::info;

use crate::models::user::UserRow;

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &MySqlPool, id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Inserts a user and returns the new row id.
pub async fn create_user(
    pool: &MySqlPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?)")
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .execute(pool)
        .await?;

    let id = result.last_insert_id() as i64;
    info!("Registered user {id}");
    Ok(id)
}
