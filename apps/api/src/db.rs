use anyhow::Result;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tracing::info;

/// Creates and returns a MySQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<MySqlPool> {
    info!("Connecting to MySQL...");

    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("MySQL connection pool established");
    Ok(pool)
}
