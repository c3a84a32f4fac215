pub mod db;
pub mod models;
pub mod repositories;

pub use sqlx;

use anyhow::{Context, Result};

use crate::repositories::Repositories;

/// Connects, runs migrations and hands back every repository sharing the pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<Repositories> {
    let pool = db::init_db(url, max_connections).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run DB migrations")?;

    Ok(Repositories::new(pool))
}
