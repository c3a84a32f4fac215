use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

pub fn validate_url(database_url: &str) -> Result<()> {
    if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
        return Err(anyhow::anyhow!(
            "DATABASE_URL must start with postgres:// or postgresql://"
        ));
    }
    Ok(())
}

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<PgPool> {
    validate_url(database_url)?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("Connected to PostgreSQL (pool size {})", max_connections);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_postgres_urls() {
        assert!(validate_url("postgres://localhost/meetup").is_ok());
        assert!(validate_url("postgresql://user@db/meetup").is_ok());
        assert!(validate_url("sqlite://meetup.db").is_err());
    }
}
