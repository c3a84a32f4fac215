use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("ADMIN_IDS contains an invalid Telegram ID: {0:?}")]
    InvalidAdminId(String),
    #[error("{name} has an invalid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    /// Provider token for Telegram Payments; donations are off without it.
    pub payments_token: Option<String>,
    pub payments_currency: String,
    pub admin_ids: Vec<i64>,
    pub meetup_name: String,
    pub about_path: String,
    pub db_max_connections: u32,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_URL",
                value: database_url,
            });
        }

        let admin_ids = match get("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => Vec::new(),
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "DB_MAX_CONNECTIONS",
                    value: raw,
                })?,
            None => 10,
        };

        let payments_currency = get("PAYMENTS_CURRENCY").unwrap_or_else(|| "RUB".to_string());
        if payments_currency.len() != 3 || !payments_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue {
                name: "PAYMENTS_CURRENCY",
                value: payments_currency,
            });
        }

        Ok(Self {
            bot_token,
            database_url,
            payments_token: get("PAYMENTS_TOKEN"),
            payments_currency: payments_currency.to_uppercase(),
            admin_ids,
            meetup_name: get("MEETUP_NAME").unwrap_or_else(|| "Python Meetup".to_string()),
            about_path: get("ABOUT_PATH").unwrap_or_else(|| "about.txt".to_string()),
            db_max_connections,
        })
    }

    pub fn is_admin(&self, tg_id: i64) -> bool {
        self.admin_ids.contains(&tg_id)
    }
}

impl fmt::Debug for BotConfig {
    // Tokens and the database password never reach the logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("payments_token", &self.payments_token.as_ref().map(|_| "<redacted>"))
            .field("payments_currency", &self.payments_currency)
            .field("admin_ids", &self.admin_ids)
            .field("meetup_name", &self.meetup_name)
            .field("about_path", &self.about_path)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ConfigError::InvalidAdminId(s.to_string()))
        })
        .collect()
}
