use std::sync::Arc;

use meetup_db::repositories::Repositories;

use crate::config::BotConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub repos: Repositories,
    /// Contents of the "about us" file, read once at start-up.
    pub about: Arc<str>,
}

impl AppState {
    pub fn is_admin(&self, tg_id: i64) -> bool {
        self.config.is_admin(tg_id)
    }

    pub fn donations_enabled(&self) -> bool {
        self.config.payments_token.is_some()
    }
}
