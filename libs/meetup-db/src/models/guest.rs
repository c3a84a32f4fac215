use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: i64,
    pub tg_id: i64,
    pub name: String,
    pub phone: String,
    pub kind_activity: String,
    pub projects: String,
    pub open_for_contact: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields collected by the registration dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestProfile {
    pub tg_id: i64,
    pub name: String,
    pub phone: String,
    pub kind_activity: String,
    pub projects: String,
    pub open_for_contact: bool,
}
