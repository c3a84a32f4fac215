use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: i64,
    pub amount: i64,
    pub currency: String,
    pub guest_id: Option<i64>,
    pub event_id: Option<i64>,
    pub donor_tg_id: i64,
    pub charge_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDonation<'a> {
    pub amount: i64,
    pub currency: &'a str,
    pub donor_tg_id: i64,
    pub event_id: Option<i64>,
    pub charge_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DonationReport {
    pub count: i64,
    pub total: i64,
}
