use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub schedule_id: Option<i64>,
    pub guest_id: Option<i64>,
    pub asked_by_tg_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A question as shown to the speaker it was addressed to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SpeakerQuestion {
    pub id: i64,
    pub question: String,
    pub speech_topic: String,
    pub asker_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
