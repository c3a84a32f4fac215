use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub topic: String,
    pub date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Label used on admin event lists, e.g. `✅ 14-06-2024 "Chat-bots"`.
    pub fn list_label(&self) -> String {
        let label = format!("{} \"{}\"", self.date.format("%d-%m-%Y"), self.topic);
        if self.active {
            format!("✅ {}", label)
        } else {
            label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(active: bool) -> Event {
        Event {
            id: 1,
            topic: "Chat-bots".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn list_label_marks_active_event() {
        assert_eq!(event(true).list_label(), "✅ 14-06-2024 \"Chat-bots\"");
        assert_eq!(event(false).list_label(), "14-06-2024 \"Chat-bots\"");
    }
}
