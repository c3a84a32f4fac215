use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A schedule row (one talk slot of an event) joined with its speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Speech {
    pub id: i64,
    pub event_id: i64,
    pub topic: String,
    pub start_at: NaiveTime,
    pub end_at: NaiveTime,
    pub speaker_id: Option<i64>,
    pub speaker_name: Option<String>,
    pub speaker_tg_id: Option<i64>,
    pub active: bool,
}

impl Speech {
    /// `10:00-11:00`
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_at.format("%H:%M"),
            self.end_at.format("%H:%M")
        )
    }
}

/// Single-field edit applied by the speech editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechField {
    Start(NaiveTime),
    End(NaiveTime),
    Topic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSlot {
    pub start_hour: u32,
    pub end_hour: u32,
    pub topic: &'static str,
}

/// Slots every new event starts with.
pub const TEMPLATE_SCHEDULE: &[TemplateSlot] = &[
    TemplateSlot { start_hour: 10, end_hour: 11, topic: "" },
    TemplateSlot { start_hour: 11, end_hour: 12, topic: "" },
    TemplateSlot { start_hour: 12, end_hour: 13, topic: "" },
    TemplateSlot { start_hour: 13, end_hour: 14, topic: "Break" },
    TemplateSlot { start_hour: 14, end_hour: 15, topic: "" },
    TemplateSlot { start_hour: 15, end_hour: 16, topic: "" },
    TemplateSlot { start_hour: 16, end_hour: 17, topic: "" },
];

pub const NEW_SPEECH_TOPIC: &str = "New...";

pub fn new_speech_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

impl TemplateSlot {
    pub fn times(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((
            NaiveTime::from_hms_opt(self.start_hour, 0, 0)?,
            NaiveTime::from_hms_opt(self.end_hour, 0, 0)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_slots_are_contiguous_hours() {
        let times: Vec<_> = TEMPLATE_SCHEDULE.iter().filter_map(|s| s.times()).collect();
        assert_eq!(times.len(), 7);
        for pair in times.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        assert_eq!(TEMPLATE_SCHEDULE[3].topic, "Break");
    }

    #[test]
    fn time_range_formats_hours_and_minutes() {
        let speech = Speech {
            id: 1,
            event_id: 1,
            topic: String::new(),
            start_at: NaiveTime::from_hms_opt(10, 5, 0).unwrap(),
            end_at: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            speaker_id: None,
            speaker_name: None,
            speaker_tg_id: None,
            active: false,
        };
        assert_eq!(speech.time_range(), "10:05-11:30");
    }
}
