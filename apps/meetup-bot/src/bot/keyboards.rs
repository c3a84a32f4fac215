use meetup_db::models::event::Event;
use meetup_db::models::schedule::Speech;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::bot::callback_data::{CallbackData, SpeechFieldKind};

fn button(label: impl Into<String>, data: CallbackData) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, data.to_string())
}

fn speech_label(speech: &Speech) -> String {
    let topic = if speech.topic.is_empty() { "…" } else { speech.topic.as_str() };
    format!("{} {}", speech.time_range(), topic)
}

pub fn start_keyboard(registered: bool, is_admin: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![button("📋 Guest menu", CallbackData::GuestMenu)]];
    if !registered {
        rows.push(vec![button("📝 Register", CallbackData::Register)]);
    }
    if is_admin {
        rows.push(vec![button("🛠 Admin", CallbackData::AdminRoot)]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn guest_menu(registered: bool, donations_enabled: bool) -> InlineKeyboardMarkup {
    let register_label = if registered { "✏️ Update profile" } else { "📝 Register" };
    let mut rows = vec![
        vec![
            button("ℹ️ About us", CallbackData::About),
            button(register_label, CallbackData::Register),
        ],
        vec![
            button("🗓 Schedule", CallbackData::Schedule),
            button("📅 Upcoming events", CallbackData::NextEvents),
        ],
        vec![
            button("❓ Ask the speaker", CallbackData::AskQuestion),
            button("📥 Questions for me", CallbackData::MyQuestions),
        ],
        vec![button("🤝 Find contacts", CallbackData::FindContacts)],
    ];
    if donations_enabled {
        rows.push(vec![button("💸 Donate", CallbackData::Donate)]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn back_to_guest_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("⬅️ Back", CallbackData::GuestMenu)]])
}

pub fn cancel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("✖️ Cancel", CallbackData::Cancel)]])
}

pub fn registration_public() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("✅ Yes", CallbackData::RegisterPublic(true)),
            button("🙈 No", CallbackData::RegisterPublic(false)),
        ],
        vec![button("✖️ Cancel", CallbackData::Cancel)],
    ])
}

pub fn registration_confirm() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("💾 Save", CallbackData::RegisterSave),
        button("✖️ Cancel", CallbackData::Cancel),
    ]])
}

pub fn event_confirm() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("💾 Save", CallbackData::SaveEvent),
        button("✖️ Cancel", CallbackData::Cancel),
    ]])
}

pub fn admin_events(events: &[Event]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![button(e.list_label(), CallbackData::Event(e.id))])
        .collect();
    rows.push(vec![button("➕ New event", CallbackData::NewEvent)]);
    rows.push(vec![button("📢 Broadcast", CallbackData::Broadcast)]);
    rows.push(vec![button("⬅️ Guest menu", CallbackData::GuestMenu)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn event_menu(event: &Event) -> InlineKeyboardMarkup {
    let id = event.id;
    let mut rows = Vec::new();
    if !event.active {
        rows.push(vec![button("✅ Make active", CallbackData::ActivateEvent(id))]);
    }
    rows.extend([
        vec![
            button("✏️ Edit", CallbackData::EditEvent(id)),
            button("🗓 Schedule", CallbackData::ShowSchedule(id)),
        ],
        vec![button("🎤 Speech control", CallbackData::ControlSchedule(id))],
        vec![
            button("📣 Notify speakers", CallbackData::NotifySpeakers(id)),
            button("📣 Notify guests", CallbackData::NotifyGuests(id)),
        ],
        vec![button("💰 Donations", CallbackData::DonationReport(id))],
        vec![button("🗑 Delete", CallbackData::DeleteEvent(id))],
        vec![button("⬅️ Back", CallbackData::AdminRoot)],
    ]);
    InlineKeyboardMarkup::new(rows)
}

pub fn confirm_delete_event(event_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("🗑 Yes, delete", CallbackData::ConfirmDeleteEvent(event_id)),
        button("⬅️ No", CallbackData::Event(event_id)),
    ]])
}

pub fn schedule_editor(event_id: i64, speeches: &[Speech]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = speeches
        .iter()
        .map(|s| vec![button(speech_label(s), CallbackData::Speech(s.id))])
        .collect();
    rows.push(vec![button("➕ Add speech", CallbackData::NewSpeech(event_id))]);
    rows.push(vec![button("⬅️ Back", CallbackData::Event(event_id))]);
    InlineKeyboardMarkup::new(rows)
}

pub fn speech_menu(speech: &Speech) -> InlineKeyboardMarkup {
    let id = speech.id;
    InlineKeyboardMarkup::new(vec![
        vec![
            button("🕙 Start", CallbackData::EditSpeech(SpeechFieldKind::Start, id)),
            button("🕚 End", CallbackData::EditSpeech(SpeechFieldKind::End, id)),
        ],
        vec![
            button("🎤 Speaker", CallbackData::EditSpeech(SpeechFieldKind::Speaker, id)),
            button("📝 Topic", CallbackData::EditSpeech(SpeechFieldKind::Topic, id)),
        ],
        vec![button("🗑 Delete", CallbackData::DeleteSpeech(id))],
        vec![button("⬅️ Back", CallbackData::ShowSchedule(speech.event_id))],
    ])
}

pub fn speech_control(event_id: i64, speeches: &[Speech]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = speeches
        .iter()
        .map(|s| {
            let label = if s.active {
                format!("🔴 {}", speech_label(s))
            } else {
                speech_label(s)
            };
            vec![button(label, CallbackData::ActivateSpeech(s.id))]
        })
        .collect();
    rows.push(vec![button("⬅️ Back", CallbackData::Event(event_id))]);
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use teloxide::types::InlineKeyboardButtonKind;

    fn callbacks(markup: &InlineKeyboardMarkup) -> Vec<CallbackData> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.parse().ok(),
                _ => None,
            })
            .collect()
    }

    fn event(active: bool) -> Event {
        Event {
            id: 9,
            topic: "Bots".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            active,
            created_at: Utc::now(),
        }
    }

    fn speech(id: i64, active: bool) -> Speech {
        Speech {
            id,
            event_id: 9,
            topic: String::new(),
            start_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_at: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            speaker_id: None,
            speaker_name: None,
            speaker_tg_id: None,
            active,
        }
    }

    #[test]
    fn every_button_carries_parseable_data() {
        let markups = [
            start_keyboard(false, true),
            guest_menu(true, true),
            admin_events(&[event(true), event(false)]),
            event_menu(&event(false)),
            schedule_editor(9, &[speech(1, false)]),
            speech_menu(&speech(1, false)),
            speech_control(9, &[speech(1, true)]),
            registration_public(),
        ];
        for markup in &markups {
            let total: usize = markup.inline_keyboard.iter().map(Vec::len).sum();
            assert_eq!(callbacks(markup).len(), total);
        }
    }

    #[test]
    fn start_keyboard_hides_what_does_not_apply() {
        let guest = callbacks(&start_keyboard(true, false));
        assert_eq!(guest, vec![CallbackData::GuestMenu]);
        let admin = callbacks(&start_keyboard(false, true));
        assert!(admin.contains(&CallbackData::Register));
        assert!(admin.contains(&CallbackData::AdminRoot));
    }

    #[test]
    fn donate_button_needs_payments() {
        assert!(!callbacks(&guest_menu(true, false)).contains(&CallbackData::Donate));
        assert!(callbacks(&guest_menu(true, true)).contains(&CallbackData::Donate));
    }

    #[test]
    fn active_event_has_no_activate_button() {
        assert!(!callbacks(&event_menu(&event(true))).contains(&CallbackData::ActivateEvent(9)));
        assert!(callbacks(&event_menu(&event(false))).contains(&CallbackData::ActivateEvent(9)));
    }

    #[test]
    fn speech_control_marks_active_speech() {
        let markup = speech_control(9, &[speech(1, true), speech(2, false)]);
        assert!(markup.inline_keyboard[0][0].text.starts_with("🔴"));
        assert!(!markup.inline_keyboard[1][0].text.starts_with("🔴"));
        assert_eq!(
            callbacks(&markup),
            vec![
                CallbackData::ActivateSpeech(1),
                CallbackData::ActivateSpeech(2),
                CallbackData::Event(9)
            ]
        );
    }
}
