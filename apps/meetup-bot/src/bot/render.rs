//! Message bodies. Everything here returns HTML with user text escaped.

use meetup_db::models::donation::DonationReport;
use meetup_db::models::event::Event;
use meetup_db::models::guest::{Guest, GuestProfile};
use meetup_db::models::question::SpeakerQuestion;
use meetup_db::models::schedule::Speech;

use crate::bot::utils::escape_html;

/// Telegram rejects longer messages.
pub const MAX_MESSAGE_CHARS: usize = 4096;
/// Long free text (projects, questions) is cut to this in lists.
const EXCERPT_CHARS: usize = 300;
/// Room kept free for the "and N more" note.
const MORE_NOTE_CHARS: usize = 32;

/// Cuts `text` to at most `max` characters, ending the cut with an ellipsis.
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Appends rendered entries after `header` while the message still fits,
/// then tells how many were left out.
fn fit_entries(header: String, entries: Vec<String>, separator: &str) -> String {
    let total = entries.len();
    let mut text = header;
    let mut used = text.chars().count();
    for (shown, entry) in entries.into_iter().enumerate() {
        let cost = separator.chars().count() + entry.chars().count();
        if used + cost + MORE_NOTE_CHARS > MAX_MESSAGE_CHARS {
            text.push_str(&format!("\n\n…and {} more.", total - shown));
            return text;
        }
        text.push_str(separator);
        text.push_str(&entry);
        used += cost;
    }
    text
}

/// Escaped topic, or a placeholder for template slots without one.
pub fn speech_topic(speech: &Speech) -> String {
    if speech.topic.is_empty() {
        "<i>to be announced</i>".to_string()
    } else {
        escape_html(&speech.topic)
    }
}

fn event_line(event: &Event) -> String {
    format!(
        "<b>{}</b>, {}",
        escape_html(&event.topic),
        event.date.format("%d.%m.%Y")
    )
}

fn speech_line(speech: &Speech) -> String {
    let mut line = format!("{} {}", speech.time_range(), speech_topic(speech));
    if let Some(name) = &speech.speaker_name {
        line.push_str(&format!(" ({})", escape_html(name)));
    }
    if speech.active {
        line = format!("🔴 <b>{}</b>", line);
    }
    line
}

pub fn greeting(meetup_name: &str, first_name: &str, active: Option<&Event>) -> String {
    let mut text = format!(
        "👋 Hi, {}! Welcome to <b>{}</b>.",
        escape_html(first_name),
        escape_html(meetup_name)
    );
    match active {
        Some(event) => text.push_str(&format!("\n\nToday: {}", event_line(event))),
        None => text.push_str("\n\nThere is no event running right now."),
    }
    text
}

pub fn schedule(event: &Event, speeches: &[Speech]) -> String {
    let header = format!("🗓 {}\n", event_line(event));
    if speeches.is_empty() {
        return format!("{}\nThe schedule is empty.", header);
    }
    fit_entries(header, speeches.iter().map(speech_line).collect(), "\n")
}

pub fn event_card(event: &Event, speeches: &[Speech]) -> String {
    let status = if event.active { "active" } else { "inactive" };
    let speakers = speeches.iter().filter(|s| s.speaker_id.is_some()).count();
    format!(
        "{}\nStatus: {}\nSpeeches: {}, with speakers: {}",
        event_line(event),
        status,
        speeches.len(),
        speakers
    )
}

pub fn speech_card(speech: &Speech) -> String {
    let speaker = match (&speech.speaker_name, speech.speaker_tg_id) {
        (Some(name), Some(tg_id)) => format!("{} (<code>{}</code>)", escape_html(name), tg_id),
        _ => "not assigned".to_string(),
    };
    format!(
        "🎤 <b>{}</b>\nTime: {}\nSpeaker: {}",
        speech_topic(speech),
        speech.time_range(),
        speaker
    )
}

pub fn upcoming(events: &[Event]) -> String {
    if events.is_empty() {
        return "No upcoming events yet. Stay tuned!".to_string();
    }
    let lines: Vec<String> = events.iter().map(|e| format!("• {}", event_line(e))).collect();
    format!("📅 Upcoming events:\n\n{}", lines.join("\n"))
}

pub fn profile_summary(profile: &GuestProfile) -> String {
    let public = if profile.open_for_contact { "yes" } else { "no" };
    format!(
        "Please check your profile:\n\nName: {}\nPhone: {}\nActivity: {}\nProjects: {}\nVisible to other guests: {}",
        escape_html(&profile.name),
        escape_html(&profile.phone),
        escape_html(&profile.kind_activity),
        escape_html(&profile.projects),
        public
    )
}

pub fn contacts(guests: &[Guest]) -> String {
    if guests.is_empty() {
        return "Nobody has shared their contacts yet.".to_string();
    }
    let cards: Vec<String> = guests
        .iter()
        .map(|g| {
            format!(
                "<b>{}</b>, {}\n{}\n<a href=\"tg://user?id={}\">Write</a>",
                escape_html(&g.name),
                escape_html(&g.kind_activity),
                escape_html(&excerpt(&g.projects, EXCERPT_CHARS)),
                g.tg_id
            )
        })
        .collect();
    fit_entries("🤝 Guests open for contact:".to_string(), cards, "\n\n")
}

pub fn speaker_questions(questions: &[SpeakerQuestion]) -> String {
    if questions.is_empty() {
        return "No questions for you yet.".to_string();
    }
    let lines: Vec<String> = questions
        .iter()
        .map(|q| {
            let asker = q.asker_name.as_deref().unwrap_or("Guest");
            format!(
                "<b>{}</b> on \"{}\":\n{}",
                escape_html(asker),
                escape_html(&q.speech_topic),
                escape_html(&excerpt(&q.question, EXCERPT_CHARS))
            )
        })
        .collect();
    fit_entries("📥 Your questions:".to_string(), lines, "\n\n")
}

pub fn forwarded_question(asker: &str, speech: &Speech, question: &str) -> String {
    format!(
        "❓ New question from <b>{}</b> on \"{}\":\n\n{}",
        escape_html(asker),
        speech_topic(speech),
        escape_html(question)
    )
}

pub fn speaker_notice(event: &Event, speeches: &[&Speech]) -> String {
    let slots: Vec<String> = speeches
        .iter()
        .map(|s| format!("{} \"{}\"", s.time_range(), speech_topic(s)))
        .collect();
    format!("🎤 Reminder: you speak at {}\n\n{}", event_line(event), slots.join("\n"))
}

pub fn guests_notice(event: &Event) -> String {
    format!(
        "📣 The schedule of {} has changed. Open the guest menu to see it.",
        event_line(event)
    )
}

pub fn donation_report(event: &Event, report: &DonationReport, currency: &str) -> String {
    format!(
        "💰 Donations for {}\n\nPayments: {}\nTotal: {} {}",
        event_line(event),
        report.count,
        report.total,
        escape_html(currency)
    )
}

pub fn broadcast_result(sent: usize, failed: usize) -> String {
    format!("📨 Delivered: {}, failed: {}", sent, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn event() -> Event {
        Event {
            id: 1,
            topic: "Bots & <AI>".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            active: true,
            created_at: Utc::now(),
        }
    }

    fn speech(topic: &str, speaker: Option<&str>, active: bool) -> Speech {
        Speech {
            id: 2,
            event_id: 1,
            topic: topic.into(),
            start_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_at: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            speaker_id: speaker.map(|_| 3),
            speaker_name: speaker.map(String::from),
            speaker_tg_id: speaker.map(|_| 42),
            active,
        }
    }

    #[test]
    fn user_text_is_escaped() {
        let text = greeting("Meetup", "<script>", Some(&event()));
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("Bots &amp; &lt;AI&gt;"));
        assert!(text.contains("14.06.2024"));
    }

    #[test]
    fn schedule_marks_active_speech_and_speakers() {
        let text = schedule(
            &event(),
            &[speech("Intro", Some("Ann"), true), speech("", None, false)],
        );
        assert!(text.contains("🔴 <b>10:00-11:00 Intro (Ann)</b>"));
        assert!(text.contains("10:00-11:00 <i>to be announced</i>"));
    }

    #[test]
    fn empty_lists_have_friendly_text() {
        assert!(upcoming(&[]).contains("No upcoming"));
        assert!(contacts(&[]).contains("Nobody"));
        assert!(speaker_questions(&[]).contains("No questions"));
        assert!(schedule(&event(), &[]).contains("empty"));
    }

    #[test]
    fn speech_card_shows_speaker_id() {
        let card = speech_card(&speech("Rust", Some("Bob"), false));
        assert!(card.contains("Bob (<code>42</code>)"));
        assert!(speech_card(&speech("Rust", None, false)).contains("not assigned"));
    }

    #[test]
    fn speaker_notice_lists_every_slot() {
        let first = speech("Intro", Some("Ann"), false);
        let second = Speech {
            start_at: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_at: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            topic: "Outro".into(),
            ..first.clone()
        };
        let text = speaker_notice(&event(), &[&first, &second]);
        assert!(text.contains("10:00-11:00 \"Intro\""));
        assert!(text.contains("15:00-16:00 \"Outro\""));
    }

    #[test]
    fn empty_topic_is_announced_later() {
        let slot = speech("", None, false);
        assert!(speech_card(&slot).contains("<i>to be announced</i>"));
        assert!(!speech_card(&slot).contains("<b></b>"));
        assert!(forwarded_question("Ann", &slot, "Why?").contains("to be announced"));
    }

    fn guest(tg_id: i64, projects: &str) -> Guest {
        Guest {
            id: tg_id,
            tg_id,
            name: "x".repeat(200),
            phone: "+7999".into(),
            kind_activity: "y".repeat(200),
            projects: projects.into(),
            open_for_contact: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn contacts_with_long_projects_fit_one_message() {
        let guests: Vec<Guest> = (1..=10).map(|id| guest(id, &"p".repeat(2000))).collect();
        let text = contacts(&guests);
        assert!(text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(text.contains("tg://user?id=1\""));
        assert!(text.contains('…'));
    }

    #[test]
    fn contacts_report_the_guests_left_out() {
        let guests: Vec<Guest> = (1..=20).map(|id| guest(id, &"&".repeat(2000))).collect();
        let text = contacts(&guests);
        assert!(text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(text.contains("more."));
    }

    #[test]
    fn long_questions_fit_one_message() {
        let questions: Vec<SpeakerQuestion> = (1..=20)
            .map(|id| SpeakerQuestion {
                id,
                question: "q".repeat(2000),
                speech_topic: "Rust".into(),
                asker_name: Some("Ann".into()),
                created_at: Utc::now(),
            })
            .collect();
        let text = speaker_questions(&questions);
        assert!(text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(text.starts_with("📥 Your questions:\n\n<b>Ann</b>"));
    }

    #[test]
    fn excerpt_counts_characters() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("привет мир", 7), "привет…");
        assert_eq!(excerpt("привет мир", 7).chars().count(), 7);
    }

    #[test]
    fn donation_report_sums() {
        let report = DonationReport { count: 3, total: 1500 };
        let text = donation_report(&event(), &report, "RUB");
        assert!(text.contains("Payments: 3"));
        assert!(text.contains("Total: 1500 RUB"));
    }
}
