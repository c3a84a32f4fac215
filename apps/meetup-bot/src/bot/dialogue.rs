//! Per-chat conversation state.
//!
//! Each variant carries everything the dialog collected so far, so a chat's
//! progress never leaks into another chat and nothing has to be looked up in
//! shared maps when the next message arrives.

use chrono::NaiveDate;
use meetup_db::models::guest::GuestProfile;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

pub type MeetupDialogue = Dialogue<State, InMemStorage<State>>;

/// Which event the event dialog writes to when it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    New,
    Existing(i64),
}

/// Speech fields edited by typing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechText {
    Start,
    End,
    Topic,
}

/// What the bot is waiting for in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Nothing pending; only commands and menu buttons apply.
    Command,
    Text,
    Button,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Idle,

    EventDate {
        target: EventTarget,
    },
    EventTopic {
        target: EventTarget,
        date: NaiveDate,
    },
    EventConfirm {
        target: EventTarget,
        date: NaiveDate,
        topic: String,
    },

    RegistrationName,
    RegistrationPhone {
        name: String,
    },
    RegistrationActivity {
        name: String,
        phone: String,
    },
    RegistrationProjects {
        name: String,
        phone: String,
        activity: String,
    },
    RegistrationPublic {
        name: String,
        phone: String,
        activity: String,
        projects: String,
    },
    RegistrationConfirm {
        profile: GuestProfile,
    },

    SpeechEdit {
        speech_id: i64,
        field: SpeechText,
    },
    SpeakerId {
        speech_id: i64,
    },
    SpeakerName {
        speech_id: i64,
        speaker_tg_id: i64,
    },

    Question {
        schedule_id: i64,
    },
    DonationAmount,
    Broadcast,
}

impl State {
    pub fn expected_input(&self) -> InputKind {
        match self {
            State::Idle => InputKind::Command,
            State::EventDate { .. }
            | State::EventTopic { .. }
            | State::RegistrationName
            | State::RegistrationPhone { .. }
            | State::RegistrationActivity { .. }
            | State::RegistrationProjects { .. }
            | State::SpeechEdit { .. }
            | State::SpeakerId { .. }
            | State::SpeakerName { .. }
            | State::Question { .. }
            | State::DonationAmount
            | State::Broadcast => InputKind::Text,
            State::EventConfirm { .. }
            | State::RegistrationPublic { .. }
            | State::RegistrationConfirm { .. } => InputKind::Button,
        }
    }

    /// Variant name for logs; the collected answers stay out of them.
    pub fn label(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::EventDate { .. } => "event-date",
            State::EventTopic { .. } => "event-topic",
            State::EventConfirm { .. } => "event-confirm",
            State::RegistrationName => "registration-name",
            State::RegistrationPhone { .. } => "registration-phone",
            State::RegistrationActivity { .. } => "registration-activity",
            State::RegistrationProjects { .. } => "registration-projects",
            State::RegistrationPublic { .. } => "registration-public",
            State::RegistrationConfirm { .. } => "registration-confirm",
            State::SpeechEdit { .. } => "speech-edit",
            State::SpeakerId { .. } => "speaker-id",
            State::SpeakerName { .. } => "speaker-name",
            State::Question { .. } => "question",
            State::DonationAmount => "donation-amount",
            State::Broadcast => "broadcast",
        }
    }

    /// States entered only from admin buttons.
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            State::EventDate { .. }
                | State::EventTopic { .. }
                | State::EventConfirm { .. }
                | State::SpeechEdit { .. }
                | State::SpeakerId { .. }
                | State::SpeakerName { .. }
                | State::Broadcast
        )
    }

    /// Question shown on entering the state and again after a rejected answer.
    pub fn prompt(&self) -> &'static str {
        match self {
            State::Idle => "Use /start to open the menu.",
            State::EventDate { .. } => {
                "Enter the event date, e.g. 14.06.2024, tomorrow or friday."
            }
            State::EventTopic { .. } => "Enter the event topic.",
            State::EventConfirm { .. } => "Save the event?",
            State::RegistrationName => "What is your name?",
            State::RegistrationPhone { .. } => "Your phone number, e.g. +7 999 123-45-67:",
            State::RegistrationActivity { .. } => "What do you do? (backend, data science, student...)",
            State::RegistrationProjects { .. } => "Tell us briefly about your projects.",
            State::RegistrationPublic { .. } => "May other guests see your contacts?",
            State::RegistrationConfirm { .. } => "Save the profile?",
            State::SpeechEdit {
                field: SpeechText::Start | SpeechText::End,
                ..
            } => "Enter the time as HH:MM.",
            State::SpeechEdit {
                field: SpeechText::Topic,
                ..
            } => "Enter the speech topic.",
            State::SpeakerId { .. } => "Enter the speaker's numeric Telegram ID.",
            State::SpeakerName { .. } => "Enter the speaker's name.",
            State::Question { .. } => "Type your question for the speaker.",
            State::DonationAmount => "How much would you like to donate? Enter a whole number.",
            State::Broadcast => "Type the message to send to every guest.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> GuestProfile {
        GuestProfile {
            tg_id: 1,
            name: "Ann".into(),
            phone: "+7999".into(),
            kind_activity: "dev".into(),
            projects: "bot".into(),
            open_for_contact: true,
        }
    }

    fn every_state() -> Vec<State> {
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let target = EventTarget::Existing(3);
        vec![
            State::Idle,
            State::EventDate { target },
            State::EventTopic { target, date },
            State::EventConfirm {
                target: EventTarget::New,
                date,
                topic: "Bots".into(),
            },
            State::RegistrationName,
            State::RegistrationPhone { name: "Ann".into() },
            State::RegistrationActivity {
                name: "Ann".into(),
                phone: "+7999".into(),
            },
            State::RegistrationProjects {
                name: "Ann".into(),
                phone: "+7999".into(),
                activity: "dev".into(),
            },
            State::RegistrationPublic {
                name: "Ann".into(),
                phone: "+7999".into(),
                activity: "dev".into(),
                projects: "bot".into(),
            },
            State::RegistrationConfirm { profile: profile() },
            State::SpeechEdit {
                speech_id: 1,
                field: SpeechText::Start,
            },
            State::SpeechEdit {
                speech_id: 1,
                field: SpeechText::Topic,
            },
            State::SpeakerId { speech_id: 1 },
            State::SpeakerName {
                speech_id: 1,
                speaker_tg_id: 5,
            },
            State::Question { schedule_id: 1 },
            State::DonationAmount,
            State::Broadcast,
        ]
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(State::default(), State::Idle);
        assert_eq!(State::Idle.expected_input(), InputKind::Command);
    }

    #[test]
    fn button_states_are_the_confirmations() {
        let buttons: Vec<_> = every_state()
            .into_iter()
            .filter(|s| s.expected_input() == InputKind::Button)
            .collect();
        assert_eq!(buttons.len(), 3);
        assert!(buttons.iter().all(|s| matches!(
            s,
            State::EventConfirm { .. } | State::RegistrationPublic { .. } | State::RegistrationConfirm { .. }
        )));
    }

    #[test]
    fn every_state_has_a_prompt() {
        for state in every_state() {
            assert!(!state.prompt().is_empty(), "{state:?}");
        }
    }

    #[test]
    fn labels_are_distinct_and_hide_answers() {
        let states = every_state();
        let labels: std::collections::HashSet<_> = states.iter().map(State::label).collect();
        assert_eq!(labels.len(), states.len() - 1); // two SpeechEdit fields share a label
        let confirm = State::RegistrationConfirm { profile: profile() };
        assert!(!confirm.label().contains("+7999"));
    }

    #[test]
    fn admin_states_are_flagged() {
        let admin: Vec<_> = every_state().into_iter().filter(State::is_admin_only).collect();
        assert_eq!(admin.len(), 8);
        assert!(!State::Question { schedule_id: 1 }.is_admin_only());
        assert!(!State::DonationAmount.is_admin_only());
        assert!(!State::RegistrationName.is_admin_only());
    }
}
