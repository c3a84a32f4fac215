//! Inline-button payloads.
//!
//! Every button the bot renders carries one of these, encoded as
//! `:`-separated segments. Parsing is strict: ids must be integers and any
//! unknown shape is an error instead of a best-effort guess.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised callback data {0:?}")]
pub struct CallbackParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechFieldKind {
    Start,
    End,
    Topic,
    Speaker,
}

impl SpeechFieldKind {
    pub const ALL: [SpeechFieldKind; 4] = [Self::Start, Self::End, Self::Topic, Self::Speaker];

    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Topic => "topic",
            Self::Speaker => "speaker",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    // Guest side
    GuestMenu,
    About,
    Register,
    RegisterPublic(bool),
    RegisterSave,
    Schedule,
    NextEvents,
    AskQuestion,
    MyQuestions,
    FindContacts,
    Donate,
    Cancel,

    // Admin side
    AdminRoot,
    NewEvent,
    Event(i64),
    EditEvent(i64),
    SaveEvent,
    ActivateEvent(i64),
    DeleteEvent(i64),
    ConfirmDeleteEvent(i64),
    ShowSchedule(i64),
    ControlSchedule(i64),
    NewSpeech(i64),
    Speech(i64),
    ActivateSpeech(i64),
    EditSpeech(SpeechFieldKind, i64),
    DeleteSpeech(i64),
    NotifySpeakers(i64),
    NotifyGuests(i64),
    Broadcast,
    DonationReport(i64),
}

impl CallbackData {
    /// Buttons only admins may press.
    pub fn is_admin_only(&self) -> bool {
        !matches!(
            self,
            Self::GuestMenu
                | Self::About
                | Self::Register
                | Self::RegisterPublic(_)
                | Self::RegisterSave
                | Self::Schedule
                | Self::NextEvents
                | Self::AskQuestion
                | Self::MyQuestions
                | Self::FindContacts
                | Self::Donate
                | Self::Cancel
        )
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuestMenu => write!(f, "guest"),
            Self::About => write!(f, "about"),
            Self::Register => write!(f, "reg"),
            Self::RegisterPublic(open) => write!(f, "reg:public:{}", u8::from(*open)),
            Self::RegisterSave => write!(f, "reg:save"),
            Self::Schedule => write!(f, "schedule"),
            Self::NextEvents => write!(f, "events:next"),
            Self::AskQuestion => write!(f, "question"),
            Self::MyQuestions => write!(f, "question:mine"),
            Self::FindContacts => write!(f, "contacts"),
            Self::Donate => write!(f, "donate"),
            Self::Cancel => write!(f, "cancel"),
            Self::AdminRoot => write!(f, "admin"),
            Self::NewEvent => write!(f, "event:new"),
            Self::Event(id) => write!(f, "event:{}", id),
            Self::EditEvent(id) => write!(f, "event:edit:{}", id),
            Self::SaveEvent => write!(f, "event:save"),
            Self::ActivateEvent(id) => write!(f, "event:activate:{}", id),
            Self::DeleteEvent(id) => write!(f, "event:delete:{}", id),
            Self::ConfirmDeleteEvent(id) => write!(f, "event:delete:{}:yes", id),
            Self::ShowSchedule(id) => write!(f, "schedule:show:{}", id),
            Self::ControlSchedule(id) => write!(f, "schedule:control:{}", id),
            Self::NewSpeech(event_id) => write!(f, "schedule:new:{}", event_id),
            Self::Speech(id) => write!(f, "speech:{}", id),
            Self::ActivateSpeech(id) => write!(f, "speech:activate:{}", id),
            Self::EditSpeech(kind, id) => write!(f, "speech:{}:{}", kind.as_str(), id),
            Self::DeleteSpeech(id) => write!(f, "speech:delete:{}", id),
            Self::NotifySpeakers(id) => write!(f, "notify:speakers:{}", id),
            Self::NotifyGuests(id) => write!(f, "notify:guests:{}", id),
            Self::Broadcast => write!(f, "broadcast"),
            Self::DonationReport(id) => write!(f, "donations:{}", id),
        }
    }
}

impl FromStr for CallbackData {
    type Err = CallbackParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CallbackParseError(s.to_string());
        let id = |raw: &str| raw.parse::<i64>().ok().filter(|id| *id > 0).ok_or_else(err);
        let parts: Vec<&str> = s.split(':').collect();

        let data = match parts.as_slice() {
            ["guest"] => Self::GuestMenu,
            ["about"] => Self::About,
            ["reg"] => Self::Register,
            ["reg", "public", "1"] => Self::RegisterPublic(true),
            ["reg", "public", "0"] => Self::RegisterPublic(false),
            ["reg", "save"] => Self::RegisterSave,
            ["schedule"] => Self::Schedule,
            ["events", "next"] => Self::NextEvents,
            ["question"] => Self::AskQuestion,
            ["question", "mine"] => Self::MyQuestions,
            ["contacts"] => Self::FindContacts,
            ["donate"] => Self::Donate,
            ["cancel"] => Self::Cancel,
            ["admin"] => Self::AdminRoot,
            ["event", "new"] => Self::NewEvent,
            ["event", "save"] => Self::SaveEvent,
            ["event", "edit", raw] => Self::EditEvent(id(raw)?),
            ["event", "activate", raw] => Self::ActivateEvent(id(raw)?),
            ["event", "delete", raw] => Self::DeleteEvent(id(raw)?),
            ["event", "delete", raw, "yes"] => Self::ConfirmDeleteEvent(id(raw)?),
            ["event", raw] => Self::Event(id(raw)?),
            ["schedule", "show", raw] => Self::ShowSchedule(id(raw)?),
            ["schedule", "control", raw] => Self::ControlSchedule(id(raw)?),
            ["schedule", "new", raw] => Self::NewSpeech(id(raw)?),
            ["speech", "activate", raw] => Self::ActivateSpeech(id(raw)?),
            ["speech", "delete", raw] => Self::DeleteSpeech(id(raw)?),
            ["speech", kind, raw] => {
                let kind = SpeechFieldKind::parse(kind).ok_or_else(err)?;
                Self::EditSpeech(kind, id(raw)?)
            }
            ["speech", raw] => Self::Speech(id(raw)?),
            ["notify", "speakers", raw] => Self::NotifySpeakers(id(raw)?),
            ["notify", "guests", raw] => Self::NotifyGuests(id(raw)?),
            ["broadcast"] => Self::Broadcast,
            ["donations", raw] => Self::DonationReport(id(raw)?),
            _ => return Err(err()),
        };
        Ok(data)
    }
}
