//! Validation of free-text answers typed into dialogs.
//!
//! Every parser returns an `InputError` instead of guessing, so the dialog can
//! re-prompt and keep its state.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use thiserror::Error;

pub const MAX_TEXT_LEN: usize = 200;
pub const MAX_LONG_TEXT_LEN: usize = 2000;
pub const MAX_DONATION: i64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("could not understand the date {0:?}")]
    Date(String),
    #[error("could not understand the time {0:?}, expected HH:MM")]
    Time(String),
    #[error("{0:?} is not a phone number")]
    Phone(String),
    #[error("{0:?} is not a whole amount between 1 and 1000000")]
    Amount(String),
    #[error("{0:?} is not a Telegram ID")]
    TelegramId(String),
    #[error("the text is empty")]
    Empty,
    #[error("the text is longer than {0} characters")]
    TooLong(usize),
}

/// Parses an event date typed by an admin, preferring dates in the future.
///
/// Accepts `DD.MM.YYYY`, `DD.MM.YY`, `DD/MM/YYYY`, `DD-MM-YYYY`, `YYYY-MM-DD`
/// and relative forms in English or Russian ("tomorrow", "через неделю",
/// "в пятницу").
pub fn parse_event_date(text: &str, today: NaiveDate) -> Result<NaiveDate, InputError> {
    let normalized = text.trim().to_lowercase();
    let err = || InputError::Date(text.trim().to_string());
    if normalized.is_empty() {
        return Err(err());
    }

    if let Some(date) = parse_relative(&normalized, today) {
        return Ok(date);
    }

    let parts: Vec<&str> = normalized.split(['.', '/', '-']).collect();
    let [first, month, last] = parts.as_slice() else {
        return Err(err());
    };
    // ISO order only when it starts with a four-digit year.
    let (day, year) = if first.len() == 4 { (last, first) } else { (first, last) };
    let day: u32 = day.parse().map_err(|_| err())?;
    let month: u32 = month.parse().map_err(|_| err())?;
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().map_err(|_| err())?,
        4 => year.parse().map_err(|_| err())?,
        _ => return Err(err()),
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

fn parse_relative(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" | "сегодня" => return Some(today),
        "tomorrow" | "завтра" => return today.checked_add_days(Days::new(1)),
        "day after tomorrow" | "послезавтра" => return today.checked_add_days(Days::new(2)),
        "in a week" | "next week" | "через неделю" => return today.checked_add_days(Days::new(7)),
        _ => {}
    }

    let word = text
        .strip_prefix("next ")
        .or_else(|| text.strip_prefix("on "))
        .or_else(|| text.strip_prefix("во "))
        .or_else(|| text.strip_prefix("в "))
        .unwrap_or(text);
    let weekday = weekday_from_word(word)?;

    // Strictly after today: "friday" said on a Friday means next week.
    let current = today.weekday().num_days_from_monday();
    let wanted = weekday.num_days_from_monday();
    let ahead = (wanted + 7 - current) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today.checked_add_days(Days::new(u64::from(ahead)))
}

fn weekday_from_word(word: &str) -> Option<Weekday> {
    let day = match word {
        "monday" | "понедельник" => Weekday::Mon,
        "tuesday" | "вторник" => Weekday::Tue,
        "wednesday" | "среда" | "среду" => Weekday::Wed,
        "thursday" | "четверг" => Weekday::Thu,
        "friday" | "пятница" | "пятницу" => Weekday::Fri,
        "saturday" | "суббота" | "субботу" => Weekday::Sat,
        "sunday" | "воскресенье" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// `HH:MM`, `H:MM` or `HH.MM`.
pub fn parse_time(text: &str) -> Result<NaiveTime, InputError> {
    let trimmed = text.trim();
    let err = || InputError::Time(trimmed.to_string());
    let (hours, minutes) = trimmed
        .split_once(':')
        .or_else(|| trimmed.split_once('.'))
        .ok_or_else(err)?;
    if minutes.len() != 2 {
        return Err(err());
    }
    let hours: u32 = hours.parse().map_err(|_| err())?;
    let minutes: u32 = minutes.parse().map_err(|_| err())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(err)
}

/// Strips separators and keeps an optional leading `+`.
pub fn parse_phone(text: &str) -> Result<String, InputError> {
    let trimmed = text.trim();
    let err = || InputError::Phone(trimmed.to_string());
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(err()),
        }
    }
    if !(5..=15).contains(&digits.len()) {
        return Err(err());
    }
    Ok(format!("{}{}", plus, digits))
}

pub fn parse_amount(text: &str) -> Result<i64, InputError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|amount| (1..=MAX_DONATION).contains(amount))
        .ok_or_else(|| InputError::Amount(trimmed.to_string()))
}

pub fn parse_tg_id(text: &str) -> Result<i64, InputError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| InputError::TelegramId(trimmed.to_string()))
}

/// Trims and bounds free text by character count.
pub fn clean_text(text: &str, max_len: usize) -> Result<String, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    if trimmed.chars().count() > max_len {
        return Err(InputError::TooLong(max_len));
    }
    Ok(trimmed.to_string())
}
