use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use teloxide::prelude::*;
use tracing::info;

use crate::bot::dialogue::{EventTarget, MeetupDialogue, State};
use crate::bot::handlers::{advance, not_found, registration::stale, reprompt, Screen};
use crate::bot::keyboards;
use crate::bot::render;
use crate::bot::utils::{escape_html, replace_screen};
use crate::services::input::{clean_text, parse_event_date, MAX_LONG_TEXT_LEN, MAX_TEXT_LEN};
use crate::services::notify;
use crate::AppState;

pub async fn root(bot: &Bot, screen: Screen, state: &AppState) -> Result<()> {
    let events = state.repos.events.get_all().await?;
    let text = if events.is_empty() {
        "🛠 No events yet. Create the first one."
    } else {
        "🛠 Events (✅ marks the active one):"
    };
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        text,
        keyboards::admin_events(&events),
    )
    .await?;
    Ok(())
}

pub async fn event_menu(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let speeches = state.repos.schedules.for_event(event.id).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::event_card(&event, &speeches),
        keyboards::event_menu(&event),
    )
    .await?;
    Ok(())
}

pub async fn begin_event_dialog(
    bot: &Bot,
    screen: Screen,
    dialogue: &MeetupDialogue,
    state: &AppState,
    target: EventTarget,
) -> Result<()> {
    let mut text = String::new();
    if let EventTarget::Existing(id) = target {
        let Some(event) = state.repos.events.get(id).await? else {
            return not_found(bot, screen, "The event").await;
        };
        text.push_str(&format!(
            "Editing <b>{}</b> ({}).\n\n",
            escape_html(&event.topic),
            event.date.format("%d.%m.%Y")
        ));
    }

    let next = State::EventDate { target };
    text.push_str(next.prompt());
    advance(dialogue, next).await?;
    replace_screen(bot, screen.chat_id, screen.replace, text, keyboards::cancel()).await?;
    Ok(())
}

pub async fn receive_event_date(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    target: EventTarget,
    text: &str,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let date = match parse_event_date(text, today) {
        Ok(date) => date,
        Err(e) => return reprompt(bot, chat_id, e, &State::EventDate { target }).await,
    };

    let next = State::EventTopic { target, date };
    let prompt = format!("Date: {}\n\n{}", date.format("%d.%m.%Y"), next.prompt());
    advance(dialogue, next).await?;
    replace_screen(bot, chat_id, None, prompt, keyboards::cancel()).await?;
    Ok(())
}

pub async fn receive_event_topic(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    target: EventTarget,
    date: NaiveDate,
    text: &str,
) -> Result<()> {
    let topic = match clean_text(text, MAX_TEXT_LEN) {
        Ok(topic) => topic,
        Err(e) => return reprompt(bot, chat_id, e, &State::EventTopic { target, date }).await,
    };

    let mut summary = format!(
        "Topic: <b>{}</b>\nDate: {}\n\n",
        escape_html(&topic),
        date.format("%d.%m.%Y")
    );
    let next = State::EventConfirm { target, date, topic };
    summary.push_str(next.prompt());
    advance(dialogue, next).await?;
    replace_screen(bot, chat_id, None, summary, keyboards::event_confirm()).await?;
    Ok(())
}

pub async fn save_event(
    bot: &Bot,
    screen: Screen,
    dialogue: &MeetupDialogue,
    state: &AppState,
) -> Result<()> {
    let State::EventConfirm { target, date, topic } = dialogue.get_or_default().await? else {
        return stale(bot, screen).await;
    };
    dialogue.exit().await?;

    let saved = match target {
        EventTarget::New => Some(state.repos.events.create_with_template(&topic, date).await?),
        EventTarget::Existing(id) => state.repos.events.update(id, &topic, date).await?,
    };
    let Some(event) = saved else {
        return not_found(bot, screen, "The event").await;
    };
    info!("Event {} saved: {:?} on {}", event.id, event.topic, event.date);
    event_menu(bot, screen, state, event.id).await
}

pub async fn activate_event(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.set_active(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    event_menu(bot, screen, state, event.id).await
}

pub async fn ask_delete_event(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!(
            "Delete <b>{}</b> with its whole schedule?",
            escape_html(&event.topic)
        ),
        keyboards::confirm_delete_event(event.id),
    )
    .await?;
    Ok(())
}

pub async fn delete_event(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    if !state.repos.events.delete(event_id).await? {
        return not_found(bot, screen, "The event").await;
    }
    info!("Event {} deleted", event_id);
    root(bot, screen, state).await
}

pub async fn notify_speakers(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let speeches = state.repos.schedules.for_event(event.id).await?;

    let mut by_speaker: BTreeMap<i64, Vec<_>> = BTreeMap::new();
    for speech in &speeches {
        if let Some(tg_id) = speech.speaker_tg_id {
            by_speaker.entry(tg_id).or_default().push(speech);
        }
    }
    let messages: BTreeMap<i64, String> = by_speaker
        .into_iter()
        .map(|(tg_id, slots)| (tg_id, render::speaker_notice(&event, &slots)))
        .collect();

    let report = notify::send_personal(bot, &messages).await;
    info!("Speakers of event {} notified: {:?}", event.id, report);
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::broadcast_result(report.sent, report.failed),
        keyboards::event_menu(&event),
    )
    .await?;
    Ok(())
}

pub async fn notify_guests(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let attendees = state.repos.events.attendee_ids(event.id).await?;

    let report = notify::broadcast(bot, &attendees, &render::guests_notice(&event)).await;
    info!("Guests of event {} notified: {:?}", event.id, report);
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::broadcast_result(report.sent, report.failed),
        keyboards::event_menu(&event),
    )
    .await?;
    Ok(())
}

pub async fn begin_broadcast(bot: &Bot, screen: Screen, dialogue: &MeetupDialogue) -> Result<()> {
    advance(dialogue, State::Broadcast).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("📢 {}", State::Broadcast.prompt()),
        keyboards::cancel(),
    )
    .await?;
    Ok(())
}

pub async fn receive_broadcast(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    state: &AppState,
    text: &str,
) -> Result<()> {
    let body = match clean_text(text, MAX_LONG_TEXT_LEN) {
        Ok(body) => body,
        Err(e) => return reprompt(bot, chat_id, e, &State::Broadcast).await,
    };
    dialogue.exit().await?;

    let recipients = state.repos.guests.all_tg_ids().await?;
    info!("Broadcasting to {} users", recipients.len());
    let report = notify::broadcast(bot, &recipients, &escape_html(&body)).await;

    let events = state.repos.events.get_all().await?;
    replace_screen(
        bot,
        chat_id,
        None,
        render::broadcast_result(report.sent, report.failed),
        keyboards::admin_events(&events),
    )
    .await?;
    Ok(())
}

pub async fn donation_report(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let report = state.repos.donations.report_for_event(event.id).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::donation_report(&event, &report, &state.config.payments_currency),
        keyboards::event_menu(&event),
    )
    .await?;
    Ok(())
}
