use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{info, warn};

use crate::bot::dialogue::{MeetupDialogue, State};
use crate::bot::handlers::{advance, not_found, Screen};
use crate::bot::keyboards;
use crate::bot::render;
use crate::bot::utils::{escape_html, replace_screen};
use crate::services::input::{clean_text, MAX_LONG_TEXT_LEN};
use crate::AppState;

/// Start screen. Opening it while an event runs counts as attending.
pub async fn start(bot: &Bot, screen: Screen, user: &User, state: &AppState) -> Result<()> {
    let tg_id = user.id.0 as i64;
    let active = state.repos.events.get_active().await?;
    if let Some(event) = &active {
        state.repos.events.add_attendee(event.id, tg_id).await?;
    }
    let registered = state.repos.guests.get_by_tg_id(tg_id).await?.is_some();

    let text = render::greeting(&state.config.meetup_name, &user.first_name, active.as_ref());
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        text,
        keyboards::start_keyboard(registered, state.is_admin(tg_id)),
    )
    .await?;
    Ok(())
}

pub async fn menu(bot: &Bot, screen: Screen, tg_id: i64, state: &AppState) -> Result<()> {
    let registered = state.repos.guests.get_by_tg_id(tg_id).await?.is_some();
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("<b>{}</b>\nWhat would you like to do?", escape_html(&state.config.meetup_name)),
        keyboards::guest_menu(registered, state.donations_enabled()),
    )
    .await?;
    Ok(())
}

pub async fn about(bot: &Bot, screen: Screen, state: &AppState) -> Result<()> {
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        escape_html(&state.about),
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}

pub async fn schedule(bot: &Bot, screen: Screen, state: &AppState) -> Result<()> {
    let text = match state.repos.events.get_active().await? {
        Some(event) => {
            let speeches = state.repos.schedules.for_event(event.id).await?;
            render::schedule(&event, &speeches)
        }
        None => "There is no active event right now.".to_string(),
    };
    replace_screen(bot, screen.chat_id, screen.replace, text, keyboards::back_to_guest_menu()).await?;
    Ok(())
}

pub async fn upcoming(bot: &Bot, screen: Screen, state: &AppState) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let events = state.repos.events.upcoming(today).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::upcoming(&events),
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}

pub async fn ask_question(
    bot: &Bot,
    screen: Screen,
    dialogue: &MeetupDialogue,
    state: &AppState,
) -> Result<()> {
    let Some(speech) = state.repos.schedules.get_active().await? else {
        replace_screen(
            bot,
            screen.chat_id,
            screen.replace,
            "Nobody is speaking right now. Try again during a talk.",
            keyboards::back_to_guest_menu(),
        )
        .await?;
        return Ok(());
    };

    let next = State::Question {
        schedule_id: speech.id,
    };
    let text = format!(
        "Now speaking: <b>{}</b>\n\n{}",
        render::speech_topic(&speech),
        next.prompt()
    );
    advance(dialogue, next).await?;
    replace_screen(bot, screen.chat_id, screen.replace, text, keyboards::cancel()).await?;
    Ok(())
}

pub async fn receive_question(
    bot: &Bot,
    msg: &Message,
    dialogue: &MeetupDialogue,
    state: &AppState,
    schedule_id: i64,
    text: &str,
) -> Result<()> {
    let current = State::Question { schedule_id };
    let question = match clean_text(text, MAX_LONG_TEXT_LEN) {
        Ok(q) => q,
        Err(e) => return super::reprompt(bot, msg.chat.id, e, &current).await,
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let tg_id = user.id.0 as i64;

    dialogue.exit().await?;
    let Some(speech) = state.repos.schedules.get(schedule_id).await? else {
        return not_found(bot, Screen::fresh(msg.chat.id), "The speech").await;
    };
    let stored = state.repos.questions.create(speech.id, tg_id, &question).await?;
    info!("Question {} stored for speech {}", stored.id, speech.id);

    if let Some(speaker_tg_id) = speech.speaker_tg_id {
        let asker = match state.repos.guests.get_by_tg_id(tg_id).await? {
            Some(guest) => guest.name,
            None => user.full_name(),
        };
        let forwarded = render::forwarded_question(&asker, &speech, &question);
        if let Err(e) = bot
            .send_message(ChatId(speaker_tg_id), forwarded)
            .parse_mode(teloxide::types::ParseMode::Html)
            .await
        {
            warn!("Failed to forward question {} to speaker {}: {}", stored.id, speaker_tg_id, e);
        }
    }

    replace_screen(
        bot,
        msg.chat.id,
        None,
        "✅ Your question has been sent to the speaker.",
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}

pub async fn my_questions(bot: &Bot, screen: Screen, tg_id: i64, state: &AppState) -> Result<()> {
    let questions = state.repos.questions.for_speaker(tg_id, 20).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::speaker_questions(&questions),
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}

pub async fn contacts(bot: &Bot, screen: Screen, tg_id: i64, state: &AppState) -> Result<()> {
    let guests = state.repos.guests.contacts(tg_id, 10).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::contacts(&guests),
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}

pub async fn donate(
    bot: &Bot,
    screen: Screen,
    dialogue: &MeetupDialogue,
    state: &AppState,
) -> Result<()> {
    if !state.donations_enabled() {
        replace_screen(
            bot,
            screen.chat_id,
            screen.replace,
            "Donations are not available at the moment.",
            keyboards::back_to_guest_menu(),
        )
        .await?;
        return Ok(());
    }

    advance(dialogue, State::DonationAmount).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!(
            "💸 Thank you for supporting us!\n\n{} ({})",
            State::DonationAmount.prompt(),
            escape_html(&state.config.payments_currency)
        ),
        keyboards::cancel(),
    )
    .await?;
    Ok(())
}
