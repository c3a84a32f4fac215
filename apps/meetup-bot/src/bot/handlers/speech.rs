use anyhow::Result;
use meetup_db::models::schedule::SpeechField;
use teloxide::prelude::*;
use tracing::info;

use crate::bot::callback_data::SpeechFieldKind;
use crate::bot::dialogue::{MeetupDialogue, SpeechText, State};
use crate::bot::handlers::{advance, not_found, reprompt, Screen};
use crate::bot::keyboards;
use crate::bot::render;
use crate::bot::utils::replace_screen;
use crate::services::input::{clean_text, parse_tg_id, parse_time, MAX_TEXT_LEN};
use crate::AppState;

pub async fn editor(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let speeches = state.repos.schedules.for_event(event.id).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::schedule(&event, &speeches),
        keyboards::schedule_editor(event.id, &speeches),
    )
    .await?;
    Ok(())
}

pub async fn menu(bot: &Bot, screen: Screen, state: &AppState, speech_id: i64) -> Result<()> {
    let Some(speech) = state.repos.schedules.get(speech_id).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        render::speech_card(&speech),
        keyboards::speech_menu(&speech),
    )
    .await?;
    Ok(())
}

pub async fn create(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    if state.repos.events.get(event_id).await?.is_none() {
        return not_found(bot, screen, "The event").await;
    }
    let speech = state.repos.schedules.create(event_id).await?;
    info!("Speech {} added to event {}", speech.id, event_id);
    menu(bot, screen, state, speech.id).await
}

pub async fn begin_edit(
    bot: &Bot,
    screen: Screen,
    dialogue: &MeetupDialogue,
    state: &AppState,
    kind: SpeechFieldKind,
    speech_id: i64,
) -> Result<()> {
    let Some(speech) = state.repos.schedules.get(speech_id).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    let next = match kind {
        SpeechFieldKind::Start => State::SpeechEdit {
            speech_id,
            field: SpeechText::Start,
        },
        SpeechFieldKind::End => State::SpeechEdit {
            speech_id,
            field: SpeechText::End,
        },
        SpeechFieldKind::Topic => State::SpeechEdit {
            speech_id,
            field: SpeechText::Topic,
        },
        SpeechFieldKind::Speaker => State::SpeakerId { speech_id },
    };

    let text = format!("{}\n\n{}", render::speech_card(&speech), next.prompt());
    advance(dialogue, next).await?;
    replace_screen(bot, screen.chat_id, screen.replace, text, keyboards::cancel()).await?;
    Ok(())
}

pub async fn receive_field(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    state: &AppState,
    speech_id: i64,
    field: SpeechText,
    text: &str,
) -> Result<()> {
    let parsed = match field {
        SpeechText::Start => parse_time(text).map(SpeechField::Start),
        SpeechText::End => parse_time(text).map(SpeechField::End),
        SpeechText::Topic => clean_text(text, MAX_TEXT_LEN).map(SpeechField::Topic),
    };
    let update = match parsed {
        Ok(update) => update,
        Err(e) => return reprompt(bot, chat_id, e, &State::SpeechEdit { speech_id, field }).await,
    };

    dialogue.exit().await?;
    let screen = Screen::fresh(chat_id);
    let Some(speech) = state.repos.schedules.update_field(speech_id, &update).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    info!("Speech {} updated: {:?}", speech.id, update);
    menu(bot, screen, state, speech.id).await
}

pub async fn receive_speaker_id(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    speech_id: i64,
    text: &str,
) -> Result<()> {
    let speaker_tg_id = match parse_tg_id(text) {
        Ok(id) => id,
        Err(e) => return reprompt(bot, chat_id, e, &State::SpeakerId { speech_id }).await,
    };

    let next = State::SpeakerName {
        speech_id,
        speaker_tg_id,
    };
    let prompt = next.prompt();
    advance(dialogue, next).await?;
    replace_screen(bot, chat_id, None, prompt, keyboards::cancel()).await?;
    Ok(())
}

pub async fn receive_speaker_name(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    state: &AppState,
    (speech_id, speaker_tg_id): (i64, i64),
    text: &str,
) -> Result<()> {
    let name = match clean_text(text, MAX_TEXT_LEN) {
        Ok(name) => name,
        Err(e) => {
            let current = State::SpeakerName {
                speech_id,
                speaker_tg_id,
            };
            return reprompt(bot, chat_id, e, &current).await;
        }
    };

    dialogue.exit().await?;
    let screen = Screen::fresh(chat_id);
    let speaker = state.repos.guests.upsert_speaker(speaker_tg_id, &name).await?;
    let Some(speech) = state.repos.schedules.set_speaker(speech_id, speaker.id).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    info!("Speaker {} assigned to speech {}", speaker.tg_id, speech.id);
    menu(bot, screen, state, speech.id).await
}

pub async fn delete(bot: &Bot, screen: Screen, state: &AppState, speech_id: i64) -> Result<()> {
    let Some(event_id) = state.repos.schedules.delete(speech_id).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    info!("Speech {} deleted from event {}", speech_id, event_id);
    editor(bot, screen, state, event_id).await
}

/// Live control: pressing a speech makes it the one questions go to.
pub async fn control(bot: &Bot, screen: Screen, state: &AppState, event_id: i64) -> Result<()> {
    let Some(event) = state.repos.events.get(event_id).await? else {
        return not_found(bot, screen, "The event").await;
    };
    let speeches = state.repos.schedules.for_event(event.id).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("{}\n\nPick the speech that is on now.", render::schedule(&event, &speeches)),
        keyboards::speech_control(event.id, &speeches),
    )
    .await?;
    Ok(())
}

pub async fn activate(bot: &Bot, screen: Screen, state: &AppState, speech_id: i64) -> Result<()> {
    let Some(speech) = state.repos.schedules.set_active(speech_id).await? else {
        return not_found(bot, screen, "The speech").await;
    };
    control(bot, screen, state, speech.event_id).await
}
