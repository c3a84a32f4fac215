use anyhow::Result;
use meetup_db::models::guest::GuestProfile;
use teloxide::prelude::*;
use tracing::info;

use crate::bot::dialogue::{MeetupDialogue, State};
use crate::bot::handlers::{advance, reprompt, Screen};
use crate::bot::keyboards;
use crate::bot::render;
use crate::bot::utils::{escape_html, replace_screen};
use crate::services::input::{clean_text, parse_phone, MAX_LONG_TEXT_LEN, MAX_TEXT_LEN};
use crate::AppState;

async fn ask(bot: &Bot, chat_id: ChatId, dialogue: &MeetupDialogue, next: State) -> Result<()> {
    let prompt = next.prompt();
    advance(dialogue, next).await?;
    replace_screen(bot, chat_id, None, prompt, keyboards::cancel()).await?;
    Ok(())
}

pub async fn begin(bot: &Bot, screen: Screen, dialogue: &MeetupDialogue) -> Result<()> {
    advance(dialogue, State::RegistrationName).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("📝 Registration\n\n{}", State::RegistrationName.prompt()),
        keyboards::cancel(),
    )
    .await?;
    Ok(())
}

pub async fn receive_name(bot: &Bot, chat_id: ChatId, dialogue: &MeetupDialogue, text: &str) -> Result<()> {
    match clean_text(text, MAX_TEXT_LEN) {
        Ok(name) => ask(bot, chat_id, dialogue, State::RegistrationPhone { name }).await,
        Err(e) => reprompt(bot, chat_id, e, &State::RegistrationName).await,
    }
}

pub async fn receive_phone(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    name: String,
    text: &str,
) -> Result<()> {
    match parse_phone(text) {
        Ok(phone) => ask(bot, chat_id, dialogue, State::RegistrationActivity { name, phone }).await,
        Err(e) => reprompt(bot, chat_id, e, &State::RegistrationPhone { name }).await,
    }
}

pub async fn receive_activity(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    name: String,
    phone: String,
    text: &str,
) -> Result<()> {
    match clean_text(text, MAX_TEXT_LEN) {
        Ok(activity) => {
            let next = State::RegistrationProjects {
                name,
                phone,
                activity,
            };
            ask(bot, chat_id, dialogue, next).await
        }
        Err(e) => reprompt(bot, chat_id, e, &State::RegistrationActivity { name, phone }).await,
    }
}

pub async fn receive_projects(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &MeetupDialogue,
    (name, phone, activity): (String, String, String),
    text: &str,
) -> Result<()> {
    let projects = match clean_text(text, MAX_LONG_TEXT_LEN) {
        Ok(projects) => projects,
        Err(e) => {
            let current = State::RegistrationProjects {
                name,
                phone,
                activity,
            };
            return reprompt(bot, chat_id, e, &current).await;
        }
    };

    let next = State::RegistrationPublic {
        name,
        phone,
        activity,
        projects,
    };
    let prompt = next.prompt();
    advance(dialogue, next).await?;
    replace_screen(
        bot,
        chat_id,
        None,
        prompt,
        keyboards::registration_public(),
    )
    .await?;
    Ok(())
}

/// Answer to the "share contacts" question; shows the summary to confirm.
pub async fn choose_public(
    bot: &Bot,
    screen: Screen,
    tg_id: i64,
    dialogue: &MeetupDialogue,
    open_for_contact: bool,
) -> Result<()> {
    let State::RegistrationPublic {
        name,
        phone,
        activity,
        projects,
    } = dialogue.get_or_default().await?
    else {
        return stale(bot, screen).await;
    };

    let profile = GuestProfile {
        tg_id,
        name,
        phone,
        kind_activity: activity,
        projects,
        open_for_contact,
    };
    let text = render::profile_summary(&profile);
    advance(dialogue, State::RegistrationConfirm { profile }).await?;
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        text,
        keyboards::registration_confirm(),
    )
    .await?;
    Ok(())
}

pub async fn save(
    bot: &Bot,
    screen: Screen,
    tg_id: i64,
    dialogue: &MeetupDialogue,
    state: &AppState,
) -> Result<()> {
    let State::RegistrationConfirm { profile } = dialogue.get_or_default().await? else {
        return stale(bot, screen).await;
    };
    // The confirm button belongs to whoever pressed it.
    let profile = GuestProfile { tg_id, ..profile };

    let guest = state.repos.guests.upsert(&profile).await?;
    dialogue.exit().await?;
    info!("Guest {} (tg {}) registered", guest.id, guest.tg_id);

    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("✅ Thank you, {}! Your profile is saved.", escape_html(&guest.name)),
        keyboards::guest_menu(true, state.donations_enabled()),
    )
    .await?;
    Ok(())
}

/// A confirmation button pressed after the dialog moved on.
pub async fn stale(bot: &Bot, screen: Screen) -> Result<()> {
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        "This form is no longer open. Please start again.",
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}
