use std::fmt::Display;

use teloxide::prelude::*;
use teloxide::types::MessageId;

use tracing::debug;

use crate::bot::dialogue::{MeetupDialogue, State};
use crate::bot::keyboards;
use crate::bot::utils::{escape_html, replace_screen};

pub mod admin;
pub mod callback;
pub mod command;
pub mod guest;
pub mod input;
pub mod payment;
pub mod registration;
pub mod speech;

/// Where a handler draws its answer: the chat, and the menu message to
/// replace when the update came from a button.
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub chat_id: ChatId,
    pub replace: Option<MessageId>,
}

impl Screen {
    pub fn fresh(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            replace: None,
        }
    }
}

/// Moves the chat's dialogue to `next`.
pub async fn advance(dialogue: &MeetupDialogue, next: State) -> anyhow::Result<()> {
    debug!("Chat {} moves to {}", dialogue.chat_id().0, next.label());
    dialogue.update(next).await?;
    Ok(())
}

/// Tells the user what was wrong with their answer and asks again.
/// The dialogue state is left untouched.
pub async fn reprompt(bot: &Bot, chat_id: ChatId, error: impl Display, state: &State) -> anyhow::Result<()> {
    let text = format!("⚠️ {}\n\n{}", escape_html(&error.to_string()), state.prompt());
    replace_screen(bot, chat_id, None, text, keyboards::cancel()).await?;
    Ok(())
}

pub async fn not_found(bot: &Bot, screen: Screen, what: &str) -> anyhow::Result<()> {
    replace_screen(
        bot,
        screen.chat_id,
        screen.replace,
        format!("🤷 {} not found. It may have been deleted.", what),
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}
