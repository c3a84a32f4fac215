use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};
use tracing::warn;

/// Escapes user-supplied text for `ParseMode::Html`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sends a new menu message, deleting the one whose button was pressed.
pub async fn replace_screen(
    bot: &Bot,
    chat_id: ChatId,
    previous: Option<MessageId>,
    text: impl Into<String>,
    keyboard: InlineKeyboardMarkup,
) -> anyhow::Result<Message> {
    if let Some(message_id) = previous {
        // Messages older than 48h cannot be deleted.
        if let Err(e) = bot.delete_message(chat_id, message_id).await {
            warn!("Failed to delete previous menu {}: {}", message_id.0, e);
        }
    }
    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(sent)
}

pub async fn send_html(bot: &Bot, chat_id: ChatId, text: impl Into<String>) -> anyhow::Result<Message> {
    let sent = bot
        .send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(sent)
}
