use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::bot::dialogue::MeetupDialogue;
use crate::bot::handlers::{guest, Screen};
use crate::bot::utils::send_html;
use crate::AppState;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "open the start screen")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "abort the current dialog")]
    Cancel,
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: MeetupDialogue,
    state: AppState,
) -> Result<()> {
    info!("Chat {} sent {:?}", msg.chat.id.0, cmd);
    match cmd {
        Command::Start => {
            dialogue.exit().await?;
            if let Some(user) = msg.from.as_ref() {
                guest::start(&bot, Screen::fresh(msg.chat.id), user, &state).await?;
            }
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Cancel => {
            dialogue.exit().await?;
            send_html(&bot, msg.chat.id, "Cancelled. Use /start to open the menu.").await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_in_lowercase() {
        assert_eq!(Command::parse("/start", "meetup_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/cancel", "meetup_bot").unwrap(), Command::Cancel);
        assert!(Command::parse("/unknown", "meetup_bot").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/start", "/help", "/cancel"] {
            assert!(help.contains(name), "{name} missing from help");
        }
    }
}
