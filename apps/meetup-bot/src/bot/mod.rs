use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::bot::dialogue::State;
use crate::bot::handlers::{callback, command, input, payment};
use crate::AppState;

pub mod callback_data;
pub mod dialogue;
pub mod handlers;
pub mod keyboards;
pub mod render;
pub mod utils;

/// Routing for every update the bot understands.
///
/// Pre-checkout queries carry no chat, so they are matched before the
/// per-chat dialogue is entered.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let commands = teloxide::filter_command::<command::Command, _>().endpoint(command::command_handler);
    let successful_payments = dptree::filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(payment::successful_payment_handler);

    let messages = Update::filter_message()
        .branch(successful_payments)
        .branch(commands)
        .branch(dptree::endpoint(input::text_handler));
    let callbacks = Update::filter_callback_query().endpoint(callback::callback_handler);

    dptree::entry()
        .branch(Update::filter_pre_checkout_query().endpoint(payment::pre_checkout_handler))
        .branch(
            teloxide::dispatching::dialogue::enter::<Update, InMemStorage<State>, State, _>()
                .branch(messages)
                .branch(callbacks),
        )
}

pub async fn run_bot(bot: Bot, state: AppState) {
    info!("Starting meetup bot dispatcher...");

    match bot.get_me().await {
        Ok(me) => {
            let username = me.username.clone().unwrap_or_else(|| "unknown".into());
            info!("Bot connected as: @{}", username);
        }
        Err(e) => {
            error!("Bot failed to connect to Telegram: {}", e);
            return;
        }
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<State>::new(), state])
        .default_handler(|upd| async move {
            info!("Unhandled update: {:?}", upd.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot dispatcher exited");
}
