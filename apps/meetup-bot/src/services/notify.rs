use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, warn};

/// Telegram allows about 30 messages per second per bot.
const SEND_PAUSE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends one HTML message to every recipient, skipping users who blocked the bot.
pub async fn broadcast(bot: &Bot, recipients: &[i64], text: &str) -> DeliveryReport {
    deliver(recipients, SEND_PAUSE, |tg_id| async move {
        bot.send_message(ChatId(tg_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
    })
    .await
}

/// Sends each recipient their own HTML message.
pub async fn send_personal(bot: &Bot, messages: &BTreeMap<i64, String>) -> DeliveryReport {
    let recipients: Vec<i64> = messages.keys().copied().collect();
    deliver(&recipients, SEND_PAUSE, |tg_id| async move {
        let text = messages.get(&tg_id).cloned().unwrap_or_default();
        bot.send_message(ChatId(tg_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
    })
    .await
}

pub async fn deliver<F, Fut, E>(recipients: &[i64], pause: Duration, mut send: F) -> DeliveryReport
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let mut report = DeliveryReport::default();
    if recipients.is_empty() {
        info!("No recipients, skipping delivery");
        return report;
    }

    for &tg_id in recipients {
        if tg_id <= 0 {
            continue;
        }
        match send(tg_id).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                report.failed += 1;
                warn!("Failed to deliver message to tg_id {}: {}", tg_id, e);
            }
        }
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    info!(
        "Delivery complete: {}/{} sent, {} failed",
        report.sent,
        recipients.len(),
        report.failed
    );
    report
}
