use anyhow::Result;
use meetup_db::models::donation::NewDonation;
use teloxide::prelude::*;
use teloxide::types::{LabeledPrice, PreCheckoutQuery};
use tracing::{error, info, warn};

use crate::bot::dialogue::{MeetupDialogue, State};
use crate::bot::handlers::reprompt;
use crate::bot::keyboards;
use crate::bot::utils::replace_screen;
use crate::models::payment::DonationPayload;
use crate::services::input::parse_amount;
use crate::AppState;

/// Turns the typed amount into a Telegram invoice.
pub async fn receive_amount(
    bot: &Bot,
    msg: &Message,
    dialogue: &MeetupDialogue,
    state: &AppState,
    text: &str,
) -> Result<()> {
    let amount = match parse_amount(text) {
        Ok(amount) => amount,
        Err(e) => return reprompt(bot, msg.chat.id, e, &State::DonationAmount).await,
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let Some(provider_token) = state.config.payments_token.clone() else {
        dialogue.exit().await?;
        replace_screen(
            bot,
            msg.chat.id,
            None,
            "Donations are not available at the moment.",
            keyboards::back_to_guest_menu(),
        )
        .await?;
        return Ok(());
    };

    let active = state.repos.events.get_active().await?;
    let payload = DonationPayload {
        tg_id: user.id.0 as i64,
        event_id: active.as_ref().map(|e| e.id),
        amount,
    };
    let Some(minor_units) = payload.minor_units() else {
        return reprompt(bot, msg.chat.id, "The amount is too large.", &State::DonationAmount).await;
    };
    dialogue.exit().await?;
    let description = match &active {
        Some(event) => format!("Support for \"{}\"", event.topic),
        None => format!("Support for {}", state.config.meetup_name),
    };

    bot.send_invoice(
        msg.chat.id,
        "Donation",
        description,
        payload.to_payload_string(),
        state.config.payments_currency.clone(),
        vec![LabeledPrice::new("Donation", minor_units)],
    )
    .provider_token(provider_token)
    .await?;
    info!("Invoice sent to {} for {} {}", payload.tg_id, amount, state.config.payments_currency);
    Ok(())
}

/// Approves only invoices this bot issued, for the amount they were issued for.
pub async fn pre_checkout_handler(bot: Bot, q: PreCheckoutQuery, state: AppState) -> Result<()> {
    let verdict = DonationPayload::parse(&q.invoice_payload)
        .map_err(|e| e.to_string())
        .and_then(|payload| {
            if payload.tg_id != q.from.id.0 as i64 {
                return Err("invoice issued to another user".to_string());
            }
            if payload.minor_units() != Some(q.total_amount) {
                return Err("amount does not match the invoice".to_string());
            }
            if !q.currency.eq_ignore_ascii_case(&state.config.payments_currency) {
                return Err(format!("unexpected currency {}", q.currency));
            }
            Ok(payload)
        });

    match verdict {
        Ok(payload) => {
            info!("Pre-checkout approved: {:?}", payload);
            bot.answer_pre_checkout_query(q.id, true).await?;
        }
        Err(reason) => {
            warn!("Pre-checkout rejected for {}: {}", q.invoice_payload, reason);
            bot.answer_pre_checkout_query(q.id, false)
                .error_message("This invoice is no longer valid. Please start the donation again.")
                .await?;
        }
    }
    Ok(())
}

pub async fn successful_payment_handler(bot: Bot, msg: Message, state: AppState) -> Result<()> {
    let Some(payment) = msg.successful_payment() else {
        return Ok(());
    };
    let payload = match DonationPayload::parse(&payment.invoice_payload) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Payment {} carries an unusable payload: {}", payment.provider_payment_charge_id, e);
            return Ok(());
        }
    };

    let donation = NewDonation {
        amount: payload.amount,
        currency: &payment.currency,
        donor_tg_id: payload.tg_id,
        event_id: payload.event_id,
        charge_id: &payment.provider_payment_charge_id,
    };
    match state.repos.donations.record(&donation).await? {
        Some(stored) => info!(
            "Donation {} stored: {} {} from {}",
            stored.id, stored.amount, stored.currency, stored.donor_tg_id
        ),
        None => {
            info!("Duplicate payment callback for charge {}", donation.charge_id);
            return Ok(());
        }
    }

    replace_screen(
        &bot,
        msg.chat.id,
        None,
        "💚 Thank you for your donation!",
        keyboards::back_to_guest_menu(),
    )
    .await?;
    Ok(())
}
