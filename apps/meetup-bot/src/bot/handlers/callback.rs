use anyhow::Result;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::bot::callback_data::CallbackData;
use crate::bot::dialogue::{EventTarget, MeetupDialogue};
use crate::bot::handlers::{admin, guest, registration, speech, Screen};
use crate::AppState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MeetupDialogue,
    state: AppState,
) -> Result<()> {
    let tg_id = q.from.id.0 as i64;
    let raw = q.data.as_deref().unwrap_or_default();
    let data = match raw.parse::<CallbackData>() {
        Ok(data) => data,
        Err(e) => {
            warn!("Callback from {}: {}", tg_id, e);
            bot.answer_callback_query(q.id.clone())
                .text("This button is outdated.")
                .await?;
            return Ok(());
        }
    };

    if data.is_admin_only() && !state.is_admin(tg_id) {
        warn!("Non-admin {} pressed {}", tg_id, data);
        bot.answer_callback_query(q.id.clone())
            .text("Admins only.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let screen = Screen {
        chat_id: message.chat().id,
        replace: Some(message.id()),
    };
    info!("Callback {} from {}", data, tg_id);

    // Confirmation buttons continue the current dialog; every other button
    // starts over from a clean state.
    if !matches!(
        data,
        CallbackData::RegisterPublic(_) | CallbackData::RegisterSave | CallbackData::SaveEvent
    ) {
        dialogue.exit().await?;
    }

    match data {
        CallbackData::GuestMenu | CallbackData::Cancel => guest::menu(&bot, screen, tg_id, &state).await,
        CallbackData::About => guest::about(&bot, screen, &state).await,
        CallbackData::Register => registration::begin(&bot, screen, &dialogue).await,
        CallbackData::RegisterPublic(open) => {
            registration::choose_public(&bot, screen, tg_id, &dialogue, open).await
        }
        CallbackData::RegisterSave => registration::save(&bot, screen, tg_id, &dialogue, &state).await,
        CallbackData::Schedule => guest::schedule(&bot, screen, &state).await,
        CallbackData::NextEvents => guest::upcoming(&bot, screen, &state).await,
        CallbackData::AskQuestion => guest::ask_question(&bot, screen, &dialogue, &state).await,
        CallbackData::MyQuestions => guest::my_questions(&bot, screen, tg_id, &state).await,
        CallbackData::FindContacts => guest::contacts(&bot, screen, tg_id, &state).await,
        CallbackData::Donate => guest::donate(&bot, screen, &dialogue, &state).await,

        CallbackData::AdminRoot => admin::root(&bot, screen, &state).await,
        CallbackData::NewEvent => {
            admin::begin_event_dialog(&bot, screen, &dialogue, &state, EventTarget::New).await
        }
        CallbackData::EditEvent(id) => {
            admin::begin_event_dialog(&bot, screen, &dialogue, &state, EventTarget::Existing(id)).await
        }
        CallbackData::SaveEvent => admin::save_event(&bot, screen, &dialogue, &state).await,
        CallbackData::Event(id) => admin::event_menu(&bot, screen, &state, id).await,
        CallbackData::ActivateEvent(id) => admin::activate_event(&bot, screen, &state, id).await,
        CallbackData::DeleteEvent(id) => admin::ask_delete_event(&bot, screen, &state, id).await,
        CallbackData::ConfirmDeleteEvent(id) => admin::delete_event(&bot, screen, &state, id).await,
        CallbackData::NotifySpeakers(id) => admin::notify_speakers(&bot, screen, &state, id).await,
        CallbackData::NotifyGuests(id) => admin::notify_guests(&bot, screen, &state, id).await,
        CallbackData::Broadcast => admin::begin_broadcast(&bot, screen, &dialogue).await,
        CallbackData::DonationReport(id) => admin::donation_report(&bot, screen, &state, id).await,

        CallbackData::ShowSchedule(id) => speech::editor(&bot, screen, &state, id).await,
        CallbackData::ControlSchedule(id) => speech::control(&bot, screen, &state, id).await,
        CallbackData::NewSpeech(event_id) => speech::create(&bot, screen, &state, event_id).await,
        CallbackData::Speech(id) => speech::menu(&bot, screen, &state, id).await,
        CallbackData::ActivateSpeech(id) => speech::activate(&bot, screen, &state, id).await,
        CallbackData::EditSpeech(kind, id) => {
            speech::begin_edit(&bot, screen, &dialogue, &state, kind, id).await
        }
        CallbackData::DeleteSpeech(id) => speech::delete(&bot, screen, &state, id).await,
    }
}
