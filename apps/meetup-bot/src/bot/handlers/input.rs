use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::bot::dialogue::{InputKind, MeetupDialogue, State};
use crate::bot::handlers::{admin, guest, payment, registration, speech};
use crate::bot::utils::send_html;
use crate::AppState;

/// Every plain message lands here and is routed by the chat's dialogue state.
pub async fn text_handler(bot: Bot, msg: Message, dialogue: MeetupDialogue, state: AppState) -> Result<()> {
    let current = dialogue.get_or_default().await?;
    let sender_is_admin = msg.from.as_ref().is_some_and(|u| state.is_admin(u.id.0 as i64));
    if !may_answer(&current, sender_is_admin) {
        warn!("Chat {} answered {} without admin rights", msg.chat.id.0, current.label());
        dialogue.exit().await?;
        send_html(&bot, msg.chat.id, "Admins only.").await?;
        return Ok(());
    }

    let Some(text) = msg.text() else {
        if current.expected_input() == InputKind::Text {
            send_html(&bot, msg.chat.id, format!("Please send text. {}", current.prompt())).await?;
        }
        return Ok(());
    };
    debug!("Chat {} in {} sent text", msg.chat.id.0, current.label());
    let chat_id = msg.chat.id;

    match current {
        State::Idle => {
            send_html(&bot, chat_id, State::Idle.prompt()).await?;
        }

        State::EventDate { target } => {
            admin::receive_event_date(&bot, chat_id, &dialogue, target, text).await?;
        }
        State::EventTopic { target, date } => {
            admin::receive_event_topic(&bot, chat_id, &dialogue, target, date, text).await?;
        }

        State::RegistrationName => {
            registration::receive_name(&bot, chat_id, &dialogue, text).await?;
        }
        State::RegistrationPhone { name } => {
            registration::receive_phone(&bot, chat_id, &dialogue, name, text).await?;
        }
        State::RegistrationActivity { name, phone } => {
            registration::receive_activity(&bot, chat_id, &dialogue, name, phone, text).await?;
        }
        State::RegistrationProjects {
            name,
            phone,
            activity,
        } => {
            registration::receive_projects(&bot, chat_id, &dialogue, (name, phone, activity), text)
                .await?;
        }

        State::SpeechEdit { speech_id, field } => {
            speech::receive_field(&bot, chat_id, &dialogue, &state, speech_id, field, text).await?;
        }
        State::SpeakerId { speech_id } => {
            speech::receive_speaker_id(&bot, chat_id, &dialogue, speech_id, text).await?;
        }
        State::SpeakerName {
            speech_id,
            speaker_tg_id,
        } => {
            speech::receive_speaker_name(
                &bot,
                chat_id,
                &dialogue,
                &state,
                (speech_id, speaker_tg_id),
                text,
            )
            .await?;
        }

        State::Question { schedule_id } => {
            guest::receive_question(&bot, &msg, &dialogue, &state, schedule_id, text).await?;
        }
        State::DonationAmount => {
            payment::receive_amount(&bot, &msg, &dialogue, &state, text).await?;
        }
        State::Broadcast => {
            admin::receive_broadcast(&bot, chat_id, &dialogue, &state, text).await?;
        }

        waiting @ (State::EventConfirm { .. }
        | State::RegistrationPublic { .. }
        | State::RegistrationConfirm { .. }) => {
            send_html(
                &bot,
                chat_id,
                format!("{} Please answer with the buttons above.", waiting.prompt()),
            )
            .await?;
        }
    }
    Ok(())
}

/// Admin dialogs only take answers from users who are still admins.
fn may_answer(current: &State, sender_is_admin: bool) -> bool {
    sender_is_admin || !current.is_admin_only()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::dialogue::{EventTarget, SpeechText};

    #[test]
    fn admin_dialogs_refuse_other_users() {
        let admin_states = [
            State::EventDate {
                target: EventTarget::New,
            },
            State::SpeechEdit {
                speech_id: 1,
                field: SpeechText::Topic,
            },
            State::SpeakerId { speech_id: 1 },
            State::Broadcast,
        ];
        for current in &admin_states {
            assert!(!may_answer(current, false), "{:?}", current);
            assert!(may_answer(current, true), "{:?}", current);
        }
    }

    #[test]
    fn guest_dialogs_accept_everyone() {
        assert!(may_answer(&State::RegistrationName, false));
        assert!(may_answer(&State::Question { schedule_id: 3 }, false));
        assert!(may_answer(&State::DonationAmount, false));
        assert!(may_answer(&State::Idle, false));
    }
}
