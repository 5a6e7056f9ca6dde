use std::error::Error;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot_state::{BotState, DialogState};
use crate::handlers::utils::finalize_booking;
use crate::keyboards;
use crate::models::{BookingSession, BookingStage};
use crate::texts;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Команды уже обработаны в command_handler.
    if msg.text().map_or(false, |t| t.starts_with('/')) {
        return Ok(());
    }

    let chat_id = msg.chat.id;

    let result = match state.dialog(chat_id).await {
        Some(DialogState::AwaitingSearchQuery) => handle_search_query(&bot, &msg, &state).await,
        Some(DialogState::Booking(session)) => {
            handle_booking_input(&bot, &msg, &state, session).await
        }
        None => {
            bot.send_message(chat_id, texts::MAIN_MENU)
                .reply_markup(keyboards::main_menu_keyboard())
                .await?;
            return Ok(());
        }
    };

    // Пользователь не должен остаться без ответа; оборванный диалог
    // сбрасывается в главное меню.
    if let Err(e) = result {
        log::error!("❌ Ошибка при обработке сообщения в чате {}: {}", chat_id, e);
        state.clear_dialog(chat_id).await;
        bot.send_message(chat_id, texts::GENERIC_ERROR)
            .reply_markup(keyboards::main_menu_keyboard())
            .await?;
    }

    Ok(())
}

async fn handle_search_query(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(query) = msg.text().map(str::trim) else {
        return Ok(());
    };

    if query.chars().count() < 2 {
        bot.send_message(msg.chat.id, texts::SEARCH_TOO_SHORT)
            .reply_markup(keyboards::nothing_found_keyboard())
            .await?;
        return Ok(());
    }

    state.clear_dialog(msg.chat.id).await;

    let services = state.services.search_by_description(query).await?;
    log::info!("🔍 Поиск «{}»: найдено {}", query, services.len());

    if services.is_empty() {
        bot.send_message(msg.chat.id, texts::search_nothing_found(query))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::nothing_found_keyboard())
            .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            texts::search_results_header(query, services.len(), 0),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::search_results_keyboard(&services, query, 0))
        .await?;
    }

    Ok(())
}

async fn handle_booking_input(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    mut session: BookingSession,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match session.stage {
        BookingStage::AwaitingName => {
            let Some(text) = msg.text() else {
                return Ok(());
            };

            if let Err(e) = session.submit_name(text) {
                bot.send_message(msg.chat.id, e.user_message()).await?;
                return Ok(());
            }

            state
                .set_dialog(msg.chat.id, DialogState::Booking(session))
                .await;

            bot.send_message(msg.chat.id, texts::ASK_PHONE)
                .reply_markup(keyboards::contact_request_keyboard())
                .await?;
        }

        BookingStage::AwaitingPhone => {
            if let Some(contact) = msg.contact() {
                session.submit_contact(&contact.phone_number);
            } else if let Some(text) = msg.text() {
                if let Err(e) = session.submit_phone_text(text) {
                    bot.send_message(msg.chat.id, e.user_message()).await?;
                    return Ok(());
                }
            } else {
                return Ok(());
            }

            state.clear_dialog(msg.chat.id).await;

            let username = msg
                .from
                .as_ref()
                .and_then(|u| u.username.clone())
                .unwrap_or_default();
            let name = session.client_name.clone().unwrap_or_default();
            let phone = session.client_phone.clone().unwrap_or_default();

            finalize_booking(
                bot,
                msg.chat.id,
                state,
                session.telegram_user_id,
                &username,
                session.master_id,
                session.service_id,
                &name,
                &phone,
            )
            .await?;
        }
    }

    Ok(())
}
