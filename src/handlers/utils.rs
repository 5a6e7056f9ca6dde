use std::error::Error;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};

use crate::bot_state::BotState;
use crate::keyboards;
use crate::models::{NewOrder, OrderStatus};
use crate::repository::RepositoryError;
use crate::texts;

/// Текст и клавиатура раздела «Мои записи». Используется и командой
/// /myorders, и кнопкой главного меню.
pub async fn my_orders_view(
    state: &BotState,
    telegram_id: i64,
) -> Result<(String, InlineKeyboardMarkup), RepositoryError> {
    let Some(customer) = state.customers.get_by_telegram_id(telegram_id).await? else {
        return Ok((texts::NO_ORDERS.to_string(), keyboards::back_to_main_keyboard()));
    };

    let orders = state.orders.get_upcoming_orders(customer.id).await?;
    if orders.is_empty() {
        return Ok((texts::NO_ORDERS.to_string(), keyboards::back_to_main_keyboard()));
    }

    Ok((
        "📋 <b>Ваши предстоящие записи:</b>".to_string(),
        keyboards::my_orders_keyboard(&orders),
    ))
}

/// Завершает оформление: сохраняет контакт клиента, проверяет занятость
/// мастера и создаёт заказ. Время записи пока назначается на момент
/// оформления, его согласовывает мастер при подтверждении.
pub async fn finalize_booking(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    telegram_id: i64,
    username: &str,
    master_id: i32,
    service_id: i32,
    client_name: &str,
    client_phone: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let master = state.masters.get_by_id(master_id).await?;
    let service = state.services.get_by_id(service_id).await?;

    let (Some(master), Some(service)) = (master, service) else {
        log::warn!(
            "⚠️ Оформление сорвалось: мастер {} или услуга {} не найдены",
            master_id,
            service_id
        );
        bot.send_message(chat_id, "Произошла ошибка при поиске мастера или услуги.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    };

    let appointment_datetime = Utc::now();

    let free = state
        .orders
        .check_master_availability(
            master.id,
            appointment_datetime,
            service.duration_minutes,
            None,
        )
        .await?;

    if !free {
        bot.send_message(chat_id, texts::SLOT_TAKEN)
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    }

    let customer = state
        .customers
        .upsert_contact(telegram_id, username, client_name, client_phone)
        .await?;

    let new_order = NewOrder {
        user_id: customer.id,
        master_id: master.id,
        service_id: service.id,
        appointment_datetime,
        duration_minutes: service.duration_minutes,
        total_price: service.price,
        status: OrderStatus::Pending,
        notes: None,
        client_name: customer.name.clone(),
        client_phone: customer.phone.clone(),
    };

    let created = state.orders.create(&new_order).await?;

    bot.send_message(
        chat_id,
        texts::order_confirmation(&created, &master.name, &service.name),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::back_to_main_keyboard())
    .await?;

    Ok(())
}
