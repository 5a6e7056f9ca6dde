use std::error::Error;

use chrono::{Local, Utc};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::bot_state::{BotState, DialogState};
use crate::handlers::utils::{finalize_booking, my_orders_view};
use crate::keyboards;
use crate::models::{BookingSession, OrderStatus};
use crate::texts;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(data) = q.data.clone() {
        // Каждое нажатие получает ответ; при сбое хранилища диалог
        // сбрасывается и пользователь возвращается в меню.
        if let Err(e) = dispatch_callback(&bot, &q, &state, &data).await {
            log::error!("❌ Ошибка при обработке callback «{}»: {}", data, e);
            if let Some(ref message) = q.message {
                let chat_id = message.chat().id;
                state.clear_dialog(chat_id).await;
                bot.send_message(chat_id, texts::GENERIC_ERROR)
                    .reply_markup(keyboards::main_menu_keyboard())
                    .await?;
            }
        }
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}

async fn dispatch_callback(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    data: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(ref message) = q.message {
        let chat_id = message.chat().id;
        let message_id = message.id();
        let telegram_id = q.from.id.0 as i64;
        let username = q.from.username.clone().unwrap_or_default();

        match data {
            "MAIN:SEARCH" => {
                state
                    .set_dialog(chat_id, DialogState::AwaitingSearchQuery)
                    .await;

                bot.edit_message_text(chat_id, message_id, texts::SEARCH_PROMPT)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::cancel_search_keyboard())
                    .await?;
            }

            "MAIN:CATEGORY" | "back:CHOOSE_SERVICE" => {
                bot.edit_message_text(chat_id, message_id, texts::CHOOSE_CATEGORY)
                    .reply_markup(keyboards::category_keyboard())
                    .await?;
            }

            "MAIN:MASTERS" | "back:masters_list" => {
                show_masters_page(bot, chat_id, message_id, state, 0).await?;
            }

            "MAIN:ORDERS" => {
                let (text, keyboard) = my_orders_view(state, telegram_id).await?;
                bot.edit_message_text(chat_id, message_id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
            }

            "MAIN:INFO" => {
                bot.edit_message_text(chat_id, message_id, texts::INFO)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::back_to_main_keyboard())
                    .await?;
            }

            "back:main_menu" => {
                state.clear_dialog(chat_id).await;
                // После подтверждения заказа исходное сообщение лучше
                // оставить, поэтому меню уходит новым сообщением.
                bot.send_message(chat_id, texts::MAIN_MENU)
                    .reply_markup(keyboards::main_menu_keyboard())
                    .await?;
            }

            "current_page" => {}

            data if data.starts_with("category:") => {
                let category = data.trim_start_matches("category:");
                show_category_page(bot, chat_id, message_id, state, category, 0).await?;
            }

            data if data.starts_with("page:") => {
                if let Some((category, page)) = parse_page(data.trim_start_matches("page:")) {
                    show_category_page(bot, chat_id, message_id, state, category, page).await?;
                }
            }

            data if data.starts_with("masters_page:") => {
                if let Ok(page) = data.trim_start_matches("masters_page:").parse::<usize>() {
                    show_masters_page(bot, chat_id, message_id, state, page).await?;
                }
            }

            data if data.starts_with("search_page:") => {
                if let Some((query, page)) = parse_page(data.trim_start_matches("search_page:")) {
                    let services = state.services.search_by_description(query).await?;
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        texts::search_results_header(query, services.len(), page),
                    )
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::search_results_keyboard(&services, query, page))
                    .await?;
                }
            }

            data if data.starts_with("service_select:") => {
                let parts: Vec<&str> = data.split(':').collect();
                if let (Some(Ok(service_id)), Some(&"MASTERS")) =
                    (parts.get(1).map(|s| s.parse::<i32>()), parts.get(2))
                {
                    show_masters_for_service(bot, chat_id, message_id, state, service_id).await?;
                }
            }

            data if data.starts_with("service:") => {
                if let Ok(service_id) = data.trim_start_matches("service:").parse::<i32>() {
                    match state.services.get_by_id(service_id).await? {
                        Some(service) => {
                            bot.edit_message_text(chat_id, message_id, texts::service_card(&service))
                                .parse_mode(ParseMode::Html)
                                .reply_markup(keyboards::service_actions_keyboard(service.id))
                                .await?;
                        }
                        None => {
                            bot.edit_message_text(
                                chat_id,
                                message_id,
                                "❌ Услуга не найдена. Попробуйте еще раз.",
                            )
                            .reply_markup(keyboards::category_keyboard())
                            .await?;
                        }
                    }
                }
            }

            data if data.starts_with("master_info:") => {
                if let Ok(master_id) = data.trim_start_matches("master_info:").parse::<i32>() {
                    match state.masters.get_by_id(master_id).await? {
                        Some(master) => {
                            let services = state.services.get_by_master_id(master.id).await?;
                            bot.edit_message_text(chat_id, message_id, texts::master_card(&master))
                                .parse_mode(ParseMode::Html)
                                .reply_markup(keyboards::master_services_keyboard(
                                    master.id, &services,
                                ))
                                .await?;
                        }
                        None => {
                            bot.edit_message_text(chat_id, message_id, "❌ Мастер не найден.")
                                .reply_markup(keyboards::back_to_main_keyboard())
                                .await?;
                        }
                    }
                }
            }

            data if data.starts_with("master_service:") => {
                let parts: Vec<&str> = data.split(':').collect();
                if let (Some(Ok(master_id)), Some(Ok(service_id))) = (
                    parts.get(1).map(|s| s.parse::<i32>()),
                    parts.get(2).map(|s| s.parse::<i32>()),
                ) {
                    let master = state.masters.get_by_id(master_id).await?;
                    let service = state.services.get_by_id(service_id).await?;

                    if let (Some(master), Some(service)) = (master, service) {
                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            texts::master_service_card(&master, &service),
                        )
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::master_service_keyboard(master.id, service.id))
                        .await?;
                    } else {
                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            "❌ Услуга или мастер не найдены.",
                        )
                        .reply_markup(keyboards::back_to_main_keyboard())
                        .await?;
                    }
                }
            }

            data if data.starts_with("master_schedule:") => {
                if let Ok(master_id) = data.trim_start_matches("master_schedule:").parse::<i32>() {
                    show_master_schedule(bot, chat_id, message_id, state, master_id).await?;
                }
            }

            data if data.starts_with("ORDER:") => {
                let parts: Vec<&str> = data.split(':').collect();
                if let (Some(Ok(master_id)), Some(Ok(service_id))) = (
                    parts.get(1).map(|s| s.parse::<i32>()),
                    parts.get(2).map(|s| s.parse::<i32>()),
                ) {
                    start_booking(
                        bot, chat_id, message_id, state, telegram_id, &username, master_id,
                        service_id,
                    )
                    .await?;
                }
            }

            data if data.starts_with("order_info:") => {
                if let Ok(order_id) = data.trim_start_matches("order_info:").parse::<i32>() {
                    show_order_info(bot, chat_id, message_id, state, telegram_id, order_id)
                        .await?;
                }
            }

            data if data.starts_with("order_cancel:") => {
                if let Ok(order_id) = data.trim_start_matches("order_cancel:").parse::<i32>() {
                    cancel_order(bot, chat_id, message_id, state, telegram_id, order_id).await?;
                }
            }

            _ => {}
        }
    }

    Ok(())
}

/// "hair_services:2" -> ("hair_services", 2). Номер страницы всегда
/// последним сегментом, двоеточия внутри ключа допустимы.
fn parse_page(data: &str) -> Option<(&str, usize)> {
    let (key, page) = data.rsplit_once(':')?;
    Some((key, page.parse().ok()?))
}

async fn show_category_page(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    category: &str,
    page: usize,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let services = state.services.get_by_category(category).await?;
    let title = texts::category_title(category);

    if services.is_empty() {
        bot.edit_message_text(
            chat_id,
            message_id,
            format!("{}\n\nВ этой категории пока нет услуг.", title),
        )
        .reply_markup(keyboards::category_keyboard())
        .await?;
        return Ok(());
    }

    let header = if page == 0 {
        format!("{}\n\nВыберите услугу:", title)
    } else {
        format!("{} (стр. {})\n\nВыберите услугу:", title, page + 1)
    };

    bot.edit_message_text(chat_id, message_id, header)
        .reply_markup(keyboards::services_page_keyboard(&services, category, page))
        .await?;

    Ok(())
}

async fn show_masters_page(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    page: usize,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let masters = state.masters.get_all_active().await?;

    bot.edit_message_text(chat_id, message_id, texts::CHOOSE_MASTER)
        .reply_markup(keyboards::masters_page_keyboard(&masters, page))
        .await?;

    Ok(())
}

async fn show_masters_for_service(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    service_id: i32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let masters = state.masters.get_by_service_id(service_id).await?;

    if masters.is_empty() {
        bot.edit_message_text(
            chat_id,
            message_id,
            "😔 Пока нет мастеров, оказывающих эту услугу.",
        )
        .reply_markup(keyboards::back_to_main_keyboard())
        .await?;
        return Ok(());
    }

    bot.edit_message_text(chat_id, message_id, texts::CHOOSE_MASTER)
        .reply_markup(keyboards::master_select_keyboard(&masters, service_id))
        .await?;

    Ok(())
}

async fn show_master_schedule(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    master_id: i32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let today = Local::now().date_naive();
    let busy = state.orders.get_master_busy_times(master_id, today).await?;

    let mut text = format!("📅 <b>Расписание на {}</b>\n\n", today.format("%d.%m.%Y"));
    if busy.is_empty() {
        text.push_str("Сегодня мастер полностью свободен.");
    } else {
        text.push_str("Занятые интервалы:\n");
        for (start, end) in &busy {
            text.push_str(&format!(
                "• {} – {}\n",
                start.with_timezone(&Local).format("%H:%M"),
                end.with_timezone(&Local).format("%H:%M")
            ));
        }
    }

    bot.edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::master_schedule_keyboard(master_id))
        .await?;

    Ok(())
}

/// Старт оформления. Клиенту с полным профилем заказ создаётся сразу,
/// остальных диалог ведёт через имя и телефон.
async fn start_booking(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    telegram_id: i64,
    username: &str,
    master_id: i32,
    service_id: i32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let customer = state.customers.get_by_telegram_id(telegram_id).await?;

    if let Some(customer) = customer.filter(|c| c.has_full_contact()) {
        let name = customer.name.clone().unwrap_or_default();
        let phone = customer.phone.clone().unwrap_or_default();

        finalize_booking(
            bot, chat_id, state, telegram_id, username, master_id, service_id, &name, &phone,
        )
        .await?;
        return Ok(());
    }

    state
        .set_dialog(
            chat_id,
            DialogState::Booking(BookingSession::new(master_id, service_id, telegram_id)),
        )
        .await;

    bot.edit_message_text(chat_id, message_id, texts::ASK_NAME)
        .await?;

    Ok(())
}

async fn show_order_info(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    telegram_id: i64,
    order_id: i32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(order) = state.orders.get_by_id(order_id).await? else {
        bot.edit_message_text(chat_id, message_id, "❌ Заказ не найден.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    };

    let customer = state.customers.get_by_telegram_id(telegram_id).await?;
    if customer.map_or(true, |c| c.id != order.user_id) {
        bot.edit_message_text(chat_id, message_id, "❌ Это не ваша запись.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    }

    let master_name = state
        .masters
        .get_by_id(order.master_id)
        .await?
        .map(|m| m.name)
        .unwrap_or_else(|| "—".to_string());
    let service_name = state
        .services
        .get_by_id(order.service_id)
        .await?
        .map(|s| s.name)
        .unwrap_or_else(|| "—".to_string());

    let cancellable = order.appointment_datetime > Utc::now()
        && matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed);

    bot.edit_message_text(
        chat_id,
        message_id,
        texts::order_details(&order, &master_name, &service_name),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::order_info_keyboard(order.id, cancellable))
    .await?;

    Ok(())
}

async fn cancel_order(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    state: &BotState,
    telegram_id: i64,
    order_id: i32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(order) = state.orders.get_by_id(order_id).await? else {
        bot.edit_message_text(chat_id, message_id, "❌ Заказ не найден.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    };

    let customer = state.customers.get_by_telegram_id(telegram_id).await?;
    if customer.map_or(true, |c| c.id != order.user_id) {
        bot.edit_message_text(chat_id, message_id, "❌ Это не ваша запись.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
        return Ok(());
    }

    let cancelled = state
        .orders
        .update_status(order.id, OrderStatus::Cancelled)
        .await?;

    if cancelled {
        log::info!("❌ Заказ #{} отменён клиентом {}", order.id, telegram_id);
        bot.edit_message_text(
            chat_id,
            message_id,
            format!("✅ Запись №{} отменена.", order.id),
        )
        .reply_markup(keyboards::back_to_main_keyboard())
        .await?;
    } else {
        bot.edit_message_text(chat_id, message_id, "❌ Не удалось отменить запись.")
            .reply_markup(keyboards::back_to_main_keyboard())
            .await?;
    }

    Ok(())
}
