use std::error::Error;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot_state::BotState;
use crate::handlers::utils::my_orders_view;
use crate::keyboards;
use crate::texts;
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::MyOrders => handle_my_orders(bot, msg, state).await?,
        Command::Stats => handle_stats(bot, msg, state).await?,
    }
    Ok(())
}

async fn handle_start(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Любой диалог обрывается возвратом в главное меню.
    state.clear_dialog(msg.chat.id).await;

    if let Some(from) = msg.from.as_ref() {
        let username = from.username.as_deref().unwrap_or("");
        state.users.register(from.id.0 as i64, username).await?;
    }

    bot.send_message(msg.chat.id, texts::START)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu_keyboard())
        .await?;

    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.send_message(msg.chat.id, texts::HELP)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

async fn handle_my_orders(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let telegram_id = match msg.from.as_ref() {
        Some(from) => from.id.0 as i64,
        None => return Ok(()),
    };

    let (text, keyboard) = my_orders_view(&state, telegram_id).await?;

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

async fn handle_stats(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let stats = state.orders.get_statistics(None, None).await?;
    let today = state.orders.get_today_orders().await?;

    let mut report = texts::statistics_report(&stats);
    report.push_str(&format!("\n\n📅 Записей на сегодня: <b>{}</b>", today.len()));

    bot.send_message(msg.chat.id, report)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}
