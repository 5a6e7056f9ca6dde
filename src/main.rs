use teloxide::{prelude::*, utils::command::BotCommands};

mod bot_state;
mod database;
mod handlers;
mod keyboards;
mod models;
mod repository;
mod seed;
mod texts;

use crate::bot_state::BotState;
use crate::database::{Database, DatabaseConfig};
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "главное меню")]
    Start,
    #[command(description = "показать помощь")]
    Help,
    #[command(description = "мои записи")]
    MyOrders,
    #[command(description = "статистика салона")]
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting salon booking bot with PostgreSQL...");

    let config = DatabaseConfig::from_env()?;
    let db = Database::new(&config).await?;
    db.init().await?;
    log::info!("✅ Database initialized");

    let state = BotState::new(&db);

    seed::seed_catalog(&state.services, &state.masters).await?;

    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
