use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::RwLock;

use crate::database::Database;
use crate::models::BookingSession;
use crate::repository::{
    CustomerRepository, MasterRepository, OrderRepository, ServiceRepository, UserRepository,
};

/// Чего бот ждёт от следующего текстового сообщения в чате.
#[derive(Debug, Clone)]
pub enum DialogState {
    /// Пользователь нажал «Поиск», ждём строку запроса.
    AwaitingSearchQuery,
    /// Идёт оформление записи, ждём имя или телефон.
    Booking(BookingSession),
}

/// Общее состояние бота: репозитории поверх одного пула соединений и
/// диалоговые состояния чатов в памяти.
#[derive(Clone)]
pub struct BotState {
    pub users: UserRepository,
    pub customers: CustomerRepository,
    pub masters: MasterRepository,
    pub services: ServiceRepository,
    pub orders: OrderRepository,
    dialogs: Arc<RwLock<HashMap<ChatId, DialogState>>>,
}

impl BotState {
    pub fn new(db: &Database) -> Self {
        BotState {
            users: UserRepository::new(db.pool.clone()),
            customers: CustomerRepository::new(db.pool.clone()),
            masters: MasterRepository::new(db.pool.clone()),
            services: ServiceRepository::new(db.pool.clone()),
            orders: OrderRepository::new(db.pool.clone()),
            dialogs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn dialog(&self, chat_id: ChatId) -> Option<DialogState> {
        self.dialogs.read().await.get(&chat_id).cloned()
    }

    pub async fn set_dialog(&self, chat_id: ChatId, state: DialogState) {
        self.dialogs.write().await.insert(chat_id, state);
    }

    pub async fn clear_dialog(&self, chat_id: ChatId) {
        self.dialogs.write().await.remove(&chat_id);
    }
}
