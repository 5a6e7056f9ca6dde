use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Пользователь бота. Создаётся при первом /start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub telegram_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
