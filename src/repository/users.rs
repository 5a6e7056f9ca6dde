use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::User;
use crate::repository::RepositoryError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        UserRepository { pool }
    }

    /// Регистрирует пользователя при первом /start; повторный /start
    /// только обновляет username.
    pub async fn register(&self, telegram_id: i64, username: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO users (telegram_id, username) VALUES ($1, $2) \
             ON CONFLICT (telegram_id) DO UPDATE SET username = EXCLUDED.username \
             RETURNING id, telegram_id, username, created_at",
        )
        .bind(telegram_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при регистрации пользователя {}: {}", telegram_id, e);
            e
        })?;

        row_to_user(&row)
    }

    pub async fn get_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, telegram_id, username, created_at FROM users WHERE telegram_id = $1",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при поиске пользователя {}: {}", telegram_id, e);
            e
        })?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &PgRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: row.try_get("id")?,
        telegram_id: row.try_get("telegram_id")?,
        username: row.try_get("username")?,
        created_at: row.try_get("created_at")?,
    })
}
