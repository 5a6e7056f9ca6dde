pub mod customers;
pub mod masters;
pub mod orders;
pub mod services;
pub mod users;

pub use customers::CustomerRepository;
pub use masters::MasterRepository;
pub use orders::OrderRepository;
pub use services::ServiceRepository;
pub use users::UserRepository;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Ошибки слоя хранения. Логируются на месте возникновения с контекстом
/// операции и пробрасываются наверх без преобразования.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("ошибка базы данных: {0}")]
    Database(#[from] sqlx::Error),

    #[error("неизвестный статус заказа в БД: {0}")]
    UnknownStatus(String),

    /// Обновление заказа нарушило бы запрет пересечения слотов мастера.
    #[error("у мастера {master_id} занято время {appointment_datetime}")]
    SlotConflict {
        master_id: i32,
        appointment_datetime: DateTime<Utc>,
    },
}
