use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::{slot_is_free, NewOrder, Order, OrderStatistics, OrderStatus};
use crate::repository::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, master_id, service_id, appointment_datetime, \
     duration_minutes, total_price, status, notes, client_name, client_phone, \
     created_at, updated_at";

/// Хранилище заказов. Проверка пересечения слотов и агрегация статистики
/// выполняются в Rust по выбранным строкам, SQL только достаёт данные.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        OrderRepository { pool }
    }

    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO orders (user_id, master_id, service_id, appointment_datetime, \
             duration_minutes, total_price, status, notes, client_name, client_phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(order.master_id)
        .bind(order.service_id)
        .bind(order.appointment_datetime)
        .bind(order.duration_minutes)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(&order.notes)
        .bind(&order.client_name)
        .bind(&order.client_phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при создании заказа: {}", e);
            e
        })?;

        let created = row_to_order(&row)?;
        log::info!(
            "📝 Создан заказ #{} (мастер {}, услуга {})",
            created.id,
            created.master_id,
            created.service_id
        );
        Ok(created)
    }

    pub async fn get_by_id(&self, order_id: i32) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении заказа {}: {}", order_id, e);
            e
        })?;

        row.as_ref().map(row_to_order).transpose()
    }

    pub async fn get_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY appointment_datetime DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении списка заказов: {}", e);
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    pub async fn get_by_user_id(&self, user_id: i32) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY appointment_datetime DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении заказов клиента {}: {}", user_id, e);
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    pub async fn get_by_master_id(&self, master_id: i32) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE master_id = $1 \
             ORDER BY appointment_datetime DESC"
        ))
        .bind(master_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при получении заказов мастера {}: {}",
                master_id,
                e
            );
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    pub async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 \
             ORDER BY appointment_datetime ASC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при получении заказов со статусом {}: {}",
                status.as_str(),
                e
            );
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE appointment_datetime >= $1 AND appointment_datetime <= $2 \
             ORDER BY appointment_datetime ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении заказов за период: {}", e);
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    /// Заказы на сегодня по локальному времени сервера.
    pub async fn get_today_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let today = Local::now().date_naive();
        let (start, end) = local_day_bounds(today);
        self.get_by_date_range(start, end).await
    }

    /// Будущие заказы клиента, которые ещё состоятся: только pending и confirmed.
    pub async fn get_upcoming_orders(&self, user_id: i32) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND appointment_datetime > CURRENT_TIMESTAMP \
             AND status IN ('pending', 'confirmed') \
             ORDER BY appointment_datetime ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при получении предстоящих заказов клиента {}: {}",
                user_id,
                e
            );
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    /// Полное обновление заказа. Перед записью заново проверяет, что слот
    /// мастера свободен (сам переносимый заказ из проверки исключается).
    /// Отменённые записи и неявки слот не занимают, их можно править,
    /// даже если время уже перебронировано.
    pub async fn update(&self, order: &Order) -> Result<Order, RepositoryError> {
        if order.status.blocks_schedule() {
            let free = self
                .check_master_availability(
                    order.master_id,
                    order.appointment_datetime,
                    order.duration_minutes,
                    Some(order.id),
                )
                .await?;

            if !free {
                log::warn!(
                    "⚠️ Перенос заказа #{} отклонён: слот {} у мастера {} занят",
                    order.id,
                    order.appointment_datetime,
                    order.master_id
                );
                return Err(RepositoryError::SlotConflict {
                    master_id: order.master_id,
                    appointment_datetime: order.appointment_datetime,
                });
            }
        }

        let row = sqlx::query(&format!(
            "UPDATE orders SET user_id = $2, master_id = $3, service_id = $4, \
             appointment_datetime = $5, duration_minutes = $6, total_price = $7, \
             status = $8, notes = $9, client_name = $10, client_phone = $11 \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.master_id)
        .bind(order.service_id)
        .bind(order.appointment_datetime)
        .bind(order.duration_minutes)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .bind(&order.notes)
        .bind(&order.client_name)
        .bind(&order.client_phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при обновлении заказа {}: {}", order.id, e);
            e
        })?;

        // Заказ мог быть удалён параллельно; возвращаем входные данные как есть.
        match row {
            Some(row) => row_to_order(&row),
            None => Ok(order.clone()),
        }
    }

    pub async fn update_status(
        &self,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(
                    "❌ Ошибка при смене статуса заказа {} на {}: {}",
                    order_id,
                    status.as_str(),
                    e
                );
                e
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Заказы удаляются жёстко, в отличие от мастеров и услуг.
    pub async fn delete(&self, order_id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при удалении заказа {}: {}", order_id, e);
                e
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Свободен ли у мастера слот [начало, начало + длительность).
    /// Отменённые записи и неявки слот не занимают.
    pub async fn check_master_availability(
        &self,
        master_id: i32,
        appointment_datetime: DateTime<Utc>,
        duration_minutes: i32,
        exclude_order_id: Option<i32>,
    ) -> Result<bool, RepositoryError> {
        let orders = self.active_orders_of_master(master_id).await?;
        Ok(slot_is_free(
            &orders,
            appointment_datetime,
            duration_minutes,
            exclude_order_id,
        ))
    }

    /// Активные записи мастера на день, по возрастанию времени.
    pub async fn get_master_schedule(
        &self,
        master_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<Order>, RepositoryError> {
        let (start, end) = local_day_bounds(date);

        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE master_id = $1 AND appointment_datetime >= $2 \
             AND appointment_datetime <= $3 \
             AND status NOT IN ('cancelled', 'no_show') \
             ORDER BY appointment_datetime ASC"
        ))
        .bind(master_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при получении расписания мастера {} на {}: {}",
                master_id,
                date,
                e
            );
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }

    /// Занятые интервалы мастера на день парами (начало, конец).
    pub async fn get_master_busy_times(
        &self,
        master_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, RepositoryError> {
        let schedule = self.get_master_schedule(master_id, date).await?;
        Ok(schedule
            .iter()
            .map(|order| (order.appointment_datetime, order.end_datetime()))
            .collect())
    }

    /// Статистика по заказам, созданным в окне [start, end]. `None` с любой
    /// стороны оставляет окно открытым.
    pub async fn get_statistics(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<OrderStatistics, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
             AND ($2::timestamptz IS NULL OR created_at <= $2)"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при подсчёте статистики заказов: {}", e);
            e
        })?;

        let orders = rows
            .iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderStatistics::from_orders(&orders))
    }

    async fn active_orders_of_master(
        &self,
        master_id: i32,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE master_id = $1 AND status NOT IN ('cancelled', 'no_show')"
        ))
        .bind(master_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при проверке занятости мастера {}: {}",
                master_id,
                e
            );
            e
        })?;

        rows.iter().map(row_to_order).collect()
    }
}

fn row_to_order(row: &PgRow) -> Result<Order, RepositoryError> {
    let status_tag: String = row.try_get("status")?;
    let status =
        OrderStatus::parse(&status_tag).ok_or(RepositoryError::UnknownStatus(status_tag))?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        master_id: row.try_get("master_id")?,
        service_id: row.try_get("service_id")?,
        appointment_datetime: row.try_get("appointment_datetime")?,
        duration_minutes: row.try_get("duration_minutes")?,
        total_price: row.try_get("total_price")?,
        status,
        notes: row.try_get("notes")?,
        client_name: row.try_get("client_name")?,
        client_phone: row.try_get("client_phone")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Границы локальных суток [00:00:00, 23:59:59.999999] в UTC.
fn local_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1) - Duration::microseconds(1);
    (local_to_utc(start), local_to_utc(end))
}

fn local_to_utc(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // На переводах часов берём ранний вариант, несуществующее
        // время трактуем как UTC.
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}
