use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Статус заказа. Хранится в БД строковым тегом в нижнем регистре.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "no_show" => Some(OrderStatus::NoShow),
            _ => None,
        }
    }

    /// Занимает ли заказ с таким статусом слот в расписании мастера.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled | OrderStatus::NoShow)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "⏳ Ожидает подтверждения",
            OrderStatus::Confirmed => "✅ Подтверждён",
            OrderStatus::InProgress => "💈 Выполняется",
            OrderStatus::Completed => "🏁 Завершён",
            OrderStatus::Cancelled => "❌ Отменён",
            OrderStatus::NoShow => "🚫 Клиент не пришёл",
        }
    }
}

/// Заказ (запись к мастеру). Цена, длительность и контакты клиента
/// копируются в заказ в момент создания и дальше не пересчитываются.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub master_id: i32,
    pub service_id: i32,
    pub appointment_datetime: DateTime<Utc>,
    pub duration_minutes: i32,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Данные нового заказа до вставки в БД (id и метки времени назначает БД).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub master_id: i32,
    pub service_id: i32,
    pub appointment_datetime: DateTime<Utc>,
    pub duration_minutes: i32,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
}

impl Order {
    /// Конец слота: полуоткрытый интервал [начало, начало + длительность).
    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.appointment_datetime + Duration::minutes(self.duration_minutes as i64)
    }

    /// Пересекается ли слот заказа с кандидатом [new_start, new_end).
    ///
    /// Три случая:
    /// 1. новый слот начинается во время существующего;
    /// 2. новый слот заканчивается во время существующего;
    /// 3. новый слот полностью охватывает существующий.
    ///
    /// Записи «впритык» (конец одной совпадает с началом другой)
    /// пересечением не считаются.
    pub fn conflicts_with(&self, new_start: DateTime<Utc>, new_end: DateTime<Utc>) -> bool {
        let start = self.appointment_datetime;
        let end = self.end_datetime();

        (start <= new_start && end > new_start)
            || (start < new_end && end >= new_end)
            || (new_start <= start && new_end >= end)
    }
}

/// Свободен ли у мастера слот [new_start, new_start + duration) среди `orders`.
/// Отменённые записи и неявки слот не занимают; `exclude_order_id`
/// исключает сам заказ при переносе.
pub fn slot_is_free(
    orders: &[Order],
    new_start: DateTime<Utc>,
    duration_minutes: i32,
    exclude_order_id: Option<i32>,
) -> bool {
    let new_end = new_start + Duration::minutes(duration_minutes as i64);

    !orders.iter().any(|order| {
        if exclude_order_id == Some(order.id) {
            return false;
        }
        order.status.blocks_schedule() && order.conflicts_with(new_start, new_end)
    })
}

/// Агрегированная статистика по заказам.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub no_show_orders: u64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
    pub completion_rate: f64,
}

impl OrderStatistics {
    /// Считает статистику по набору заказов. Выручка и средний чек —
    /// только по завершённым заказам.
    pub fn from_orders(orders: &[Order]) -> Self {
        let total_orders = orders.len() as u64;
        let mut completed_orders = 0u64;
        let mut cancelled_orders = 0u64;
        let mut no_show_orders = 0u64;
        let mut total_revenue = Decimal::ZERO;

        for order in orders {
            match order.status {
                OrderStatus::Completed => {
                    completed_orders += 1;
                    total_revenue += order.total_price;
                }
                OrderStatus::Cancelled => cancelled_orders += 1,
                OrderStatus::NoShow => no_show_orders += 1,
                _ => {}
            }
        }

        let avg_order_value = if completed_orders > 0 {
            total_revenue / Decimal::from(completed_orders)
        } else {
            Decimal::ZERO
        };

        let completion_rate = if total_orders > 0 {
            completed_orders as f64 / total_orders as f64 * 100.0
        } else {
            0.0
        };

        OrderStatistics {
            total_orders,
            completed_orders,
            cancelled_orders,
            no_show_orders,
            total_revenue,
            avg_order_value,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn order(id: i32, start: DateTime<Utc>, duration: i32, status: OrderStatus) -> Order {
        Order {
            id,
            user_id: 1,
            master_id: 1,
            service_id: 1,
            appointment_datetime: start,
            duration_minutes: duration,
            total_price: dec!(1500.00),
            status,
            notes: None,
            client_name: Some("Анна".to_string()),
            client_phone: Some("+79123456789".to_string()),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn new_start_inside_existing_conflicts() {
        // Существующая запись 10:00–11:00, кандидат 10:30–11:00.
        let existing = vec![order(1, at(10, 0), 60, OrderStatus::Pending)];
        assert!(!slot_is_free(&existing, at(10, 30), 30, None));
    }

    #[test]
    fn new_end_inside_existing_conflicts() {
        // Кандидат 09:30–11:00 заканчивается ровно концом существующей.
        let existing = vec![order(1, at(10, 0), 60, OrderStatus::Confirmed)];
        assert!(!slot_is_free(&existing, at(9, 30), 90, None));
    }

    #[test]
    fn new_interval_covering_existing_conflicts() {
        let existing = vec![order(1, at(10, 0), 60, OrderStatus::Pending)];
        assert!(!slot_is_free(&existing, at(9, 0), 180, None));
    }

    #[test]
    fn back_to_back_slots_are_allowed() {
        let existing = vec![order(1, at(10, 0), 60, OrderStatus::Pending)];
        // Кандидат начинается ровно в конце существующей записи.
        assert!(slot_is_free(&existing, at(11, 0), 30, None));
        // Кандидат заканчивается ровно в начале существующей записи.
        assert!(slot_is_free(&existing, at(9, 30), 30, None));
    }

    #[test]
    fn cancelled_and_no_show_do_not_block() {
        let existing = vec![
            order(1, at(10, 0), 60, OrderStatus::Cancelled),
            order(2, at(10, 0), 60, OrderStatus::NoShow),
        ];
        assert!(slot_is_free(&existing, at(10, 30), 30, None));
    }

    #[test]
    fn excluded_order_is_ignored() {
        let existing = vec![order(7, at(10, 0), 60, OrderStatus::Confirmed)];
        assert!(!slot_is_free(&existing, at(10, 0), 60, None));
        // При переносе заказа 7 его собственный слот не мешает.
        assert!(slot_is_free(&existing, at(10, 0), 60, Some(7)));
        // Но чужой заказ по-прежнему учитывается.
        assert!(!slot_is_free(&existing, at(10, 0), 60, Some(8)));
    }

    #[test]
    fn only_active_statuses_block_schedule() {
        // На это опирается обновление заказа: правка отменённой записи
        // или неявки не требует свободного слота.
        assert!(OrderStatus::Pending.blocks_schedule());
        assert!(OrderStatus::Confirmed.blocks_schedule());
        assert!(OrderStatus::InProgress.blocks_schedule());
        assert!(OrderStatus::Completed.blocks_schedule());
        assert!(!OrderStatus::Cancelled.blocks_schedule());
        assert!(!OrderStatus::NoShow.blocks_schedule());
    }

    #[test]
    fn status_tags_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::NoShow,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("paid"), None);
    }

    #[test]
    fn statistics_over_known_orders() {
        let mut orders = vec![
            order(1, at(10, 0), 60, OrderStatus::Completed),
            order(2, at(12, 0), 60, OrderStatus::Completed),
            order(3, at(14, 0), 60, OrderStatus::Cancelled),
            order(4, at(16, 0), 60, OrderStatus::NoShow),
            order(5, at(18, 0), 60, OrderStatus::Pending),
        ];
        orders[1].total_price = dec!(2500.00);

        let stats = OrderStatistics::from_orders(&orders);
        assert_eq!(stats.total_orders, 5);
        assert_eq!(stats.completed_orders, 2);
        assert_eq!(stats.cancelled_orders, 1);
        assert_eq!(stats.no_show_orders, 1);
        assert_eq!(stats.total_revenue, dec!(4000.00));
        assert_eq!(stats.avg_order_value, dec!(2000.00));
        assert!((stats.completion_rate - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn statistics_over_empty_set() {
        let stats = OrderStatistics::from_orders(&[]);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.completion_rate, 0.0);
    }
}
