use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Мастер салона. Удаляется мягко, флагом `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    pub id: i32,
    pub telegram_id: i64,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialization: String,
    pub experience_years: i32,
    pub rating: Decimal,
    pub is_active: bool,
    pub working_hours_start: Option<NaiveTime>,
    pub working_hours_end: Option<NaiveTime>,
    /// Рабочие дни недели, "1,2,3,4,5" (1 — понедельник).
    pub working_days: Option<String>,
    pub service_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaster {
    pub telegram_id: i64,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialization: String,
    pub experience_years: i32,
    pub rating: Decimal,
    pub is_active: bool,
    pub working_hours_start: Option<NaiveTime>,
    pub working_hours_end: Option<NaiveTime>,
    pub working_days: Option<String>,
    pub service_ids: Vec<i32>,
}

impl Master {
    /// "1,2,3,4,5" -> "ПН, ВТ, СР, ЧТ, ПТ". Незнакомые номера пропускаются.
    pub fn working_days_label(&self) -> String {
        let Some(days) = self.working_days.as_deref() else {
            return String::new();
        };

        days.split(',')
            .filter_map(|d| match d.trim() {
                "1" => Some("ПН"),
                "2" => Some("ВТ"),
                "3" => Some("СР"),
                "4" => Some("ЧТ"),
                "5" => Some("ПТ"),
                "6" => Some("СБ"),
                "7" => Some("ВС"),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn working_days_label_maps_day_numbers() {
        let master = Master {
            id: 1,
            telegram_id: 1001,
            username: "master_1".to_string(),
            name: "Мария Иванова".to_string(),
            phone: None,
            email: None,
            specialization: "hair_services".to_string(),
            experience_years: 5,
            rating: dec!(4.8),
            is_active: true,
            working_hours_start: None,
            working_hours_end: None,
            working_days: Some("1,3,5,9".to_string()),
            service_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(master.working_days_label(), "ПН, СР, ПТ");
    }
}
