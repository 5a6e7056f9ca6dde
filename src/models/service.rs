use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Услуга каталога: цена и фиксированная длительность. Удаляется мягко.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
}

impl Service {
    /// "90" -> "1 ч 30 мин", "60" -> "1 ч", "45" -> "45 мин".
    pub fn duration_label(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;

        if hours > 0 && minutes > 0 {
            format!("{} ч {} мин", hours, minutes)
        } else if hours > 0 {
            format!("{} ч", hours)
        } else {
            format!("{} мин", minutes)
        }
    }
}
