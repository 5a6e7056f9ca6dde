use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Клиент салона: контактный профиль, который диалог бронирования
/// заполняет и переиспользует при повторных записях.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub telegram_id: i64,
    pub username: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Данные нового клиента до вставки в БД.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub telegram_id: i64,
    pub username: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Customer {
    /// Достаточно ли профиля, чтобы оформить заказ без вопросов.
    pub fn has_full_contact(&self) -> bool {
        self.name.as_deref().map_or(false, |n| !n.is_empty())
            && self.phone.as_deref().map_or(false, |p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer(name: Option<&str>, phone: Option<&str>) -> Customer {
        let now = Utc::now();
        Customer {
            id: 1,
            telegram_id: 100,
            username: "anna".to_string(),
            name: name.map(str::to_string),
            address: None,
            phone: phone.map(str::to_string),
            email: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_contact_needs_both_fields() {
        assert!(customer(Some("Анна"), Some("+79123456789")).has_full_contact());
        assert!(!customer(Some("Анна"), None).has_full_contact());
        assert!(!customer(None, Some("+79123456789")).has_full_contact());
        assert!(!customer(None, None).has_full_contact());
    }

    #[test]
    fn empty_strings_do_not_count_as_contact() {
        // Пустая строка в профиле не должна пускать на короткий путь
        // оформления без вопросов.
        assert!(!customer(Some(""), Some("+79123456789")).has_full_contact());
        assert!(!customer(Some("Анна"), Some("")).has_full_contact());
        assert!(!customer(Some(""), Some("")).has_full_contact());
    }
}
