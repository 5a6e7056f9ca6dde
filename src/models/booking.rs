use serde::{Deserialize, Serialize};

/// Шаг диалога бронирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStage {
    AwaitingName,
    AwaitingPhone,
}

/// Причина отказа при проверке ввода клиента. Обрабатывается локально
/// повторным запросом, наружу как ошибка не поднимается.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NameTooShort,
    InvalidPhone,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NameTooShort => {
                "Имя должно содержать не менее 2 символов. Пожалуйста, попробуйте еще раз."
            }
            ValidationError::InvalidPhone => "Пожалуйста, введите корректный номер телефона.",
        }
    }
}

/// Временные данные диалога бронирования одного чата: выбранная пара
/// мастер+услуга и собранные контакты. Живут только в памяти и
/// очищаются после создания заказа.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSession {
    pub master_id: i32,
    pub service_id: i32,
    pub telegram_user_id: i64,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub stage: BookingStage,
}

impl BookingSession {
    pub fn new(master_id: i32, service_id: i32, telegram_user_id: i64) -> Self {
        BookingSession {
            master_id,
            service_id,
            telegram_user_id,
            client_name: None,
            client_phone: None,
            stage: BookingStage::AwaitingName,
        }
    }

    /// Принимает имя клиента и переводит диалог к запросу телефона.
    /// При слишком коротком имени состояние не меняется.
    pub fn submit_name(&mut self, raw: &str) -> Result<(), ValidationError> {
        let name = raw.trim();
        if name.chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        self.client_name = Some(name.to_string());
        self.stage = BookingStage::AwaitingPhone;
        Ok(())
    }

    /// Принимает телефон, введённый текстом. Номер из карточки контакта
    /// Telegram проверок не проходит — см. `submit_contact`.
    pub fn submit_phone_text(&mut self, raw: &str) -> Result<(), ValidationError> {
        let phone = raw.trim();
        if !is_valid_phone(phone) {
            return Err(ValidationError::InvalidPhone);
        }
        self.client_phone = Some(phone.to_string());
        Ok(())
    }

    /// Принимает номер из карточки контакта как есть.
    pub fn submit_contact(&mut self, phone_number: &str) {
        self.client_phone = Some(phone_number.to_string());
    }
}

/// Проверка телефона: после отбрасывания символов `+ - ( )` должны
/// остаться только цифры, не меньше десяти.
pub fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '(' | ')'))
        .collect();

    stripped.len() >= 10 && stripped.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_char_name_is_rejected() {
        let mut session = BookingSession::new(1, 2, 100);
        assert_eq!(session.submit_name("A"), Err(ValidationError::NameTooShort));
        assert_eq!(session.stage, BookingStage::AwaitingName);
        assert_eq!(session.client_name, None);
    }

    #[test]
    fn valid_name_moves_to_phone_stage() {
        let mut session = BookingSession::new(1, 2, 100);
        assert_eq!(session.submit_name("  Ann  "), Ok(()));
        assert_eq!(session.stage, BookingStage::AwaitingPhone);
        assert_eq!(session.client_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn short_phone_is_rejected() {
        let mut session = BookingSession::new(1, 2, 100);
        session.submit_name("Анна").unwrap();
        assert_eq!(
            session.submit_phone_text("12345"),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(session.client_phone, None);
    }

    #[test]
    fn formatted_phone_is_accepted() {
        let mut session = BookingSession::new(1, 2, 100);
        session.submit_name("Анна").unwrap();
        assert_eq!(session.submit_phone_text("+7-912-345-6789"), Ok(()));
        assert_eq!(session.client_phone.as_deref(), Some("+7-912-345-6789"));
    }

    #[test]
    fn phone_with_letters_is_rejected() {
        assert!(!is_valid_phone("+7-912-CALL-NOW"));
        assert!(!is_valid_phone("79123456a89"));
    }

    #[test]
    fn contact_card_is_accepted_as_is() {
        let mut session = BookingSession::new(1, 2, 100);
        session.submit_name("Анна").unwrap();
        session.submit_contact("79123456789");
        assert_eq!(session.client_phone.as_deref(), Some("79123456789"));
    }
}
