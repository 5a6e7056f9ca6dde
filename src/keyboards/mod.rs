use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::models::{Master, Order, Service};
use crate::texts;

pub const ITEMS_PER_PAGE: usize = 8;

/// Срез элементов одной страницы.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = page * ITEMS_PER_PAGE;
    if start >= items.len() {
        return &[];
    }
    let end = (start + ITEMS_PER_PAGE).min(items.len());
    &items[start..end]
}

pub fn total_pages(total_items: usize) -> usize {
    if total_items == 0 {
        1
    } else {
        (total_items - 1) / ITEMS_PER_PAGE + 1
    }
}

/// Ряд навигации «⬅️ Пред | n/m | След ➡️». Крайние кнопки появляются
/// только когда есть куда листать; `page_callback` получает номер страницы.
fn navigation_row(
    page: usize,
    pages: usize,
    page_callback: impl Fn(usize) -> String,
) -> Vec<InlineKeyboardButton> {
    let mut row = Vec::new();

    if page > 0 {
        row.push(InlineKeyboardButton::callback(
            "⬅️ Пред",
            page_callback(page - 1),
        ));
    }

    row.push(InlineKeyboardButton::callback(
        format!("{}/{}", page + 1, pages),
        "current_page",
    ));

    if page + 1 < pages {
        row.push(InlineKeyboardButton::callback(
            "След ➡️",
            page_callback(page + 1),
        ));
    }

    row
}

fn back_button(callback: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback("🔙 Назад", callback.to_string())
}

pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🔍 Поиск услуг", "MAIN:SEARCH")],
        vec![InlineKeyboardButton::callback(
            "📂 Категории услуг",
            "MAIN:CATEGORY",
        )],
        vec![InlineKeyboardButton::callback("👥 Мастера", "MAIN:MASTERS")],
        vec![InlineKeyboardButton::callback(
            "📋 Мои записи",
            "MAIN:ORDERS",
        )],
        vec![InlineKeyboardButton::callback("ℹ️ О салоне", "MAIN:INFO")],
    ])
}

pub fn back_to_main_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔙 На главную",
        "back:main_menu",
    )]])
}

pub fn category_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = texts::CATEGORIES
        .iter()
        .map(|(key, title)| {
            vec![InlineKeyboardButton::callback(
                title.to_string(),
                format!("category:{}", key),
            )]
        })
        .collect();

    rows.push(vec![back_button("back:main_menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn cancel_search_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Отмена",
        "back:main_menu",
    )]])
}

/// Услуги категории, страницами по восемь.
pub fn services_page_keyboard(
    services: &[Service],
    category: &str,
    page: usize,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page_slice(services, page)
        .iter()
        .map(|service| {
            vec![InlineKeyboardButton::callback(
                format!("{} • {}₽", service.name, service.price),
                format!("service:{}", service.id),
            )]
        })
        .collect();

    let pages = total_pages(services.len());
    if pages > 1 {
        rows.push(navigation_row(page, pages, |p| {
            format!("page:{}:{}", category, p)
        }));
    }

    rows.push(vec![back_button("back:CHOOSE_SERVICE")]);
    InlineKeyboardMarkup::new(rows)
}

/// Карточка услуги: дальше либо выбор мастера, либо назад.
pub fn service_actions_keyboard(service_id: i32) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "👥 Выбрать мастера",
            format!("service_select:{}:MASTERS", service_id),
        )],
        vec![back_button("back:main_menu")],
    ])
}

pub fn masters_page_keyboard(masters: &[Master], page: usize) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page_slice(masters, page)
        .iter()
        .map(|master| {
            vec![InlineKeyboardButton::callback(
                format!(
                    "👤 {} - {}",
                    master.name,
                    texts::category_title(&master.specialization)
                ),
                format!("master_info:{}", master.id),
            )]
        })
        .collect();

    let pages = total_pages(masters.len());
    if pages > 1 {
        rows.push(navigation_row(page, pages, |p| format!("masters_page:{}", p)));
    }

    rows.push(vec![back_button("back:main_menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn master_services_keyboard(master_id: i32, services: &[Service]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = services
        .iter()
        .map(|service| {
            vec![InlineKeyboardButton::callback(
                format!("{} - {}₽", service.name, service.price),
                format!("master_service:{}:{}", master_id, service.id),
            )]
        })
        .collect();

    rows.push(vec![InlineKeyboardButton::callback(
        "📅 Расписание на сегодня",
        format!("master_schedule:{}", master_id),
    )]);
    rows.push(vec![InlineKeyboardButton::callback(
        "🔙 К списку мастеров",
        "back:masters_list",
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Выбор мастера под уже выбранную услугу: нажатие начинает оформление.
pub fn master_select_keyboard(masters: &[Master], service_id: i32) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = masters
        .iter()
        .map(|master| {
            vec![InlineKeyboardButton::callback(
                format!(
                    "👤 {} - {}",
                    master.name,
                    texts::category_title(&master.specialization)
                ),
                format!("ORDER:{}:{}", master.id, service_id),
            )]
        })
        .collect();

    rows.push(vec![back_button("back:main_menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn master_service_keyboard(master_id: i32, service_id: i32) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🗓️ Записаться",
            format!("ORDER:{}:{}", master_id, service_id),
        )],
        vec![InlineKeyboardButton::callback(
            "🔙 К услугам мастера",
            format!("master_info:{}", master_id),
        )],
    ])
}

/// Возврат из расписания к карточке мастера.
pub fn master_schedule_keyboard(master_id: i32) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🔙 К мастеру",
            format!("master_info:{}", master_id),
        )],
        vec![back_button("back:main_menu")],
    ])
}

pub fn search_results_keyboard(
    services: &[Service],
    query: &str,
    page: usize,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page_slice(services, page)
        .iter()
        .map(|service| {
            vec![InlineKeyboardButton::callback(
                format!("{} • {}₽", service.name, service.price),
                format!("service:{}", service.id),
            )]
        })
        .collect();

    let pages = total_pages(services.len());
    if pages > 1 {
        rows.push(navigation_row(page, pages, |p| {
            format!("search_page:{}:{}", query, p)
        }));
    }

    rows.push(vec![
        InlineKeyboardButton::callback("🔍 Новый поиск", "MAIN:SEARCH"),
        InlineKeyboardButton::callback("🔙 На главную", "back:main_menu"),
    ]);

    InlineKeyboardMarkup::new(rows)
}

pub fn nothing_found_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🔍 Новый поиск", "MAIN:SEARCH")],
        vec![InlineKeyboardButton::callback(
            "🔙 К категориям",
            "MAIN:CATEGORY",
        )],
    ])
}

pub fn my_orders_keyboard(orders: &[Order]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = orders
        .iter()
        .map(|order| {
            vec![InlineKeyboardButton::callback(
                texts::order_line(order),
                format!("order_info:{}", order.id),
            )]
        })
        .collect();

    rows.push(vec![back_button("back:main_menu")]);
    InlineKeyboardMarkup::new(rows)
}

pub fn order_info_keyboard(order_id: i32, cancellable: bool) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();

    if cancellable {
        rows.push(vec![InlineKeyboardButton::callback(
            "❌ Отменить запись",
            format!("order_cancel:{}", order_id),
        )]);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "🔙 К моим записям",
        "MAIN:ORDERS",
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Reply-клавиатура с кнопкой отправки контакта.
pub fn contact_request_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new("📱 Отправить номер телефона").request(ButtonRequest::Contact),
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_slice_respects_bounds() {
        let items: Vec<i32> = (0..17).collect();

        assert_eq!(page_slice(&items, 0), &items[0..8]);
        assert_eq!(page_slice(&items, 1), &items[8..16]);
        assert_eq!(page_slice(&items, 2), &items[16..17]);
        assert!(page_slice(&items, 3).is_empty());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(8), 1);
        assert_eq!(total_pages(9), 2);
        assert_eq!(total_pages(17), 3);
    }

    #[test]
    fn navigation_row_hides_edges() {
        // Первая страница: нет «Пред», есть счётчик и «След».
        let first = navigation_row(0, 3, |p| format!("page:hair_services:{}", p));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].text, "1/3");

        // Средняя страница: обе стрелки.
        let middle = navigation_row(1, 3, |p| format!("page:hair_services:{}", p));
        assert_eq!(middle.len(), 3);

        // Последняя страница: нет «След».
        let last = navigation_row(2, 3, |p| format!("page:hair_services:{}", p));
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].text, "3/3");
    }
}
