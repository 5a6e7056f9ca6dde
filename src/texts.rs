use chrono::Local;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{Master, Order, OrderStatistics, Service};

pub const START: &str = "👋 <b>Добро пожаловать в салон красоты!</b>\n\n\
    Здесь можно выбрать услугу, посмотреть мастеров и записаться \
    в пару нажатий.\n\n\
    📋 <b>Команды:</b>\n\
    /start – главное меню\n\
    /help – помощь\n\
    /myorders – мои записи\n\
    /stats – статистика салона";

pub const HELP: &str = "💈 <b>Помощь по боту</b>\n\n\
    /start – главное меню\n\
    /myorders – мои записи\n\
    /stats – статистика салона\n\n\
    <b>Как записаться:</b>\n\
    1. Выберите услугу через категории или поиск\n\
    2. Выберите мастера\n\
    3. Оставьте имя и телефон\n\n\
    Отменить запись можно в разделе «Мои записи».";

pub const INFO: &str = "ℹ️ <b>О салоне</b>\n\n\
    Салон красоты полного цикла: парикмахерские услуги, косметология, \
    ногтевой сервис, SPA и многое другое.\n\n\
    📍 Адрес: уточняйте у администратора\n\
    🕙 Ежедневно с 10:00 до 21:00";

pub const CHOOSE_CATEGORY: &str = "Выберите категорию услуг:";
pub const CHOOSE_MASTER: &str = "Выберите мастера, чтобы увидеть его информацию и услуги:";
pub const MAIN_MENU: &str = "Главное меню:";

pub const SEARCH_PROMPT: &str = "🔍 <b>Поиск услуг</b>\n\n\
    Введите название услуги, которую ищете:\n\n\
    <i>Например: стрижка, маникюр, массаж, окрашивание...</i>";

pub const SEARCH_TOO_SHORT: &str = "❌ Запрос слишком короткий. Введите минимум 2 символа.";

pub const ASK_NAME: &str = "Для оформления заказа, пожалуйста, введите ваше имя.";

pub const ASK_PHONE: &str = "Спасибо! Теперь, пожалуйста, отправьте ваш номер телефона. \
    Вы можете нажать на кнопку ниже, чтобы отправить его автоматически.";

pub const SLOT_TAKEN: &str = "😔 К сожалению, это время у мастера уже занято.\n\
    Попробуйте выбрать другого мастера или зайдите позже.";

pub const NO_ORDERS: &str = "У вас пока нет предстоящих записей.";

pub const GENERIC_ERROR: &str = "❌ Произошла ошибка. Попробуйте еще раз.";

/// Человекочитаемые названия категорий каталога, в порядке меню.
pub const CATEGORIES: [(&str, &str); 8] = [
    ("hair_services", "💇‍♀️ Парикмахерские услуги"),
    ("cosmetology", "💆‍♀️ Косметология"),
    ("nails_services", "💅 Услуги ногтевого сервиса"),
    ("hardware_services", "🔧 Аппаратные услуги"),
    ("makeup_services", "💄 Визаж и макияж"),
    ("brows_lashes_services", "👁️ Услуги для бровей и ресниц"),
    ("spa_services", "🧴 SPA процедуры"),
    ("kids_services", "👶 Детские услуги"),
];

pub fn category_title(key: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, title)| *title)
        .unwrap_or("Услуги")
}

pub fn service_card(service: &Service) -> String {
    format!(
        "✨ <b>{}</b>\n\n\
         📝 <i>{}</i>\n\n\
         💰 <b>Цена:</b> {} ₽\n\
         ⏱️ <b>Продолжительность:</b> {}\n\n\
         Что хотите сделать?",
        service.name,
        service.description.as_deref().unwrap_or(""),
        service.price,
        service.duration_label()
    )
}

pub fn master_card(master: &Master) -> String {
    let stars = "⭐".repeat(master.rating.trunc().to_u32().unwrap_or(0) as usize);

    let mut text = format!(
        "<b>Мастер: {}</b>\n\
         <i>Специализация:</i> {}\n\
         <i>Опыт:</i> {} лет\n\
         <i>Рейтинг:</i> {} ({}/5.0)\n\n",
        master.name,
        category_title(&master.specialization),
        master.experience_years,
        stars,
        master.rating
    );

    if let (Some(start), Some(end)) = (master.working_hours_start, master.working_hours_end) {
        text.push_str(&format!(
            "<b>График работы:</b>\n\
             <i>Часы:</i> {} - {}\n\
             <i>Дни:</i> {}\n\n",
            start.format("%H:%M"),
            end.format("%H:%M"),
            master.working_days_label()
        ));
    }

    if let Some(phone) = &master.phone {
        text.push_str(&format!("<i>Телефон:</i> {}\n", phone));
    }
    if let Some(email) = &master.email {
        text.push_str(&format!("<i>Email:</i> {}\n", email));
    }

    text
}

pub fn master_service_card(master: &Master, service: &Service) -> String {
    format!(
        "<b>{}</b>\n\n\
         {}\n\n\
         <b>Цена:</b> {}₽\n\
         <b>Длительность:</b> {}\n\n\
         <b>Мастер:</b> {}",
        service.name,
        service.description.as_deref().unwrap_or(""),
        service.price,
        service.duration_label(),
        master.name
    )
}

pub fn order_confirmation(order: &Order, master_name: &str, service_name: &str) -> String {
    format!(
        "✅ <b>Запись оформлена!</b>\n\n\
         📋 <b>Заказ №{}</b>\n\
         👤 <b>Мастер:</b> {}\n\
         💈 <b>Услуга:</b> {}\n\
         💰 <b>Стоимость:</b> {} ₽\n\
         ⏱️ <b>Длительность:</b> {} мин\n\
         📅 <b>Время:</b> {}\n\n\
         Мастер свяжется с вами для подтверждения.",
        order.id,
        master_name,
        service_name,
        order.total_price,
        order.duration_minutes,
        order
            .appointment_datetime
            .with_timezone(&Local)
            .format("%d.%m.%Y в %H:%M")
    )
}

pub fn order_line(order: &Order) -> String {
    format!(
        "📋 Заказ №{} • {} • {}",
        order.id,
        order
            .appointment_datetime
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M"),
        order.status.label()
    )
}

pub fn order_details(order: &Order, master_name: &str, service_name: &str) -> String {
    let mut text = format!(
        "📋 <b>Заказ №{}</b>\n\n\
         👤 <b>Мастер:</b> {}\n\
         💈 <b>Услуга:</b> {}\n\
         💰 <b>Стоимость:</b> {} ₽\n\
         ⏱️ <b>Длительность:</b> {} мин\n\
         📅 <b>Время:</b> {}\n\
         <b>Статус:</b> {}",
        order.id,
        master_name,
        service_name,
        order.total_price,
        order.duration_minutes,
        order
            .appointment_datetime
            .with_timezone(&Local)
            .format("%d.%m.%Y в %H:%M"),
        order.status.label()
    );

    if let Some(notes) = &order.notes {
        text.push_str(&format!("\n📝 <i>{}</i>", notes));
    }

    text
}

pub fn statistics_report(stats: &OrderStatistics) -> String {
    format!(
        "📊 <b>Статистика салона</b>\n\n\
         Всего заказов: <b>{}</b>\n\
         Завершено: <b>{}</b>\n\
         Отменено: <b>{}</b>\n\
         Неявки: <b>{}</b>\n\n\
         💰 Выручка: <b>{} ₽</b>\n\
         🧾 Средний чек: <b>{} ₽</b>\n\
         ✅ Доля завершённых: <b>{:.1}%</b>",
        stats.total_orders,
        stats.completed_orders,
        stats.cancelled_orders,
        stats.no_show_orders,
        stats.total_revenue,
        stats.avg_order_value,
        stats.completion_rate
    )
}

pub fn search_results_header(query: &str, found: usize, page: usize) -> String {
    if page == 0 {
        format!(
            "🔍 <b>Результаты поиска по запросу:</b> \"{}\"\n\nНайдено услуг: <b>{}</b>",
            query, found
        )
    } else {
        format!(
            "🔍 <b>Результаты поиска по запросу:</b> \"{}\"\n\n\
             Найдено услуг: <b>{}</b> (стр. {})",
            query,
            found,
            page + 1
        )
    }
}

pub fn search_nothing_found(query: &str) -> String {
    format!(
        "😔 <b>По запросу \"{}\" ничего не найдено</b>\n\n\
         Попробуйте:\n\
         • Изменить запрос\n\
         • Использовать другие ключевые слова\n\
         • Выбрать услугу из категорий",
        query
    )
}
