use chrono::NaiveTime;
use rust_decimal::Decimal;

use crate::models::{NewMaster, NewService};
use crate::repository::{MasterRepository, RepositoryError, ServiceRepository};

/// Наполняет пустой каталог стартовым набором услуг и мастеров.
/// Запускается при старте и ничего не делает, если услуги уже есть.
pub async fn seed_catalog(
    services: &ServiceRepository,
    masters: &MasterRepository,
) -> Result<(), RepositoryError> {
    if !services.is_empty().await? {
        log::info!("📦 Каталог уже заполнен, наполнение пропущено");
        return Ok(());
    }

    log::info!("📦 Каталог пуст, добавляем стартовые услуги и мастеров...");

    let mut service_ids_by_category: Vec<(String, Vec<i32>)> = Vec::new();

    for (category, items) in catalog() {
        let mut ids = Vec::new();
        for item in items {
            let created = services.create(&item).await?;
            ids.push(created.id);
        }
        log::info!("  ➕ {}: {} услуг", category, ids.len());
        service_ids_by_category.push((category.to_string(), ids));
    }

    for master in masters_roster(&service_ids_by_category) {
        if masters.get_by_telegram_id(master.telegram_id).await?.is_some() {
            log::info!("  ⏭️ мастер {} уже существует, пропускаем", master.name);
            continue;
        }
        let created = masters.create(&master).await?;
        log::info!("  ➕ мастер {} (#{})", created.name, created.id);
    }

    log::info!("✅ Каталог заполнен");
    Ok(())
}

fn rub(amount: i64) -> Decimal {
    Decimal::new(amount * 100, 2)
}

fn service(
    name: &str,
    description: &str,
    category: &str,
    subcategory: &str,
    price: Decimal,
    duration_minutes: i32,
) -> NewService {
    NewService {
        name: name.to_string(),
        description: Some(description.to_string()),
        category: category.to_string(),
        subcategory: Some(subcategory.to_string()),
        price,
        duration_minutes,
        is_active: true,
    }
}

fn catalog() -> Vec<(&'static str, Vec<NewService>)> {
    vec![
        (
            "hair_services",
            vec![
                service(
                    "✂️ Женская стрижка",
                    "Профессиональная женская стрижка с учетом типа лица и структуры волос. \
                     Включает мытье головы, стрижку и укладку.",
                    "hair_services",
                    "haircuts",
                    rub(1500),
                    60,
                ),
                service(
                    "✂️ Мужская стрижка",
                    "Стильная мужская стрижка любой сложности. Включает мытье головы, \
                     стрижку и укладку.",
                    "hair_services",
                    "haircuts",
                    rub(800),
                    45,
                ),
                service(
                    "🎨 Окрашивание в один тон",
                    "Равномерное окрашивание волос профессиональными красителями.",
                    "hair_services",
                    "coloring",
                    rub(3000),
                    120,
                ),
                service(
                    "💨 Праздничная укладка",
                    "Элегантная праздничная укладка для особых случаев.",
                    "hair_services",
                    "styling",
                    rub(1200),
                    60,
                ),
            ],
        ),
        (
            "cosmetology",
            vec![
                service(
                    "🧖‍♀️ Ультразвуковая чистка лица",
                    "Деликатная аппаратная чистка кожи лица без травмирования.",
                    "cosmetology",
                    "cleaning",
                    rub(2500),
                    60,
                ),
                service(
                    "💆‍♀️ Классический массаж лица",
                    "Расслабляющий массаж лица, улучшающий тонус кожи.",
                    "cosmetology",
                    "massage",
                    rub(1800),
                    45,
                ),
                service(
                    "🧪 Химический пилинг",
                    "Обновление кожи с помощью профессиональных кислотных составов.",
                    "cosmetology",
                    "peeling",
                    rub(3500),
                    50,
                ),
            ],
        ),
        (
            "nails_services",
            vec![
                service(
                    "💅 Классический маникюр",
                    "Обработка кутикулы, придание формы ногтям и уход за кожей рук.",
                    "nails_services",
                    "manicure",
                    rub(1000),
                    60,
                ),
                service(
                    "💅 Покрытие гель-лаком",
                    "Стойкое покрытие гель-лаком с выравниванием ногтевой пластины.",
                    "nails_services",
                    "coating",
                    rub(1400),
                    90,
                ),
                service(
                    "🦶 Аппаратный педикюр",
                    "Бережная аппаратная обработка стоп и ногтей.",
                    "nails_services",
                    "pedicure",
                    rub(1800),
                    75,
                ),
            ],
        ),
        (
            "hardware_services",
            vec![
                service(
                    "⚡ Лазерная эпиляция",
                    "Удаление нежелательных волос диодным лазером.",
                    "hardware_services",
                    "depilation",
                    rub(2000),
                    40,
                ),
                service(
                    "⚡ RF-лифтинг",
                    "Аппаратная подтяжка кожи радиоволновым методом.",
                    "hardware_services",
                    "lifting",
                    rub(4000),
                    60,
                ),
            ],
        ),
        (
            "makeup_services",
            vec![
                service(
                    "💄 Дневной макияж",
                    "Лёгкий естественный макияж на каждый день.",
                    "makeup_services",
                    "makeup",
                    rub(1500),
                    45,
                ),
                service(
                    "💄 Вечерний макияж",
                    "Выразительный макияж для торжественных мероприятий.",
                    "makeup_services",
                    "makeup",
                    rub(2500),
                    60,
                ),
                service(
                    "👰 Свадебный макияж",
                    "Стойкий свадебный макияж с предварительной репетицией образа.",
                    "makeup_services",
                    "makeup",
                    rub(4500),
                    90,
                ),
            ],
        ),
        (
            "brows_lashes_services",
            vec![
                service(
                    "👁️ Архитектура бровей",
                    "Моделирование формы бровей с коррекцией и окрашиванием.",
                    "brows_lashes_services",
                    "brows",
                    rub(1200),
                    45,
                ),
                service(
                    "👁️ Ламинирование ресниц",
                    "Завивка, питание и окрашивание натуральных ресниц.",
                    "brows_lashes_services",
                    "lashes",
                    rub(2000),
                    60,
                ),
            ],
        ),
        (
            "spa_services",
            vec![
                service(
                    "🧴 Общий массаж тела",
                    "Классический массаж всего тела для снятия напряжения.",
                    "spa_services",
                    "massage",
                    rub(3000),
                    90,
                ),
                service(
                    "🧴 Обертывание",
                    "SPA-обертывание с водорослями и уходовыми составами.",
                    "spa_services",
                    "body",
                    rub(2500),
                    60,
                ),
            ],
        ),
        (
            "kids_services",
            vec![
                service(
                    "👶 Детская стрижка",
                    "Детская стрижка в комфортной обстановке. Мастер найдет подход \
                     к каждому ребенку.",
                    "kids_services",
                    "haircuts",
                    rub(600),
                    30,
                ),
            ],
        ),
    ]
}

fn master(
    telegram_id: i64,
    username: &str,
    name: &str,
    phone: &str,
    specialization: &str,
    experience_years: i32,
    rating: Decimal,
    working_days: &str,
    service_ids: Vec<i32>,
) -> NewMaster {
    NewMaster {
        telegram_id,
        username: username.to_string(),
        name: name.to_string(),
        phone: Some(phone.to_string()),
        email: None,
        specialization: specialization.to_string(),
        experience_years,
        rating,
        is_active: true,
        working_hours_start: NaiveTime::from_hms_opt(10, 0, 0),
        working_hours_end: NaiveTime::from_hms_opt(20, 0, 0),
        working_days: Some(working_days.to_string()),
        service_ids,
    }
}

fn masters_roster(ids_by_category: &[(String, Vec<i32>)]) -> Vec<NewMaster> {
    let ids = |category: &str| -> Vec<i32> {
        ids_by_category
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default()
    };

    vec![
        master(
            900_001,
            "master_maria",
            "Мария Иванова",
            "+7-900-111-22-33",
            "hair_services",
            8,
            Decimal::new(49, 1),
            "1,2,3,4,5",
            ids("hair_services"),
        ),
        master(
            900_002,
            "master_olga",
            "Ольга Смирнова",
            "+7-900-222-33-44",
            "cosmetology",
            6,
            Decimal::new(47, 1),
            "2,3,4,5,6",
            ids("cosmetology"),
        ),
        master(
            900_003,
            "master_anna",
            "Анна Петрова",
            "+7-900-333-44-55",
            "nails_services",
            5,
            Decimal::new(48, 1),
            "1,3,5,6,7",
            ids("nails_services"),
        ),
        master(
            900_004,
            "master_elena",
            "Елена Козлова",
            "+7-900-444-55-66",
            "makeup_services",
            7,
            Decimal::new(50, 1),
            "1,2,4,5,6",
            [ids("makeup_services"), ids("brows_lashes_services")].concat(),
        ),
        master(
            900_005,
            "master_daria",
            "Дарья Волкова",
            "+7-900-555-66-77",
            "spa_services",
            4,
            Decimal::new(46, 1),
            "3,4,5,6,7",
            [ids("spa_services"), ids("hardware_services")].concat(),
        ),
        master(
            900_006,
            "master_sofia",
            "София Морозова",
            "+7-900-666-77-88",
            "kids_services",
            3,
            Decimal::new(48, 1),
            "6,7",
            [ids("kids_services"), ids("hair_services")].concat(),
        ),
    ]
}
