use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::{NewService, Service};
use crate::repository::RepositoryError;

const SERVICE_COLUMNS: &str = "id, name, description, category, subcategory, price, \
     duration_minutes, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        ServiceRepository { pool }
    }

    pub async fn create(&self, service: &NewService) -> Result<Service, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO services (name, description, category, subcategory, price, \
             duration_minutes, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.category)
        .bind(&service.subcategory)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при создании услуги: {}", e);
            e
        })?;

        row_to_service(&row)
    }

    pub async fn get_by_id(&self, service_id: i32) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении услуги {}: {}", service_id, e);
            e
        })?;

        row.as_ref().map(row_to_service).transpose()
    }

    pub async fn get_all_active(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active = TRUE \
             ORDER BY category ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении списка услуг: {}", e);
            e
        })?;

        rows.iter().map(row_to_service).collect()
    }

    pub async fn get_by_category(&self, category: &str) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE is_active = TRUE AND category = $1 ORDER BY name ASC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении услуг категории {}: {}", category, e);
            e
        })?;

        rows.iter().map(row_to_service).collect()
    }

    /// Активные услуги, которые оказывает мастер.
    pub async fn get_by_master_id(&self, master_id: i32) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE is_active = TRUE AND id IN \
             (SELECT service_id FROM master_services WHERE master_id = $1) \
             ORDER BY name ASC"
        ))
        .bind(master_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении услуг мастера {}: {}", master_id, e);
            e
        })?;

        rows.iter().map(row_to_service).collect()
    }

    /// Поиск по подстроке описания без учёта регистра.
    pub async fn search_by_description(&self, query: &str) -> Result<Vec<Service>, RepositoryError> {
        let pattern = like_pattern(query);

        let rows = sqlx::query(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services \
             WHERE is_active = TRUE AND description ILIKE $1 ORDER BY name ASC"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при поиске услуг по «{}»: {}", query, e);
            e
        })?;

        rows.iter().map(row_to_service).collect()
    }

    pub async fn update(&self, service: &Service) -> Result<Service, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE services SET name = $2, description = $3, category = $4, \
             subcategory = $5, price = $6, duration_minutes = $7, is_active = $8 \
             WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.category)
        .bind(&service.subcategory)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при обновлении услуги {}: {}", service.id, e);
            e
        })?;

        row_to_service(&row)
    }

    /// Пуст ли каталог. По этому признаку запускается наполнение при старте.
    pub async fn is_empty(&self) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM services")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при подсчёте услуг: {}", e);
                e
            })?;

        let total: i64 = row.try_get("total")?;
        Ok(total == 0)
    }

    /// Мягкое удаление: услуга скрывается из каталога.
    pub async fn deactivate(&self, service_id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE services SET is_active = FALSE WHERE id = $1")
            .bind(service_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при деактивации услуги {}: {}", service_id, e);
                e
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Шаблон для ILIKE: запрос ищется как буквальная подстрока,
/// `%`, `_` и `\` в пользовательском тексте экранируются.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn row_to_service(row: &PgRow) -> Result<Service, RepositoryError> {
    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        subcategory: row.try_get("subcategory")?,
        price: row.try_get("price")?,
        duration_minutes: row.try_get("duration_minutes")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn query_is_matched_literally() {
        assert_eq!(like_pattern("стрижка"), "%стрижка%");
        assert_eq!(like_pattern("  лазер  "), "%лазер%");
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        // «%» в запросе не должен превращаться в «найти всё».
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("gel_lak"), "%gel\\_lak%");
        assert_eq!(like_pattern(r"a\b"), "%a\\\\b%");
    }
}
