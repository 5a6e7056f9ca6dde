use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::{Master, NewMaster};
use crate::repository::RepositoryError;

// Привязки к услугам собираются агрегатом в каждом запросе,
// отдельного похода за master_services не нужно.
const MASTER_SELECT: &str = "SELECT m.id, m.telegram_id, m.username, m.name, m.phone, \
     m.email, m.specialization, m.experience_years, m.rating, m.is_active, \
     m.working_hours_start, m.working_hours_end, m.working_days, \
     m.created_at, m.updated_at, \
     COALESCE(array_agg(ms.service_id) FILTER (WHERE ms.service_id IS NOT NULL), '{}') \
         AS service_ids \
     FROM masters m \
     LEFT JOIN master_services ms ON ms.master_id = m.id";

#[derive(Clone)]
pub struct MasterRepository {
    pool: PgPool,
}

impl MasterRepository {
    pub fn new(pool: PgPool) -> Self {
        MasterRepository { pool }
    }

    pub async fn create(&self, master: &NewMaster) -> Result<Master, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO masters (telegram_id, username, name, phone, email, \
             specialization, experience_years, rating, is_active, \
             working_hours_start, working_hours_end, working_days) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(master.telegram_id)
        .bind(&master.username)
        .bind(&master.name)
        .bind(&master.phone)
        .bind(&master.email)
        .bind(&master.specialization)
        .bind(master.experience_years)
        .bind(master.rating)
        .bind(master.is_active)
        .bind(master.working_hours_start)
        .bind(master.working_hours_end)
        .bind(&master.working_days)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при создании мастера: {}", e);
            e
        })?;

        let master_id: i32 = row.try_get("id")?;

        for service_id in &master.service_ids {
            self.link_service(master_id, *service_id).await?;
        }

        match self.get_by_id(master_id).await? {
            Some(created) => Ok(created),
            None => Err(RepositoryError::Database(sqlx::Error::RowNotFound)),
        }
    }

    pub async fn get_by_id(&self, master_id: i32) -> Result<Option<Master>, RepositoryError> {
        let row = sqlx::query(&format!("{MASTER_SELECT} WHERE m.id = $1 GROUP BY m.id"))
            .bind(master_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при получении мастера {}: {}", master_id, e);
                e
            })?;

        row.as_ref().map(row_to_master).transpose()
    }

    pub async fn get_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<Master>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{MASTER_SELECT} WHERE m.telegram_id = $1 GROUP BY m.id"
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при поиске мастера по telegram_id {}: {}",
                telegram_id,
                e
            );
            e
        })?;

        row.as_ref().map(row_to_master).transpose()
    }

    pub async fn get_all(&self) -> Result<Vec<Master>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{MASTER_SELECT} GROUP BY m.id ORDER BY m.name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении всех мастеров: {}", e);
            e
        })?;

        rows.iter().map(row_to_master).collect()
    }

    pub async fn get_all_active(&self) -> Result<Vec<Master>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{MASTER_SELECT} WHERE m.is_active = TRUE GROUP BY m.id ORDER BY m.name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении списка мастеров: {}", e);
            e
        })?;

        rows.iter().map(row_to_master).collect()
    }

    /// Активные мастера, оказывающие услугу.
    pub async fn get_by_service_id(&self, service_id: i32) -> Result<Vec<Master>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{MASTER_SELECT} WHERE m.is_active = TRUE AND m.id IN \
             (SELECT master_id FROM master_services WHERE service_id = $1) \
             GROUP BY m.id ORDER BY m.rating DESC"
        ))
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при подборе мастеров для услуги {}: {}",
                service_id,
                e
            );
            e
        })?;

        rows.iter().map(row_to_master).collect()
    }

    pub async fn update(&self, master: &Master) -> Result<Master, RepositoryError> {
        sqlx::query(
            "UPDATE masters SET username = $2, name = $3, phone = $4, email = $5, \
             specialization = $6, experience_years = $7, rating = $8, is_active = $9, \
             working_hours_start = $10, working_hours_end = $11, working_days = $12 \
             WHERE id = $1",
        )
        .bind(master.id)
        .bind(&master.username)
        .bind(&master.name)
        .bind(&master.phone)
        .bind(&master.email)
        .bind(&master.specialization)
        .bind(master.experience_years)
        .bind(master.rating)
        .bind(master.is_active)
        .bind(master.working_hours_start)
        .bind(master.working_hours_end)
        .bind(&master.working_days)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при обновлении мастера {}: {}", master.id, e);
            e
        })?;

        match self.get_by_id(master.id).await? {
            Some(updated) => Ok(updated),
            None => Ok(master.clone()),
        }
    }

    /// Мягкое удаление: мастер выпадает из выдачи, история заказов остаётся.
    pub async fn deactivate(&self, master_id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE masters SET is_active = FALSE WHERE id = $1")
            .bind(master_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при деактивации мастера {}: {}", master_id, e);
                e
            })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn unlink_service(
        &self,
        master_id: i32,
        service_id: i32,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM master_services WHERE master_id = $1 AND service_id = $2")
                .bind(master_id)
                .bind(service_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(
                        "❌ Ошибка при отвязке услуги {} от мастера {}: {}",
                        service_id,
                        master_id,
                        e
                    );
                    e
                })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn link_service(&self, master_id: i32, service_id: i32) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO master_services (master_id, service_id) VALUES ($1, $2) \
             ON CONFLICT (master_id, service_id) DO NOTHING",
        )
        .bind(master_id)
        .bind(service_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при привязке услуги {} к мастеру {}: {}",
                service_id,
                master_id,
                e
            );
            e
        })?;

        Ok(())
    }
}

fn row_to_master(row: &PgRow) -> Result<Master, RepositoryError> {
    Ok(Master {
        id: row.try_get("id")?,
        telegram_id: row.try_get("telegram_id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        specialization: row.try_get("specialization")?,
        experience_years: row.try_get("experience_years")?,
        rating: row.try_get("rating")?,
        is_active: row.try_get("is_active")?,
        working_hours_start: row.try_get("working_hours_start")?,
        working_hours_end: row.try_get("working_hours_end")?,
        working_days: row.try_get("working_days")?,
        service_ids: row.try_get("service_ids")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
