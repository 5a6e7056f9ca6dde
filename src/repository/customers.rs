use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::models::{Customer, NewCustomer};
use crate::repository::RepositoryError;

const CUSTOMER_COLUMNS: &str =
    "id, telegram_id, username, name, address, phone, email, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, customer: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO customers (telegram_id, username, name, address, phone, email) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer.telegram_id)
        .bind(&customer.username)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при создании клиента: {}", e);
            e
        })?;

        row_to_customer(&row)
    }

    pub async fn get_by_id(&self, customer_id: i32) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при получении клиента {}: {}", customer_id, e);
            e
        })?;

        row.as_ref().map(row_to_customer).transpose()
    }

    pub async fn get_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE telegram_id = $1"
        ))
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при поиске клиента по telegram_id {}: {}",
                telegram_id,
                e
            );
            e
        })?;

        row.as_ref().map(row_to_customer).transpose()
    }

    /// Возвращает клиента по telegram_id, создавая запись при первом
    /// обращении и дозаполняя имя и телефон, если они изменились.
    pub async fn upsert_contact(
        &self,
        telegram_id: i64,
        username: &str,
        name: &str,
        phone: &str,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO customers (telegram_id, username, name, phone) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (telegram_id) DO UPDATE \
             SET username = EXCLUDED.username, \
                 name = COALESCE(NULLIF(EXCLUDED.name, ''), customers.name), \
                 phone = COALESCE(NULLIF(EXCLUDED.phone, ''), customers.phone) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(telegram_id)
        .bind(username)
        .bind(name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(
                "❌ Ошибка при сохранении контакта клиента {}: {}",
                telegram_id,
                e
            );
            e
        })?;

        row_to_customer(&row)
    }

    pub async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE customers SET username = $2, name = $3, address = $4, \
             phone = $5, email = $6 WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(customer.id)
        .bind(&customer.username)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("❌ Ошибка при обновлении клиента {}: {}", customer.id, e);
            e
        })?;

        row_to_customer(&row)
    }

    pub async fn delete(&self, customer_id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("❌ Ошибка при удалении клиента {}: {}", customer_id, e);
                e
            })?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_customer(row: &PgRow) -> Result<Customer, RepositoryError> {
    Ok(Customer {
        id: row.try_get("id")?,
        telegram_id: row.try_get("telegram_id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
