use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use std::time::Duration;

/// Параметры пула соединений. Читаются из переменных окружения,
/// для всего кроме DATABASE_URL есть значения по умолчанию.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")?,
            min_connections: env_or("DB_MIN_CONNECTIONS", 5),
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT", 30),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT", 300),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME", 1800),
        })
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        Ok(Database { pool })
    }

    /// Создаёт схему, если её ещё нет: таблицы, индексы и триггер
    /// обновления updated_at.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        // Триггерная функция нужна всем таблицам с updated_at.
        sqlx::query(
            r#"
            CREATE OR REPLACE FUNCTION update_updated_at_column()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = CURRENT_TIMESTAMP;
                RETURN NEW;
            END;
            $$ language 'plpgsql'
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                telegram_id BIGINT UNIQUE NOT NULL,
                username VARCHAR(255) DEFAULT '',
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                category VARCHAR(100) NOT NULL,
                subcategory VARCHAR(100),
                price DECIMAL(10,2) NOT NULL DEFAULT 0.00,
                duration_minutes INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN DEFAULT TRUE,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS masters (
                id SERIAL PRIMARY KEY,
                telegram_id BIGINT UNIQUE,
                username VARCHAR(255) DEFAULT '',
                name VARCHAR(255),
                phone VARCHAR(20),
                email VARCHAR(255),
                specialization VARCHAR(255),
                experience_years INTEGER DEFAULT 0,
                rating DECIMAL(3,2) DEFAULT 0.00,
                is_active BOOLEAN DEFAULT TRUE,
                working_hours_start TIME,
                working_hours_end TIME,
                working_days VARCHAR(20),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS master_services (
                id SERIAL PRIMARY KEY,
                master_id INTEGER REFERENCES masters(id) ON DELETE CASCADE,
                service_id INTEGER REFERENCES services(id) ON DELETE CASCADE,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(master_id, service_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id SERIAL PRIMARY KEY,
                telegram_id BIGINT UNIQUE,
                username VARCHAR(255) DEFAULT '',
                name VARCHAR(255),
                address TEXT,
                phone VARCHAR(20),
                email VARCHAR(255),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id SERIAL PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
                master_id INTEGER NOT NULL REFERENCES masters(id) ON DELETE CASCADE,
                service_id INTEGER NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                appointment_datetime TIMESTAMP WITH TIME ZONE NOT NULL,
                duration_minutes INTEGER NOT NULL DEFAULT 0,
                total_price DECIMAL(10,2) NOT NULL DEFAULT 0.00,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                notes TEXT,
                client_name VARCHAR(255),
                client_phone VARCHAR(20),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_users_telegram_id ON users (telegram_id)",
            "CREATE INDEX IF NOT EXISTS idx_services_category ON services (category)",
            "CREATE INDEX IF NOT EXISTS idx_services_is_active ON services (is_active)",
            "CREATE INDEX IF NOT EXISTS idx_services_name ON services (name)",
            "CREATE INDEX IF NOT EXISTS idx_masters_telegram_id ON masters (telegram_id)",
            "CREATE INDEX IF NOT EXISTS idx_masters_is_active ON masters (is_active)",
            "CREATE INDEX IF NOT EXISTS idx_masters_specialization ON masters (specialization)",
            "CREATE INDEX IF NOT EXISTS idx_master_services_master_id ON master_services (master_id)",
            "CREATE INDEX IF NOT EXISTS idx_master_services_service_id ON master_services (service_id)",
            "CREATE INDEX IF NOT EXISTS idx_customers_telegram_id ON customers (telegram_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders (user_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_master_id ON orders (master_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_service_id ON orders (service_id)",
            "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
            "CREATE INDEX IF NOT EXISTS idx_orders_appointment_datetime ON orders (appointment_datetime)",
            "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders (created_at)",
        ];

        for index in indexes {
            sqlx::query(index).execute(&self.pool).await?;
        }

        let triggers = [
            ("update_services_updated_at", "services"),
            ("update_masters_updated_at", "masters"),
            ("update_customers_updated_at", "customers"),
            ("update_orders_updated_at", "orders"),
        ];

        for (trigger, table) in triggers {
            sqlx::query(&format!("DROP TRIGGER IF EXISTS {trigger} ON {table}"))
                .execute(&self.pool)
                .await?;
            sqlx::query(&format!(
                "CREATE TRIGGER {trigger} BEFORE UPDATE ON {table} \
                 FOR EACH ROW EXECUTE FUNCTION update_updated_at_column()"
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}
