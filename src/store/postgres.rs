//! PostgreSQL company store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use super::CompanyStore;
use crate::types::{Company, CompanyId, CompanyPatch, CompanyType, NewCompany};

/// DDL for the companies table, kept in sync with
/// `migrations/0001_companies.sql`.
///
/// The partial unique index enforces at-most-one non-deleted company per
/// name and is the backstop for the orchestrator's pre-write duplicate
/// check.
pub const COMPANIES_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    company_id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    company_name varchar(15) NOT NULL,
    description varchar(3000) NOT NULL DEFAULT '',
    amount_of_employees bigint NOT NULL CHECK (amount_of_employees >= 0),
    is_registered boolean NOT NULL DEFAULT false,
    company_type varchar(32) NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now(),
    modified_at timestamptz NOT NULL DEFAULT now(),
    deleted_at timestamptz
);

CREATE UNIQUE INDEX IF NOT EXISTS companies_active_name_idx
    ON companies (company_name)
    WHERE deleted_at IS NULL;
"#;

/// Configuration for the PostgreSQL connection pool.
///
/// Defaults balance pool concurrency with managed-database connection
/// limits; timeouts are aggressive to fail fast, and max lifetime forces
/// periodic reconnection.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300 = 5 min).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800 = 30 min).
    pub max_lifetime_secs: u64,
}

impl PostgresConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/companies".to_string()),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            max_lifetime_secs: std::env::var("DB_MAX_LIFETIME_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Error type for the PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored company_type value is outside the closed set.
    #[error("stored company type is not recognized: {0}")]
    UnknownCompanyType(String),
}

/// PostgreSQL company store.
///
/// Uses connection pooling with production-tuned settings. Every read and
/// the merge update filter on `deleted_at IS NULL`; the soft delete is the
/// only statement that touches deleted rows.
pub struct PostgresCompanyStore {
    pool: PgPool,
}

impl PostgresCompanyStore {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Parse a company from a database row.
    fn parse_company_row(row: &sqlx::postgres::PgRow) -> Result<Company, PostgresError> {
        let id: Uuid = row.try_get("company_id").map_err(PostgresError::Database)?;
        let name: String = row.try_get("company_name").map_err(PostgresError::Database)?;
        let description: String = row.try_get("description").map_err(PostgresError::Database)?;
        let amount_of_employees: i64 = row
            .try_get("amount_of_employees")
            .map_err(PostgresError::Database)?;
        let registered: bool = row.try_get("is_registered").map_err(PostgresError::Database)?;
        let company_type_raw: String =
            row.try_get("company_type").map_err(PostgresError::Database)?;

        let company_type = CompanyType::from_str(&company_type_raw)
            .ok_or(PostgresError::UnknownCompanyType(company_type_raw))?;

        Ok(Company {
            id: CompanyId::new(id),
            name,
            description,
            amount_of_employees,
            registered,
            company_type,
        })
    }
}

#[async_trait]
impl CompanyStore for PostgresCompanyStore {
    type Error = PostgresError;

    async fn create(&self, company: &NewCompany) -> Result<CompanyId, Self::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO companies (company_name, description, amount_of_employees, is_registered, company_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING company_id
            "#,
        )
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.amount_of_employees)
        .bind(company.registered)
        .bind(company.company_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        let id: Uuid = row.try_get("company_id")?;
        Ok(CompanyId::new(id))
    }

    async fn update(&self, id: &CompanyId, patch: &CompanyPatch) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            UPDATE companies
            SET
                company_name = coalesce($2, company_name),
                description = coalesce($3, description),
                amount_of_employees = coalesce($4, amount_of_employees),
                is_registered = coalesce($5, is_registered),
                company_type = coalesce($6, company_type),
                modified_at = now()
            WHERE company_id = $1
                AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.amount_of_employees)
        .bind(patch.registered)
        .bind(patch.company_type.map(|ct| ct.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn soft_delete(&self, id: &CompanyId) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            UPDATE companies
            SET deleted_at = now()
            WHERE company_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &CompanyId) -> Result<Option<Company>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT company_id, company_name, description, amount_of_employees, is_registered, company_type
            FROM companies
            WHERE company_id = $1
                AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(Self::parse_company_row(r)?)),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Company>, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT company_id, company_name, description, amount_of_employees, is_registered, company_type
            FROM companies
            WHERE company_name = $1
                AND deleted_at IS NULL
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(Self::parse_company_row(r)?)),
            None => Ok(None),
        }
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
