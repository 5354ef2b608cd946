//! In-memory company store for tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::CompanyStore;
use crate::types::{Company, CompanyId, CompanyPatch, NewCompany};

/// Error type for the in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Company not found.
    #[error("company not found: {0}")]
    NotFound(CompanyId),
}

/// One stored row, including the bookkeeping columns that never leave the
/// storage layer.
#[derive(Debug, Clone)]
struct CompanyRow {
    company: Company,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// In-memory company store.
///
/// Mirrors the Postgres backend's merge and soft-delete semantics exactly so
/// the orchestrator can be exercised without a database. Uses a BTreeMap for
/// deterministic iteration order.
#[derive(Debug, Default)]
pub struct InMemoryCompanyStore {
    rows: RwLock<BTreeMap<CompanyId, CompanyRow>>,
}

impl InMemoryCompanyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, deleted ones included.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the store holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Whether a row for this id exists at all, deleted or not.
    ///
    /// Soft-deleted rows stay in storage for audit; this sees through the
    /// `deleted_at` filter that the trait methods apply.
    pub fn contains(&self, id: &CompanyId) -> bool {
        self.rows.read().contains_key(id)
    }

    /// The deletion timestamp of a row, if it has one.
    pub fn deleted_at(&self, id: &CompanyId) -> Option<DateTime<Utc>> {
        self.rows.read().get(id).and_then(|row| row.deleted_at)
    }

    /// The modification timestamp of a row.
    pub fn modified_at(&self, id: &CompanyId) -> Option<DateTime<Utc>> {
        self.rows.read().get(id).map(|row| row.modified_at)
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    type Error = InMemoryError;

    async fn create(&self, company: &NewCompany) -> Result<CompanyId, Self::Error> {
        let id = CompanyId::new(Uuid::new_v4());
        let now = Utc::now();

        self.rows.write().insert(
            id,
            CompanyRow {
                company: Company {
                    id,
                    name: company.name.clone(),
                    description: company.description.clone(),
                    amount_of_employees: company.amount_of_employees,
                    registered: company.registered,
                    company_type: company.company_type,
                },
                created_at: now,
                modified_at: now,
                deleted_at: None,
            },
        );

        Ok(id)
    }

    async fn update(&self, id: &CompanyId, patch: &CompanyPatch) -> Result<(), Self::Error> {
        let mut rows = self.rows.write();
        // Missing or deleted rows are zero-rows-affected successes.
        let Some(row) = rows.get_mut(id).filter(|row| row.deleted_at.is_none()) else {
            return Ok(());
        };

        if let Some(name) = &patch.name {
            row.company.name = name.clone();
        }
        if let Some(description) = &patch.description {
            row.company.description = description.clone();
        }
        if let Some(amount) = patch.amount_of_employees {
            row.company.amount_of_employees = amount;
        }
        if let Some(registered) = patch.registered {
            row.company.registered = registered;
        }
        if let Some(company_type) = patch.company_type {
            row.company.company_type = company_type;
        }
        row.modified_at = Utc::now();

        Ok(())
    }

    async fn soft_delete(&self, id: &CompanyId) -> Result<(), Self::Error> {
        if let Some(row) = self.rows.write().get_mut(id) {
            row.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &CompanyId) -> Result<Option<Company>, Self::Error> {
        Ok(self
            .rows
            .read()
            .get(id)
            .filter(|row| row.deleted_at.is_none())
            .map(|row| row.company.clone()))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Company>, Self::Error> {
        Ok(self
            .rows
            .read()
            .values()
            .find(|row| row.deleted_at.is_none() && row.company.name == name)
            .map(|row| row.company.clone()))
    }
}
