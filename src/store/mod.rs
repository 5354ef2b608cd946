//! Company storage backends.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::types::{Company, CompanyId, CompanyPatch, NewCompany};

/// Trait for company storage backends.
///
/// Soft-deleted rows stay in storage but are invisible to every operation
/// here except [`CompanyStore::soft_delete`] itself. All methods are async
/// to support async database access.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Insert a new company and return its generated id.
    ///
    /// The backend's partial uniqueness constraint on the name of
    /// non-deleted rows is the last line of defense against concurrent
    /// duplicate creates; a violation surfaces as a plain storage error.
    async fn create(&self, company: &NewCompany) -> Result<CompanyId, Self::Error>;

    /// Apply a field-level merge to a non-deleted company and stamp its
    /// modification time. Zero rows affected is silent success.
    async fn update(&self, id: &CompanyId, patch: &CompanyPatch) -> Result<(), Self::Error>;

    /// Mark a company deleted. No-op success for missing or already-deleted
    /// ids.
    async fn soft_delete(&self, id: &CompanyId) -> Result<(), Self::Error>;

    /// Fetch the non-deleted company with this id.
    async fn get_by_id(&self, id: &CompanyId) -> Result<Option<Company>, Self::Error>;

    /// Fetch the non-deleted company with this exact name. Case-sensitive.
    async fn get_by_name(&self, name: &str) -> Result<Option<Company>, Self::Error>;

    /// Whether the backend is reachable, for readiness probes.
    async fn is_healthy(&self) -> bool {
        true
    }
}

pub use memory::InMemoryCompanyStore;
pub use postgres::PostgresCompanyStore;
