//! # company-registry
//!
//! HTTP service exposing the company resource: create, partial update,
//! soft delete, and read, guarded by stateless bearer-token authentication,
//! backed by PostgreSQL, with a best-effort mutation event published to
//! NATS after every successful write.
//!
//! ## Architecture
//!
//! ```text
//! Request → Auth Gate (mutations only) → CompanyRegistry
//!                                           ↓
//!                          Validation → CompanyStore (Postgres or Memory)
//!                                           ↓ (on success)
//!                                      EventNotifier (fire-and-forget)
//! ```
//!
//! ## Invariants
//!
//! - At most one non-deleted company per name; the store's partial unique
//!   index backstops the orchestrator's pre-write check
//! - Updates merge field-by-field: absent means unchanged, never zeroed
//! - Soft-deleted rows stay in storage but are invisible to reads, updates,
//!   and the uniqueness check
//! - Event publishing never changes the outcome of a committed mutation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod notify;
pub mod registry;
pub mod service;
pub mod store;
pub mod token;
pub mod types;
pub mod validation;

// Re-exports
pub use config::Config;
pub use error::{Error, ErrorResponse};
pub use notify::{EventNotifier, MutationKind, NatsEventNotifier, NotifyError};
pub use registry::CompanyRegistry;
pub use service::{create_router, AuthSubject, ServiceState};
pub use store::{CompanyStore, InMemoryCompanyStore, PostgresCompanyStore};
pub use token::{AccessClaims, TokenService};
pub use types::{
    Company, CompanyId, CompanyPatch, CompanyType, CreateCompany, NewCompany, UpdateCompany,
};
pub use validation::{
    validate_create, validate_update, ValidationError, DESCRIPTION_MAX_CHARS, NAME_MAX_CHARS,
};
