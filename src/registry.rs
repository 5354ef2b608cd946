//! Mutation orchestrator for the company resource.
//!
//! Composes validation, duplicate detection, and store calls into the four
//! resource operations, and fires a best-effort mutation event after each
//! successful write.
//!
//! ## Duplicate-check race
//!
//! The name-availability check and the eventual insert/update are two
//! separate storage round-trips with no lock between them. A concurrent
//! create with the same name can slip in between; the storage-level partial
//! unique index is the real backstop, and the race loser surfaces as a
//! generic processing failure rather than a duplicate. This window is
//! intentional and must not be closed here.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::Error;
use crate::notify::{EventNotifier, MutationKind};
use crate::store::CompanyStore;
use crate::types::{Company, CompanyId, CreateCompany, UpdateCompany};
use crate::validation::{validate_create, validate_update};

/// Orchestrates the company resource operations over a store and a
/// notifier.
pub struct CompanyRegistry<S> {
    store: Arc<S>,
    notifier: Arc<dyn EventNotifier>,
}

impl<S> Clone for CompanyRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: CompanyStore> CompanyRegistry<S> {
    /// Create a registry over the given store and notifier.
    pub fn new(store: Arc<S>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Whether a non-deleted company with this name exists.
    async fn name_taken(&self, name: &str) -> Result<bool, Error> {
        match self.store.get_by_name(name).await {
            Ok(found) => Ok(found.is_some()),
            Err(e) => {
                error!(name = name, error = %e, "duplicate check failed");
                Err(Error::ProcessingFailed)
            }
        }
    }

    /// Publish a mutation event; failures are logged and swallowed.
    ///
    /// Runs after the mutation's success is already certain, so the outcome
    /// never reaches the caller.
    async fn notify(&self, kind: MutationKind) {
        if let Err(e) = self.notifier.publish(kind).await {
            warn!(kind = kind.as_str(), error = %e, "event publish failed");
        }
    }

    /// Create a company.
    ///
    /// Validates the payload, rejects names already used by a non-deleted
    /// company, inserts, and echoes the resource back with its generated id.
    pub async fn create(&self, request: CreateCompany) -> Result<Company, Error> {
        let new = validate_create(&request).map_err(|e| {
            warn!(field = e.field, error = %e, "create request rejected");
            Error::InvalidParameters
        })?;

        if self.name_taken(&new.name).await? {
            return Err(Error::DuplicateRecord);
        }

        let id = match self.store.create(&new).await {
            Ok(id) => id,
            Err(e) => {
                error!(name = %new.name, error = %e, "company insert failed");
                return Err(Error::ProcessingFailed);
            }
        };

        self.notify(MutationKind::Created).await;
        info!(company_id = %id, name = %new.name, "company created");

        Ok(Company {
            id,
            name: new.name,
            description: new.description,
            amount_of_employees: new.amount_of_employees,
            registered: new.registered,
            company_type: new.company_type,
        })
    }

    /// Apply a field-level merge to a company.
    ///
    /// Fetches the current record first; a missing record is not
    /// distinguished from other store failures here. A supplied name that
    /// differs from the current one repeats the duplicate check; a supplied
    /// name equal to the current one does not.
    pub async fn update(&self, id: CompanyId, request: UpdateCompany) -> Result<(), Error> {
        let patch = validate_update(&request).map_err(|e| {
            warn!(company_id = %id, field = e.field, error = %e, "update request rejected");
            Error::InvalidParameters
        })?;

        let current = match self.store.get_by_id(&id).await {
            Ok(Some(company)) => company,
            Ok(None) => {
                warn!(company_id = %id, "update target not found");
                return Err(Error::ProcessingFailed);
            }
            Err(e) => {
                error!(company_id = %id, error = %e, "update target fetch failed");
                return Err(Error::ProcessingFailed);
            }
        };

        if let Some(new_name) = patch.name.as_deref() {
            if new_name != current.name && self.name_taken(new_name).await? {
                return Err(Error::DuplicateRecord);
            }
        }

        if let Err(e) = self.store.update(&id, &patch).await {
            error!(company_id = %id, error = %e, "company update failed");
            return Err(Error::ProcessingFailed);
        }

        self.notify(MutationKind::Updated).await;
        info!(company_id = %id, "company updated");
        Ok(())
    }

    /// Soft-delete a company. Unconditional and idempotent; no existence
    /// check is made.
    pub async fn delete(&self, id: CompanyId) -> Result<(), Error> {
        if let Err(e) = self.store.soft_delete(&id).await {
            error!(company_id = %id, error = %e, "company delete failed");
            return Err(Error::ProcessingFailed);
        }

        self.notify(MutationKind::Deleted).await;
        info!(company_id = %id, "company deleted");
        Ok(())
    }

    /// Fetch a non-deleted company by id.
    pub async fn get(&self, id: CompanyId) -> Result<Company, Error> {
        match self.store.get_by_id(&id).await {
            Ok(Some(company)) => Ok(company),
            Ok(None) => Err(Error::NoRecordFound),
            Err(e) => {
                error!(company_id = %id, error = %e, "company fetch failed");
                Err(Error::ProcessingFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::notify::NotifyError;
    use crate::store::InMemoryCompanyStore;
    use crate::types::{CompanyPatch, CompanyType, NewCompany};

    /// Notifier that records every published kind.
    #[derive(Default)]
    struct RecordingNotifier {
        published: Mutex<Vec<MutationKind>>,
    }

    #[async_trait]
    impl EventNotifier for RecordingNotifier {
        async fn publish(&self, kind: MutationKind) -> Result<(), NotifyError> {
            self.published.lock().push(kind);
            Ok(())
        }
    }

    /// Notifier whose every publish fails.
    struct BrokenNotifier;

    #[async_trait]
    impl EventNotifier for BrokenNotifier {
        async fn publish(&self, _kind: MutationKind) -> Result<(), NotifyError> {
            Err(NotifyError::Publish("broker offline".to_string()))
        }
    }

    /// Store whose every operation fails.
    struct FailingStore;

    #[derive(Debug, thiserror::Error)]
    #[error("store offline")]
    struct StoreOffline;

    #[async_trait]
    impl CompanyStore for FailingStore {
        type Error = StoreOffline;

        async fn create(&self, _company: &NewCompany) -> Result<CompanyId, Self::Error> {
            Err(StoreOffline)
        }
        async fn update(&self, _id: &CompanyId, _patch: &CompanyPatch) -> Result<(), Self::Error> {
            Err(StoreOffline)
        }
        async fn soft_delete(&self, _id: &CompanyId) -> Result<(), Self::Error> {
            Err(StoreOffline)
        }
        async fn get_by_id(&self, _id: &CompanyId) -> Result<Option<Company>, Self::Error> {
            Err(StoreOffline)
        }
        async fn get_by_name(&self, _name: &str) -> Result<Option<Company>, Self::Error> {
            Err(StoreOffline)
        }
    }

    fn registry() -> (
        CompanyRegistry<InMemoryCompanyStore>,
        Arc<InMemoryCompanyStore>,
        Arc<RecordingNotifier>,
    ) {
        let store = Arc::new(InMemoryCompanyStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let notifier_dyn: Arc<dyn EventNotifier> = notifier.clone();
        let registry = CompanyRegistry::new(Arc::clone(&store), notifier_dyn);
        (registry, store, notifier)
    }

    fn create_request(name: &str) -> CreateCompany {
        CreateCompany {
            name: Some(name.to_string()),
            description: None,
            amount_of_employees: Some(2),
            registered: Some(false),
            company_type: Some("Non Profit".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_echoes_input_with_generated_id() {
        let (registry, store, notifier) = registry();

        let company = registry.create(create_request("example")).await.unwrap();

        assert_eq!(company.name, "example");
        assert_eq!(company.description, "");
        assert_eq!(company.amount_of_employees, 2);
        assert!(!company.registered);
        assert_eq!(company.company_type, CompanyType::NonProfit);
        assert!(store.contains(&company.id));
        assert_eq!(notifier.published.lock().as_slice(), &[MutationKind::Created]);
    }

    #[tokio::test]
    async fn test_create_generates_fresh_ids() {
        let (registry, _, _) = registry();

        let a = registry.create(create_request("first")).await.unwrap();
        let b = registry.create(create_request("second")).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let (registry, store, notifier) = registry();
        registry.create(create_request("example")).await.unwrap();

        let mut other = create_request("example");
        other.amount_of_employees = Some(99);
        other.registered = Some(true);
        let err = registry.create(other).await.unwrap_err();

        assert_eq!(err, Error::DuplicateRecord);
        assert_eq!(store.len(), 1);
        // No event for a rejected mutation.
        assert_eq!(notifier.published.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_create_reuses_soft_deleted_name() {
        let (registry, _, _) = registry();
        let first = registry.create(create_request("example")).await.unwrap();
        registry.delete(first.id).await.unwrap();

        // The old row is invisible to the uniqueness check.
        let second = registry.create(create_request("example")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_invalid_request_touches_nothing() {
        let (registry, store, notifier) = registry();

        let mut request = create_request("example");
        request.amount_of_employees = Some(-1);
        let err = registry.create(request).await.unwrap_err();

        assert_eq!(err, Error::InvalidParameters);
        assert!(store.is_empty());
        assert!(notifier.published.lock().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_only_supplied_fields() {
        let (registry, store, notifier) = registry();
        let company = registry.create(create_request("example")).await.unwrap();
        let before = store.modified_at(&company.id).unwrap();

        let request = UpdateCompany {
            amount_of_employees: Some(7),
            ..Default::default()
        };
        registry.update(company.id, request).await.unwrap();

        let fetched = registry.get(company.id).await.unwrap();
        assert_eq!(fetched.amount_of_employees, 7);
        assert_eq!(fetched.name, "example");
        assert_eq!(fetched.description, "");
        assert!(!fetched.registered);
        assert_eq!(fetched.company_type, CompanyType::NonProfit);
        assert!(store.modified_at(&company.id).unwrap() >= before);
        assert_eq!(
            notifier.published.lock().as_slice(),
            &[MutationKind::Created, MutationKind::Updated]
        );
    }

    #[tokio::test]
    async fn test_update_rename_to_taken_name_conflicts() {
        let (registry, _, _) = registry();
        registry.create(create_request("taken")).await.unwrap();
        let company = registry.create(create_request("mine")).await.unwrap();

        let request = UpdateCompany {
            name: Some("taken".to_string()),
            ..Default::default()
        };
        let err = registry.update(company.id, request).await.unwrap_err();

        assert_eq!(err, Error::DuplicateRecord);
        assert_eq!(registry.get(company.id).await.unwrap().name, "mine");
    }

    #[tokio::test]
    async fn test_update_own_name_skips_duplicate_check() {
        let (registry, _, _) = registry();
        let company = registry.create(create_request("example")).await.unwrap();

        // "example" is present in the store (it is this record); resubmitting
        // it must not read as a conflict.
        let request = UpdateCompany {
            name: Some("example".to_string()),
            registered: Some(true),
            ..Default::default()
        };
        registry.update(company.id, request).await.unwrap();

        assert!(registry.get(company.id).await.unwrap().registered);
    }

    #[tokio::test]
    async fn test_update_missing_company_is_processing_failure() {
        let (registry, _, notifier) = registry();

        let err = registry
            .update(CompanyId::random(), UpdateCompany::default())
            .await
            .unwrap_err();

        assert_eq!(err, Error::ProcessingFailed);
        assert!(notifier.published.lock().is_empty());
    }

    #[tokio::test]
    async fn test_update_invalid_request_touches_nothing() {
        let (registry, _, _) = registry();
        let company = registry.create(create_request("example")).await.unwrap();

        let request = UpdateCompany {
            amount_of_employees: Some(-1),
            ..Default::default()
        };
        let err = registry.update(company.id, request).await.unwrap_err();

        assert_eq!(err, Error::InvalidParameters);
        assert_eq!(registry.get(company.id).await.unwrap().amount_of_employees, 2);
    }

    #[tokio::test]
    async fn test_delete_hides_record_and_is_idempotent() {
        let (registry, store, notifier) = registry();
        let company = registry.create(create_request("example")).await.unwrap();

        registry.delete(company.id).await.unwrap();
        assert_eq!(registry.get(company.id).await.unwrap_err(), Error::NoRecordFound);
        assert!(store.contains(&company.id));

        registry.delete(company.id).await.unwrap();
        registry.delete(CompanyId::random()).await.unwrap();
        assert_eq!(
            notifier.published.lock().as_slice(),
            &[
                MutationKind::Created,
                MutationKind::Deleted,
                MutationKind::Deleted,
                MutationKind::Deleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (registry, _, _) = registry();

        let err = registry.get(CompanyId::random()).await.unwrap_err();
        assert_eq!(err, Error::NoRecordFound);
    }

    #[tokio::test]
    async fn test_notifier_failure_never_flips_success() {
        let store = Arc::new(InMemoryCompanyStore::new());
        let registry = CompanyRegistry::new(Arc::clone(&store), Arc::new(BrokenNotifier));

        let company = registry.create(create_request("example")).await.unwrap();
        registry
            .update(company.id, UpdateCompany::default())
            .await
            .unwrap();
        registry.delete(company.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_errors_collapse_to_processing_failure() {
        let registry = CompanyRegistry::new(
            Arc::new(FailingStore),
            Arc::new(RecordingNotifier::default()),
        );
        let id = CompanyId::random();

        assert_eq!(
            registry.create(create_request("example")).await.unwrap_err(),
            Error::ProcessingFailed
        );
        assert_eq!(
            registry.update(id, UpdateCompany::default()).await.unwrap_err(),
            Error::ProcessingFailed
        );
        assert_eq!(registry.delete(id).await.unwrap_err(), Error::ProcessingFailed);
        assert_eq!(registry.get(id).await.unwrap_err(), Error::ProcessingFailed);
    }
}
