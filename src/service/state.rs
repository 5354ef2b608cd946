//! Service state management.
//!
//! Contains the shared state handed to every handler: the store, the
//! mutation orchestrator over it, and the token service.

use std::sync::Arc;

use chrono::Duration;

use crate::notify::EventNotifier;
use crate::registry::CompanyRegistry;
use crate::store::CompanyStore;
use crate::token::TokenService;

/// Shared service state.
pub struct ServiceState<S: CompanyStore + 'static> {
    /// The company store, also consulted directly by health probes.
    pub store: Arc<S>,
    /// Orchestrator for the four resource operations.
    pub registry: CompanyRegistry<S>,
    /// Issues and verifies access tokens.
    pub tokens: TokenService,
    /// Validity window for tokens issued by the token endpoint.
    pub access_token_duration: Duration,
}

impl<S: CompanyStore + 'static> ServiceState<S> {
    /// Create service state over a store and a notifier.
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn EventNotifier>,
        tokens: TokenService,
        access_token_duration: Duration,
    ) -> Self {
        let registry = CompanyRegistry::new(Arc::clone(&store), notifier);
        Self {
            store,
            registry,
            tokens,
            access_token_duration,
        }
    }
}

impl<S: CompanyStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: self.registry.clone(),
            tokens: self.tokens.clone(),
            access_token_duration: self.access_token_duration,
        }
    }
}
