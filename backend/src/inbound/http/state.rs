//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the driving port and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UserProvisioning;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub provisioning: Arc<dyn UserProvisioning>,
}

impl HttpState {
    /// Construct state from the provisioning use-case.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use accounts::domain::UserProvisioningService;
    /// use accounts::domain::ports::FixtureProfileService;
    /// use accounts::inbound::http::state::HttpState;
    /// use accounts::outbound::memory::InMemoryIdentityStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryIdentityStore::new(Arc::new(DefaultClock)));
    /// let service = UserProvisioningService::new(store, Arc::new(FixtureProfileService));
    /// let state = HttpState::new(Arc::new(service));
    /// let _provisioning = state.provisioning.clone();
    /// ```
    pub fn new(provisioning: Arc<dyn UserProvisioning>) -> Self {
        Self { provisioning }
    }
}
