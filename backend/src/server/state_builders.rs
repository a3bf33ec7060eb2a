//! Builders selecting port implementations from server configuration.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use accounts::domain::UserProvisioningService;
use accounts::domain::ports::{
    FixtureProfileService, IdentityStore, ProfileService, UserProvisioning,
};
use accounts::outbound::memory::InMemoryIdentityStore;
use accounts::outbound::persistence::DieselIdentityStore;
use accounts::outbound::profile::HttpProfileService;

use super::ServerConfig;

/// Port implementations shared by HTTP handlers and startup tasks.
#[derive(Clone)]
pub struct AppPorts {
    pub identity_store: Arc<dyn IdentityStore>,
    pub provisioning: Arc<dyn UserProvisioning>,
}

fn build_identity_store(config: &ServerConfig) -> Arc<dyn IdentityStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselIdentityStore::new(pool.clone())),
        None => {
            warn!("no database configured; identities are kept in memory");
            Arc::new(InMemoryIdentityStore::new(Arc::new(DefaultClock)))
        }
    }
}

fn build_profile_service(config: &ServerConfig) -> std::io::Result<Arc<dyn ProfileService>> {
    match &config.profile_service_url {
        Some(base_url) => {
            let client = HttpProfileService::new(base_url, config.profile_timeout)
                .map_err(|err| std::io::Error::other(format!("profile client: {err}")))?;
            info!(endpoint = %client.endpoint(), "using remote profile service");
            Ok(Arc::new(client))
        }
        None => {
            warn!("no profile service configured; profiles are accepted in-process");
            Ok(Arc::new(FixtureProfileService))
        }
    }
}

/// Assemble the identity store, profile service and provisioning saga.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the profile client cannot be constructed.
pub fn build_ports(config: &ServerConfig) -> std::io::Result<AppPorts> {
    let identity_store = build_identity_store(config);
    let profile_service = build_profile_service(config)?;
    let provisioning =
        UserProvisioningService::new(Arc::clone(&identity_store), profile_service)
            .with_profile_timeout(config.profile_timeout);
    Ok(AppPorts {
        identity_store,
        provisioning: Arc::new(provisioning),
    })
}
