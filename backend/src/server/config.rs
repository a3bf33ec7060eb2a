//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use accounts::domain::DEFAULT_PROFILE_TIMEOUT;
use accounts::outbound::persistence::DbPool;
use url::Url;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) profile_service_url: Option<Url>,
    pub(crate) profile_timeout: Duration,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            profile_service_url: None,
            profile_timeout: DEFAULT_PROFILE_TIMEOUT,
        }
    }

    /// Attach a database connection pool; without one the in-memory identity
    /// store is used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Point the saga at a remote profile service; without one every profile
    /// request is accepted in-process.
    #[must_use]
    pub fn with_profile_service(mut self, base_url: Url) -> Self {
        self.profile_service_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn with_profile_timeout(mut self, timeout: Duration) -> Self {
        self.profile_timeout = timeout;
        self
    }
}
