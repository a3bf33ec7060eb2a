//! Driving port for account provisioning use-cases.
//!
//! Inbound adapters call this port and translate the returned envelopes into
//! protocol responses. HTTP handler tests substitute the generated mock
//! instead of wiring stores.

use async_trait::async_trait;

use crate::domain::{
    AuthenticatedUser, Envelope, LoginCredentials, Password, ProvisionedUser, UserCreationRequest,
    UserId,
};

/// Domain use-case port for provisioning and signing in users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProvisioning: Send + Sync {
    /// Provision an account across the identity store and the profile service.
    async fn create_user(
        &self,
        request: UserCreationRequest,
        password: Option<Password>,
    ) -> Envelope<ProvisionedUser>;

    /// Verify credentials.
    async fn login_user(&self, credentials: LoginCredentials) -> Envelope<AuthenticatedUser>;

    /// Look up a provisioned account.
    async fn find_user(&self, id: UserId) -> Envelope<ProvisionedUser>;
}
