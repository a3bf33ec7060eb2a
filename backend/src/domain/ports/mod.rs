//! Domain ports for the hexagonal boundary.
//!
//! Driving port: [`UserProvisioning`]. Driven ports: [`IdentityStore`] with
//! its [`IdentityTransaction`] scope, and [`ProfileService`].

mod macros;
pub(crate) use macros::define_port_error;

mod identity_store;
mod profile_service;
mod user_provisioning;

#[cfg(test)]
pub use identity_store::MockIdentityStore;
pub use identity_store::{IdentityStore, IdentityStoreError, IdentityTransaction};
#[cfg(test)]
pub use profile_service::MockProfileService;
pub use profile_service::{
    CreateProfileRequest, CreateProfileResponse, FixtureProfileService, ProfileService,
    ProfileServiceError,
};
#[cfg(test)]
pub use user_provisioning::MockUserProvisioning;
pub use user_provisioning::UserProvisioning;
