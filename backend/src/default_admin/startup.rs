//! Startup seeding orchestration.
//!
//! The administrator is provisioned through the same saga as any other
//! account so the identity store and the profile service stay consistent.

use thiserror::Error;
use tracing::{info, warn};

use crate::default_admin::config::DefaultAdminSettings;
use crate::domain::ports::{IdentityStore, IdentityStoreError, UserProvisioning};
use crate::domain::{
    ContactDetails, EmailAddress, Envelope, LoginValidationError, Password, UserCreationRequest,
    UserId, UserValidationError,
};

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seeding is turned off.
    Disabled,
    /// An identity already exists for the configured email.
    AlreadyPresent,
    /// The administrator was provisioned.
    Created(UserId),
}

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("default admin seeding is enabled but no email is configured")]
    MissingEmail,
    #[error("default admin seeding is enabled but no password is configured")]
    MissingPassword,
    #[error("invalid default admin account: {0}")]
    InvalidAccount(#[from] UserValidationError),
    #[error("invalid default admin password: {0}")]
    InvalidPassword(#[from] LoginValidationError),
    #[error("failed checking for an existing default admin: {0}")]
    Lookup(#[from] IdentityStoreError),
    #[error("default admin provisioning failed with status {status}: {message}")]
    Provisioning { status: u16, message: String },
}

/// Provision the default administrator when enabled and absent.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use accounts::default_admin::{DefaultAdminSettings, SeedOutcome, seed_default_admin_on_startup};
/// use accounts::domain::UserProvisioningService;
/// use accounts::domain::ports::FixtureProfileService;
/// use accounts::outbound::memory::InMemoryIdentityStore;
/// use mockable::DefaultClock;
///
/// # async fn run(settings: DefaultAdminSettings) -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(InMemoryIdentityStore::new(Arc::new(DefaultClock)));
/// let service = UserProvisioningService::new(store.clone(), Arc::new(FixtureProfileService));
/// let outcome = seed_default_admin_on_startup(&settings, store.as_ref(), &service).await?;
/// assert_ne!(outcome, SeedOutcome::AlreadyPresent);
/// # Ok(())
/// # }
/// ```
pub async fn seed_default_admin_on_startup(
    settings: &DefaultAdminSettings,
    store: &dyn IdentityStore,
    provisioning: &dyn UserProvisioning,
) -> Result<SeedOutcome, StartupError> {
    if !settings.enabled {
        info!(reason = "disabled", "default admin seeding skipped");
        return Ok(SeedOutcome::Disabled);
    }

    let raw_email = settings.email.as_deref().ok_or(StartupError::MissingEmail)?;
    let email = EmailAddress::new(raw_email)?;
    if store.find_by_email(&email).await?.is_some() {
        info!(email = %email, "default admin already present; skipping");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let password = settings
        .password
        .clone()
        .ok_or(StartupError::MissingPassword)
        .and_then(|raw| Password::new(raw).map_err(StartupError::from))?;
    let contact = ContactDetails::new(
        settings.phone_number.clone(),
        settings.street_address.clone(),
        settings.postal_code.clone(),
        settings.city.clone(),
    );
    let request = UserCreationRequest::try_new(
        settings.first_name(),
        settings.last_name(),
        email.as_ref(),
        contact,
    )?;

    match provisioning.create_user(request, Some(password)).await {
        Envelope::Created(user) | Envelope::Ok(Some(user)) => {
            info!(user_id = %user.id, email = %user.email, "default admin provisioned");
            Ok(SeedOutcome::Created(user.id))
        }
        envelope => {
            let status = envelope.status().as_u16();
            let message = envelope
                .error_message()
                .unwrap_or("provisioning returned no account")
                .to_owned();
            warn!(status, %message, "default admin provisioning failed");
            Err(StartupError::Provisioning { status, message })
        }
    }
}
