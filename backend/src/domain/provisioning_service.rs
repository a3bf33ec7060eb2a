//! Account provisioning saga.
//!
//! Creating an account writes to two independently owned stores: the local
//! identity store and the remote profile service. They share no transaction,
//! so the saga opens a local transaction, creates the identity, calls the
//! profile service once and then either commits or rolls back.
//!
//! ```text
//! Start -> Checked -> TxOpen -> LocalCreated -> LocalReadBack -> RemoteCreated -> Committed
//!   |         \________________________________________________________/
//!   v                                  |
//! Conflict                         RolledBack
//! ```
//!
//! Every failure is reported through an [`Envelope`] after the local
//! transaction has been rolled back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::domain::ports::{
    CreateProfileRequest, IdentityStore, IdentityStoreError, IdentityTransaction, ProfileService,
    ProfileServiceError, UserProvisioning,
};
use crate::domain::{
    AuthenticatedUser, Envelope, Error, IdentityRecord, LoginCredentials, Password,
    ProvisionedUser, UserCreationRequest, UserId,
};

/// Default deadline for the remote profile call.
pub const DEFAULT_PROFILE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const DUPLICATE_EMAIL_MESSAGE: &str = "User with given email already exists";
pub(crate) const PROFILE_FAILED_MESSAGE: &str = "failed creating user profile; rolling back";
pub(crate) const AUTHENTICATION_FAILED_MESSAGE: &str = "authentication failed";
pub(crate) const USER_NOT_FOUND_MESSAGE: &str = "user not found";

/// Progress marker of a single provisioning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    Start,
    Checked,
    TxOpen,
    LocalCreated,
    LocalReadBack,
    RemoteCreated,
    Committed,
}

impl ProvisioningStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Checked => "checked",
            Self::TxOpen => "tx_open",
            Self::LocalCreated => "local_created",
            Self::LocalReadBack => "local_read_back",
            Self::RemoteCreated => "remote_created",
            Self::Committed => "committed",
        }
    }
}

/// Transaction scope owned by one saga invocation.
///
/// `begin` is idempotent; `commit` and `rollback` are no-ops when nothing is
/// open. Dropping the scope with a transaction still open discards it.
struct SagaScope<'a, S: ?Sized> {
    store: &'a S,
    transaction: Option<Box<dyn IdentityTransaction>>,
}

impl<'a, S> SagaScope<'a, S>
where
    S: IdentityStore + ?Sized,
{
    fn new(store: &'a S) -> Self {
        Self {
            store,
            transaction: None,
        }
    }

    async fn begin(&mut self) -> Result<&mut Box<dyn IdentityTransaction>, IdentityStoreError> {
        let transaction = match self.transaction.take() {
            Some(open) => open,
            None => self.store.begin().await?,
        };
        Ok(self.transaction.insert(transaction))
    }

    fn is_open(&self) -> bool {
        self.transaction.is_some()
    }

    async fn commit(&mut self) -> Result<(), IdentityStoreError> {
        match self.transaction.take() {
            Some(transaction) => transaction.commit().await,
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<(), IdentityStoreError> {
        match self.transaction.take() {
            Some(transaction) => transaction.rollback().await,
            None => Ok(()),
        }
    }
}

/// Provisioning saga implementing the [`UserProvisioning`] driving port.
pub struct UserProvisioningService<S: ?Sized, P: ?Sized> {
    identity_store: Arc<S>,
    profile_service: Arc<P>,
    profile_timeout: Duration,
}

impl<S: ?Sized, P: ?Sized> Clone for UserProvisioningService<S, P> {
    fn clone(&self) -> Self {
        Self {
            identity_store: Arc::clone(&self.identity_store),
            profile_service: Arc::clone(&self.profile_service),
            profile_timeout: self.profile_timeout,
        }
    }
}

impl<S: ?Sized, P: ?Sized> UserProvisioningService<S, P> {
    /// Create a saga using [`DEFAULT_PROFILE_TIMEOUT`].
    pub fn new(identity_store: Arc<S>, profile_service: Arc<P>) -> Self {
        Self {
            identity_store,
            profile_service,
            profile_timeout: DEFAULT_PROFILE_TIMEOUT,
        }
    }

    /// Override the deadline applied to the remote profile call.
    pub fn with_profile_timeout(mut self, timeout: Duration) -> Self {
        self.profile_timeout = timeout;
        self
    }
}

impl<S, P> UserProvisioningService<S, P>
where
    S: IdentityStore + ?Sized,
    P: ProfileService + ?Sized,
{
    async fn provision(
        &self,
        scope: &mut SagaScope<'_, S>,
        request: &UserCreationRequest,
        password: Option<&Password>,
    ) -> Result<IdentityRecord, Error> {
        let email = request.email();
        let existing = self.identity_store.find_by_email(email).await.map_err(|err| {
            error!(error = %err, "pre-check lookup failed");
            Error::internal("failed checking for an existing user")
        })?;
        if existing.is_some() {
            return Err(Error::conflict(DUPLICATE_EMAIL_MESSAGE));
        }
        log_stage(ProvisioningStage::Checked, None);

        let transaction = scope.begin().await.map_err(|err| {
            error!(error = %err, "failed to open identity transaction");
            Error::internal("failed opening identity transaction")
        })?;
        log_stage(ProvisioningStage::TxOpen, None);

        let user_id = transaction
            .create(email, password)
            .await
            .map_err(|err| match err {
                IdentityStoreError::DuplicateEmail { .. } => {
                    Error::conflict(DUPLICATE_EMAIL_MESSAGE)
                }
                other => {
                    error!(error = %other, "local identity creation failed");
                    Error::internal("failed creating local identity; rolling back")
                }
            })?;
        log_stage(ProvisioningStage::LocalCreated, Some(user_id));

        let record = match transaction.find_by_id(&user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                error!(%user_id, "created identity missing on read-back");
                return Err(Error::internal(
                    "failed reading back created identity; rolling back",
                ));
            }
            Err(err) => {
                error!(%user_id, error = %err, "identity read-back failed");
                return Err(Error::internal(
                    "failed reading back created identity; rolling back",
                ));
            }
        };
        log_stage(ProvisioningStage::LocalReadBack, Some(user_id));

        self.create_remote_profile(user_id, request).await?;
        log_stage(ProvisioningStage::RemoteCreated, Some(user_id));

        scope.commit().await.map_err(|err| {
            // The remote profile already exists at this point.
            warn!(%user_id, error = %err, orphaned_profile = true, "commit failed after profile creation");
            Error::internal("failed committing user")
        })?;
        log_stage(ProvisioningStage::Committed, Some(user_id));

        Ok(record)
    }

    async fn create_remote_profile(
        &self,
        user_id: UserId,
        request: &UserCreationRequest,
    ) -> Result<(), Error> {
        let profile_request = CreateProfileRequest::for_user(user_id, request);
        let outcome = tokio::time::timeout(
            self.profile_timeout,
            self.profile_service.create_profile(&profile_request),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ProfileServiceError::timeout(format!(
                "no response within {} ms",
                self.profile_timeout.as_millis()
            )))
        });

        match outcome {
            Ok(response) if response.succeeded => Ok(()),
            Ok(_) => {
                warn!(%user_id, "profile service reported failure");
                Err(Error::internal(PROFILE_FAILED_MESSAGE))
            }
            Err(err) if err.is_ambiguous() => {
                warn!(
                    %user_id,
                    error = %err,
                    ambiguous = true,
                    "profile outcome unknown; treating as failure"
                );
                Err(Error::internal(PROFILE_FAILED_MESSAGE))
            }
            Err(err) => {
                warn!(%user_id, error = %err, "profile service call failed");
                Err(Error::internal(PROFILE_FAILED_MESSAGE))
            }
        }
    }
}

fn log_stage(stage: ProvisioningStage, user_id: Option<UserId>) {
    match user_id {
        Some(user_id) => debug!(stage = stage.as_str(), %user_id, "provisioning step completed"),
        None => debug!(stage = stage.as_str(), "provisioning step completed"),
    }
}

async fn roll_back<S>(scope: &mut SagaScope<'_, S>, reason: &Error)
where
    S: IdentityStore + ?Sized,
{
    if !scope.is_open() {
        return;
    }
    match scope.rollback().await {
        Ok(()) => warn!(reason = %reason, "identity transaction rolled back"),
        Err(err) => error!(reason = %reason, error = %err, "identity rollback failed"),
    }
}

#[async_trait]
impl<S, P> UserProvisioning for UserProvisioningService<S, P>
where
    S: IdentityStore + ?Sized,
    P: ProfileService + ?Sized,
{
    async fn create_user(
        &self,
        request: UserCreationRequest,
        password: Option<Password>,
    ) -> Envelope<ProvisionedUser> {
        log_stage(ProvisioningStage::Start, None);
        let mut scope = SagaScope::new(self.identity_store.as_ref());
        let attempt = AssertUnwindSafe(self.provision(&mut scope, &request, password.as_ref()))
            .catch_unwind()
            .await;

        let error = match attempt {
            Ok(Ok(record)) => return Envelope::created(ProvisionedUser::from(&record)),
            Ok(Err(error)) => error,
            Err(_) => {
                error!("provisioning aborted by an unexpected fault");
                Error::internal("unexpected fault while creating user; rolled back")
            }
        };
        roll_back(&mut scope, &error).await;
        Envelope::failed(error)
    }

    async fn login_user(&self, credentials: LoginCredentials) -> Envelope<AuthenticatedUser> {
        match self.identity_store.verify_credentials(&credentials).await {
            Ok(Some(record)) => Envelope::ok_with(AuthenticatedUser::from(&record)),
            Ok(None) => Envelope::unauthorized(AUTHENTICATION_FAILED_MESSAGE),
            Err(err) => {
                error!(error = %err, "credential verification failed");
                Envelope::internal_error("failed verifying credentials")
            }
        }
    }

    async fn find_user(&self, id: UserId) -> Envelope<ProvisionedUser> {
        match self.identity_store.find_by_id(&id).await {
            Ok(Some(record)) => Envelope::ok_with(ProvisionedUser::from(&record)),
            Ok(None) => Envelope::not_found(USER_NOT_FOUND_MESSAGE),
            Err(err) => {
                error!(user_id = %id, error = %err, "user lookup failed");
                Envelope::internal_error("failed looking up user")
            }
        }
    }
}

#[cfg(test)]
#[path = "provisioning_service_tests.rs"]
mod tests;
