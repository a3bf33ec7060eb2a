//! Driven port for the local identity store.
//!
//! The store owns unique-email enforcement, credential hashing and sign-in
//! verification. Writes happen inside an [`IdentityTransaction`] obtained from
//! [`IdentityStore::begin`]; the transaction value is owned by a single saga
//! invocation and consumed by `commit` or `rollback`.

use async_trait::async_trait;

use crate::domain::{EmailAddress, IdentityRecord, LoginCredentials, Password, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity store adapters.
    pub enum IdentityStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "identity store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "identity store query failed: {message}",
        /// The unique-email constraint rejected a write.
        DuplicateEmail { email: String } => "an identity already exists for {email}",
        /// Password hashing or verification failed unexpectedly.
        Credentials { message: String } => "credential processing failed: {message}",
    }
}

/// Read access, transaction creation and credential checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a committed identity by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError>;

    /// Look up a committed identity by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityRecord>, IdentityStoreError>;

    /// Open a transaction scope for writes.
    async fn begin(&self) -> Result<Box<dyn IdentityTransaction>, IdentityStoreError>;

    /// Verify credentials against committed identities.
    ///
    /// Returns `Ok(None)` for an unknown email and for a wrong password alike.
    async fn verify_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError>;
}

/// Write scope over the identity store.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait IdentityTransaction: Send {
    /// Create an identity, hashing `password` when supplied.
    ///
    /// A concurrent or earlier writer holding the same email yields
    /// [`IdentityStoreError::DuplicateEmail`].
    async fn create(
        &mut self,
        email: &EmailAddress,
        password: Option<&Password>,
    ) -> Result<UserId, IdentityStoreError>;

    /// Read an identity through this transaction, including uncommitted writes.
    async fn find_by_id(
        &mut self,
        id: &UserId,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError>;

    /// Make the writes durable.
    async fn commit(self: Box<Self>) -> Result<(), IdentityStoreError>;

    /// Discard the writes.
    async fn rollback(self: Box<Self>) -> Result<(), IdentityStoreError>;
}
