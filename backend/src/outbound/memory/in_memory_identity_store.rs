//! Process-local identity store used when no database is configured.
//!
//! Writes are staged per transaction and only become visible to other callers
//! on commit. An email is reserved as soon as a transaction creates it, so a
//! concurrent writer for the same address fails with
//! [`IdentityStoreError::DuplicateEmail`] the way a unique index would.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{IdentityStore, IdentityStoreError, IdentityTransaction};
use crate::domain::{EmailAddress, IdentityRecord, LoginCredentials, Password, UserId};
use crate::outbound::password::{hash_password, verify_password};

#[derive(Debug, Clone)]
struct StoredIdentity {
    record: IdentityRecord,
    password_hash: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    committed: HashMap<UserId, StoredIdentity>,
    reserved_emails: HashSet<EmailAddress>,
}

impl StoreState {
    fn committed_by_email(&self, email: &str) -> Option<&StoredIdentity> {
        self.committed
            .values()
            .find(|stored| stored.record.email().as_ref() == email)
    }
}

type SharedState = Arc<Mutex<StoreState>>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, StoreState>, IdentityStoreError> {
    state
        .lock()
        .map_err(|_| IdentityStoreError::connection("in-memory identity store lock poisoned"))
}

/// In-memory [`IdentityStore`].
#[derive(Clone)]
pub struct InMemoryIdentityStore {
    state: SharedState,
    clock: Arc<dyn Clock>,
}

impl InMemoryIdentityStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: SharedState::default(),
            clock,
        }
    }

    /// Number of committed identities.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError::Connection`] when the store lock is
    /// poisoned.
    pub fn committed_count(&self) -> Result<usize, IdentityStoreError> {
        lock(&self.state).map(|state| state.committed.len())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let state = lock(&self.state)?;
        Ok(state
            .committed_by_email(email.as_ref())
            .map(|stored| stored.record.clone()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let state = lock(&self.state)?;
        Ok(state.committed.get(id).map(|stored| stored.record.clone()))
    }

    async fn begin(&self) -> Result<Box<dyn IdentityTransaction>, IdentityStoreError> {
        Ok(Box::new(InMemoryTransaction {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
            staged: Vec::new(),
        }))
    }

    async fn verify_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let candidate = {
            let state = lock(&self.state)?;
            state.committed_by_email(credentials.email()).cloned()
        };
        let Some(StoredIdentity {
            record,
            password_hash: Some(hash),
        }) = candidate
        else {
            return Ok(None);
        };

        let matches = verify_password(credentials.password(), &hash)
            .await
            .map_err(|err| IdentityStoreError::credentials(err.to_string()))?;
        Ok(matches.then_some(record))
    }
}

/// Staged writes of one in-memory transaction.
struct InMemoryTransaction {
    state: SharedState,
    clock: Arc<dyn Clock>,
    staged: Vec<StoredIdentity>,
}

impl InMemoryTransaction {
    fn release_reservations(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            for stored in self.staged.drain(..) {
                state.reserved_emails.remove(stored.record.email());
            }
        }
    }
}

#[async_trait]
impl IdentityTransaction for InMemoryTransaction {
    async fn create(
        &mut self,
        email: &EmailAddress,
        password: Option<&Password>,
    ) -> Result<UserId, IdentityStoreError> {
        let password_hash = match password {
            Some(password) => Some(
                hash_password(password)
                    .await
                    .map_err(|err| IdentityStoreError::credentials(err.to_string()))?,
            ),
            None => None,
        };

        let mut state = lock(&self.state)?;
        if state.reserved_emails.contains(email)
            || state.committed_by_email(email.as_ref()).is_some()
        {
            return Err(IdentityStoreError::duplicate_email(email.as_ref()));
        }
        state.reserved_emails.insert(email.clone());
        drop(state);

        let id = UserId::random();
        let record = IdentityRecord::new(id, email.clone(), self.clock.utc(), false);
        self.staged.push(StoredIdentity {
            record,
            password_hash,
        });
        debug!(user_id = %id, "staged in-memory identity");
        Ok(id)
    }

    async fn find_by_id(
        &mut self,
        id: &UserId,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        if let Some(staged) = self.staged.iter().find(|stored| stored.record.id() == *id) {
            return Ok(Some(staged.record.clone()));
        }
        let state = lock(&self.state)?;
        Ok(state.committed.get(id).map(|stored| stored.record.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), IdentityStoreError> {
        let mut transaction = self;
        let mut state = lock(&transaction.state)?;
        for stored in transaction.staged.drain(..) {
            state.reserved_emails.remove(stored.record.email());
            state.committed.insert(stored.record.id(), stored);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), IdentityStoreError> {
        let mut transaction = self;
        transaction.release_reservations();
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        self.release_reservations();
    }
}
