//! PostgreSQL-backed [`IdentityStore`] using Diesel.
//!
//! Each [`IdentityTransaction`] owns a pooled connection with an open
//! `BEGIN`. The unique index on `identities.email` is the source of truth for
//! email uniqueness; violations surface as
//! [`IdentityStoreError::DuplicateEmail`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use uuid::Uuid;

use crate::domain::ports::{IdentityStore, IdentityStoreError, IdentityTransaction};
use crate::domain::{EmailAddress, IdentityRecord, LoginCredentials, Password, UserId};
use crate::outbound::password::{hash_password, verify_password};

use super::identity_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{IdentityRow, NewIdentityRow};
use super::pool::{DbPool, OwnedConnection};
use super::schema::identities;

/// Diesel implementation of the identity store port.
#[derive(Clone)]
pub struct DieselIdentityStore {
    pool: DbPool,
}

impl DieselIdentityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: IdentityRow) -> Result<IdentityRecord, IdentityStoreError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| IdentityStoreError::query(format!("stored email is invalid: {err}")))?;
    Ok(IdentityRecord::new(
        UserId::from_uuid(row.id),
        email,
        row.created_at,
        row.email_confirmed,
    ))
}

async fn load_by_id(
    conn: &mut AsyncPgConnection,
    id: &UserId,
) -> Result<Option<IdentityRecord>, IdentityStoreError> {
    identities::table
        .filter(identities::id.eq(id.as_uuid()))
        .select(IdentityRow::as_select())
        .first::<IdentityRow>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, None))?
        .map(row_to_record)
        .transpose()
}

async fn load_row_by_email(
    conn: &mut AsyncPgConnection,
    email: &str,
) -> Result<Option<IdentityRow>, IdentityStoreError> {
    identities::table
        .filter(identities::email.eq(email))
        .select(IdentityRow::as_select())
        .first::<IdentityRow>(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, None))
}

#[async_trait]
impl IdentityStore for DieselIdentityStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_row_by_email(&mut conn, email.as_ref())
            .await?
            .map(row_to_record)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_by_id(&mut conn, id).await
    }

    async fn begin(&self) -> Result<Box<dyn IdentityTransaction>, IdentityStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;
        Ok(Box::new(DieselIdentityTransaction { conn }))
    }

    async fn verify_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        let row = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            load_row_by_email(&mut conn, credentials.email()).await?
        };
        let Some(row) = row else {
            return Ok(None);
        };
        let Some(hash) = row.password_hash.clone() else {
            return Ok(None);
        };

        let matches = verify_password(credentials.password(), &hash)
            .await
            .map_err(|err| IdentityStoreError::credentials(err.to_string()))?;
        if matches {
            row_to_record(row).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Open transaction on a dedicated connection.
struct DieselIdentityTransaction {
    conn: OwnedConnection,
}

#[async_trait]
impl IdentityTransaction for DieselIdentityTransaction {
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

        let row = NewIdentityRow {
            id: Uuid::new_v4(),
            email: email.as_ref(),
            password_hash: password_hash.as_deref(),
        };
        diesel::insert_into(identities::table)
            .values(&row)
            .execute(&mut *self.conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(email.as_ref())))?;
        Ok(UserId::from_uuid(row.id))
    }

    async fn find_by_id(
        &mut self,
        id: &UserId,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        load_by_id(&mut self.conn, id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), IdentityStoreError> {
        let mut transaction = self;
        AnsiTransactionManager::commit_transaction(&mut *transaction.conn)
            .await
            .map_err(|err| map_diesel_error(err, None))
    }

    async fn rollback(self: Box<Self>) -> Result<(), IdentityStoreError> {
        let mut transaction = self;
        AnsiTransactionManager::rollback_transaction(&mut *transaction.conn)
            .await
            .map_err(|err| map_diesel_error(err, None))
    }
}
