//! Diesel and pool error mapping for the identity store.
//!
//! Messages keep driver diagnostics for logs; the saga never forwards them to
//! callers.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::IdentityStoreError;

use super::pool::PoolError;

pub(super) fn map_pool_error(error: PoolError) -> IdentityStoreError {
    IdentityStoreError::connection(error.into_message())
}

/// Map a Diesel error; `email` names the address when the unique index fires.
pub(super) fn map_diesel_error(error: DieselError, email: Option<&str>) -> IdentityStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => match email {
            Some(email) => IdentityStoreError::duplicate_email(email),
            None => IdentityStoreError::query(info.message().to_owned()),
        },
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            IdentityStoreError::connection("database connection closed")
        }
        DieselError::DatabaseError(_, info) => IdentityStoreError::query(info.message().to_owned()),
        DieselError::NotFound => IdentityStoreError::query("record not found"),
        other => IdentityStoreError::query(other.to_string()),
    }
}
