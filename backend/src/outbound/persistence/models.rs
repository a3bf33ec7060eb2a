//! Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::identities;

/// Row read from `identities`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdentityRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

/// Row inserted into `identities`; the database stamps `created_at`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = identities)]
pub(crate) struct NewIdentityRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
}
