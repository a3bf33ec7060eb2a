//! PostgreSQL persistence for identity records.
//!
//! Adapters translate between Diesel rows and domain types and contain no
//! business logic. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module.
//!
//! # Example
//!
//! ```ignore
//! use accounts::outbound::persistence::{DbPool, DieselIdentityStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/accounts")).await?;
//! let store = DieselIdentityStore::new(pool);
//! ```

mod diesel_identity_store;
mod identity_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_identity_store::DieselIdentityStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
