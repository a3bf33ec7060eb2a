//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL identity store using Diesel.
//! - **memory**: in-process identity store for database-less runs and tests.
//! - **profile**: reqwest client for the remote profile service.
//! - **password**: Argon2id hashing shared by the identity stores.
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod memory;
pub mod password;
pub mod persistence;
pub mod profile;
