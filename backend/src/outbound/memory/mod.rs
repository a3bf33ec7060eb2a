//! In-process adapters used when no external infrastructure is configured.

mod in_memory_identity_store;

pub use in_memory_identity_store::InMemoryIdentityStore;
