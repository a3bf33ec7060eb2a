//! Startup wiring for default administrator seeding.

mod config;
mod startup;

pub use config::DefaultAdminSettings;
pub use startup::{SeedOutcome, StartupError, seed_default_admin_on_startup};
