//! Embedded PostgreSQL databases for the Diesel identity store suite.
//!
//! Each call clones a fresh temporary database from a template that the
//! crate's embedded migrations were applied to, so the schema under test is
//! the one production runs. Set `SKIP_TEST_CLUSTER=1` to skip suites where
//! the cluster cannot start.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use accounts::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;
use uuid::Uuid;

const TEMPLATE_NAME_PREFIX: &str = "accounts_template";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A migrated temporary database with a small pool in front of it.
pub struct MigratedDatabase {
    pub pool: DbPool,
    _database: TemporaryDatabase,
}

/// Returns true when `SKIP_TEST_CLUSTER` is set to a truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed; otherwise fail loudly so CI breakage is
/// not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Creates the migrated template once per schema revision and returns its name.
fn ensure_template_database(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let hash = hash_directory(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"))
        .map_err(|err| format!("hash migrations: {err:?}"))?;
    let template_name = format!(
        "{TEMPLATE_NAME_PREFIX}_{}",
        hash.get(..8).unwrap_or(hash.as_str())
    );
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        runtime
            .block_on(run_pending_migrations(&url))
            .map_err(|err| err.to_string())?;
    }
    Ok(template_name)
}

/// Provision a temporary database cloned from the migrated template.
pub fn migrated_database(runtime: &Runtime) -> Result<MigratedDatabase, String> {
    let cluster = pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
        .map_err(|err| format!("start shared cluster: {err:?}"))?;
    let template_name = ensure_template_database(cluster, runtime)?;
    let database = cluster
        .temporary_database_from_template(
            format!("test_{}", Uuid::new_v4()).as_str(),
            template_name.as_str(),
        )
        .map_err(|err| format!("create database from template: {err:?}"))?;

    let pool = runtime
        .block_on(DbPool::new(
            PoolConfig::new(database.url())
                .with_max_size(2)
                .with_min_idle(Some(1)),
        ))
        .map_err(|err| err.to_string())?;

    Ok(MigratedDatabase {
        pool,
        _database: database,
    })
}
