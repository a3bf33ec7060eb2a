//! Accounts service entry-point: loads settings, selects adapters, seeds the
//! default administrator and serves the provisioning API.

mod server;

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use accounts::default_admin::{DefaultAdminSettings, seed_default_admin_on_startup};
use accounts::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use accounts::settings::AppSettings;

use server::{ServerConfig, build_ports, create_server};

fn load_settings() -> std::io::Result<(AppSettings, DefaultAdminSettings)> {
    let args: Vec<OsString> = std::env::args_os().take(1).collect();
    let app = AppSettings::load_from_iter(args.clone())
        .map_err(|err| std::io::Error::other(format!("settings: {err}")))?;
    let admin = DefaultAdminSettings::load_from_iter(args)
        .map_err(|err| std::io::Error::other(format!("default admin settings: {err}")))?;
    Ok((app, admin))
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let profile_timeout = settings.profile_timeout().map_err(std::io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr).with_profile_timeout(profile_timeout);

    if let Some(url) = settings.profile_service_url().map_err(std::io::Error::other)? {
        config = config.with_profile_service(url);
    }

    if let Some(database_url) = settings.database_url() {
        let applied = run_pending_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let (settings, admin_settings) = load_settings()?;
    let config = build_server_config(&settings).await?;
    let ports = build_ports(&config)?;

    seed_default_admin_on_startup(
        &admin_settings,
        ports.identity_store.as_ref(),
        ports.provisioning.as_ref(),
    )
    .await
    .map_err(std::io::Error::other)?;

    let server = create_server(&config, &ports)?;
    info!(bind_addr = %config.bind_addr, "accounts service listening");
    server.await
}
