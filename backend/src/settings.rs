//! Process configuration loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `ACCOUNTS_*` environment variables and
//! configuration files. Optional collaborators fall back to in-process
//! implementations when their location is not configured.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Top-level application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Base URL of the profile service; absent selects the in-process fixture.
    pub profile_service_url: Option<String>,
    /// Upper bound on a single profile call, in milliseconds.
    #[ortho_config(default = 5000)]
    pub profile_timeout_ms: u64,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid profile service URL {value}: {source}")]
    ProfileServiceUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("profile timeout must be greater than zero")]
    ZeroProfileTimeout,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Configured database URL with blank values treated as absent.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Parsed profile service base URL, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ProfileServiceUrl`] for an unparsable URL.
    pub fn profile_service_url(&self) -> Result<Option<url::Url>, SettingsError> {
        let Some(raw) = self
            .profile_service_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        else {
            return Ok(None);
        };
        url::Url::parse(raw)
            .map(Some)
            .map_err(|source| SettingsError::ProfileServiceUrl {
                value: raw.to_owned(),
                source,
            })
    }

    /// Profile call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroProfileTimeout`] for a zero value.
    pub fn profile_timeout(&self) -> Result<Duration, SettingsError> {
        match self.profile_timeout_ms {
            0 => Err(SettingsError::ZeroProfileTimeout),
            ms => Ok(Duration::from_millis(ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::DEFAULT_PROFILE_TIMEOUT;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "ACCOUNTS_BIND_ADDR",
        "ACCOUNTS_DATABASE_URL",
        "ACCOUNTS_PROFILE_SERVICE_URL",
        "ACCOUNTS_PROFILE_TIMEOUT_MS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("accounts")]).expect("config should load")
    }

    #[rstest]
    fn defaults_select_in_process_collaborators() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid literal")
        );
        assert!(settings.database_url().is_none());
        assert!(settings.profile_service_url().expect("absent URL").is_none());
        assert_eq!(
            settings.profile_timeout().expect("default timeout"),
            DEFAULT_PROFILE_TIMEOUT
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACCOUNTS_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "ACCOUNTS_DATABASE_URL",
                Some("postgres://localhost/accounts".to_owned()),
            ),
            (
                "ACCOUNTS_PROFILE_SERVICE_URL",
                Some("http://profiles.internal/api".to_owned()),
            ),
            ("ACCOUNTS_PROFILE_TIMEOUT_MS", Some("250".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:9090"
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/accounts")
        );
        assert_eq!(
            settings
                .profile_service_url()
                .expect("valid URL")
                .map(|url| url.to_string()),
            Some("http://profiles.internal/api".to_owned())
        );
        assert_eq!(
            settings.profile_timeout().expect("timeout"),
            Duration::from_millis(250)
        );
    }

    #[rstest]
    fn blank_database_url_is_treated_as_absent() {
        let _guard = lock_env([
            ("ACCOUNTS_BIND_ADDR", None),
            ("ACCOUNTS_DATABASE_URL", Some("   ".to_owned())),
            ("ACCOUNTS_PROFILE_SERVICE_URL", None),
            ("ACCOUNTS_PROFILE_TIMEOUT_MS", None),
        ]);

        assert!(load_from_empty_args().database_url().is_none());
    }

    fn settings_with(bind_addr: Option<&str>, profile_timeout_ms: u64) -> AppSettings {
        AppSettings {
            bind_addr: bind_addr.map(str::to_owned),
            database_url: None,
            profile_service_url: None,
            profile_timeout_ms,
        }
    }

    #[rstest]
    fn invalid_bind_address_is_reported() {
        let settings = settings_with(Some("nowhere"), 5000);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        let settings = settings_with(None, 0);
        assert!(matches!(
            settings.profile_timeout(),
            Err(SettingsError::ZeroProfileTimeout)
        ));
    }

    #[rstest]
    fn malformed_profile_url_is_reported() {
        let mut settings = settings_with(None, 5000);
        settings.profile_service_url = Some("not a url".to_owned());
        assert!(matches!(
            settings.profile_service_url(),
            Err(SettingsError::ProfileServiceUrl { .. })
        ));
    }
}
