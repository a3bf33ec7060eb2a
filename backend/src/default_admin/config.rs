//! Default administrator configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_FIRST_NAME: &str = "Default";
const DEFAULT_LAST_NAME: &str = "Administrator";

/// Account created at startup when no identity exists for `email`.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEFAULT_ADMIN")]
pub struct DefaultAdminSettings {
    /// Enable seeding on startup.
    #[ortho_config(default = false)]
    pub enabled: bool,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl DefaultAdminSettings {
    pub fn first_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(DEFAULT_FIRST_NAME)
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_deref().unwrap_or(DEFAULT_LAST_NAME)
    }
}

impl std::fmt::Debug for DefaultAdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAdminSettings")
            .field("enabled", &self.enabled)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for default administrator configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "DEFAULT_ADMIN_ENABLED",
        "DEFAULT_ADMIN_EMAIL",
        "DEFAULT_ADMIN_PASSWORD",
        "DEFAULT_ADMIN_FIRST_NAME",
        "DEFAULT_ADMIN_LAST_NAME",
        "DEFAULT_ADMIN_PHONE_NUMBER",
        "DEFAULT_ADMIN_STREET_ADDRESS",
        "DEFAULT_ADMIN_POSTAL_CODE",
        "DEFAULT_ADMIN_CITY",
    ];

    fn load_from_empty_args() -> DefaultAdminSettings {
        DefaultAdminSettings::load_from_iter([OsString::from("accounts")])
            .expect("config should load")
    }

    #[rstest]
    fn seeding_is_disabled_by_default() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(!settings.enabled);
        assert!(settings.email.is_none());
        assert_eq!(settings.first_name(), DEFAULT_FIRST_NAME);
        assert_eq!(settings.last_name(), DEFAULT_LAST_NAME);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(VARS.map(|name| {
            let value = match name {
                "DEFAULT_ADMIN_ENABLED" => Some("true"),
                "DEFAULT_ADMIN_EMAIL" => Some("admin@example.com"),
                "DEFAULT_ADMIN_PASSWORD" => Some("hunter22"),
                "DEFAULT_ADMIN_FIRST_NAME" => Some("Grace"),
                "DEFAULT_ADMIN_CITY" => Some("Arlington"),
                _ => None,
            };
            (name, value.map(str::to_owned))
        }));

        let settings = load_from_empty_args();
        assert!(settings.enabled);
        assert_eq!(settings.email.as_deref(), Some("admin@example.com"));
        assert_eq!(settings.password.as_deref(), Some("hunter22"));
        assert_eq!(settings.first_name(), "Grace");
        assert_eq!(settings.last_name(), DEFAULT_LAST_NAME);
        assert_eq!(settings.city.as_deref(), Some("Arlington"));
    }

    #[rstest]
    fn debug_output_masks_password() {
        let settings = DefaultAdminSettings {
            enabled: true,
            email: Some("admin@example.com".to_owned()),
            password: Some("hunter22".to_owned()),
            first_name: None,
            last_name: None,
            phone_number: None,
            street_address: None,
            postal_code: None,
            city: None,
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("***"));
    }
}
