//! Server Configuration
//!
//! Read from the environment (a `.env` file is loaded first).

use std::path::PathBuf;

use checkout_payments::validation::is_valid_url;
use checkout_payments::PluginProfile;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown checkout profile: {0} (expected spc, sspc or secwp)")]
    UnknownProfile(String),

    #[error("SITE_URL is not a valid absolute URL: {0}")]
    InvalidSiteUrl(String),

    #[error("{name} must be true or false, got {value}")]
    InvalidFlag { name: &'static str, value: String },

    #[error("Unknown checkout provider: {0} (expected stripe or mock)")]
    UnknownProvider(String),
}

/// Which payment provider backs the session endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Stripe,
    /// Offline demo: every session succeeds with the given client secret
    Mock { client_secret: String },
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub site_url: String,
    pub profile: PluginProfile,
    /// JSON store directory; `None` keeps settings in memory
    pub settings_dir: Option<PathBuf>,
    pub multisite: bool,
    /// Bearer token for the admin routes; `None` disables them
    pub admin_token: Option<String>,
    /// Browser checkout script referenced by the embed snippet
    pub script_url: Option<String>,
    pub provider: ProviderKind,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let site_url = var("SITE_URL").unwrap_or_else(|| "http://localhost:3000".into());
        if !is_valid_url(&site_url) {
            return Err(ConfigError::InvalidSiteUrl(site_url));
        }

        let profile_slug = var("CHECKOUT_PROFILE").unwrap_or_else(|| "spc".into());
        let profile = PluginProfile::by_slug(&profile_slug)
            .ok_or(ConfigError::UnknownProfile(profile_slug))?;

        let multisite = match var("MULTISITE") {
            None => false,
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidFlag { name: "MULTISITE", value }),
            },
        };

        let provider = match var("CHECKOUT_PROVIDER").as_deref() {
            None | Some("stripe") => ProviderKind::Stripe,
            Some("mock") => ProviderKind::Mock {
                client_secret: var("MOCK_CLIENT_SECRET")
                    .unwrap_or_else(|| "cs_test_mock_secret".into()),
            },
            Some(other) => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            site_url,
            profile,
            settings_dir: var("SETTINGS_DIR").map(PathBuf::from),
            multisite,
            admin_token: var("ADMIN_TOKEN"),
            script_url: var("CHECKOUT_SCRIPT_URL"),
            provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.profile, PluginProfile::simple_payment_checkout());
        assert!(config.settings_dir.is_none());
        assert!(config.admin_token.is_none());
        assert!(!config.multisite);
        assert_eq!(config.provider, ProviderKind::Stripe);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SITE_URL", "https://shop.example.com"),
            ("CHECKOUT_PROFILE", "sspc"),
            ("SETTINGS_DIR", "/var/lib/checkout"),
            ("MULTISITE", "true"),
            ("ADMIN_TOKEN", "s3cret"),
            ("CHECKOUT_PROVIDER", "mock"),
        ])
        .unwrap();
        assert_eq!(config.profile.option_name, "sspc_settings");
        assert_eq!(config.settings_dir, Some(PathBuf::from("/var/lib/checkout")));
        assert!(config.multisite);
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert!(matches!(config.provider, ProviderKind::Mock { .. }));
    }

    #[test]
    fn test_blank_token_disables_admin() {
        assert!(config(&[("ADMIN_TOKEN", "  ")]).unwrap().admin_token.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            config(&[("CHECKOUT_PROFILE", "woo")]).unwrap_err(),
            ConfigError::UnknownProfile("woo".into())
        );
        assert!(matches!(
            config(&[("SITE_URL", "shop.example.com")]),
            Err(ConfigError::InvalidSiteUrl(_))
        ));
        assert!(matches!(
            config(&[("MULTISITE", "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
        assert!(matches!(
            config(&[("CHECKOUT_PROVIDER", "paypal")]),
            Err(ConfigError::UnknownProvider(_))
        ));
    }
}
