//! Plugin Profiles
//!
//! The checkout ships in a few variants that differ only in naming: where the
//! settings blob is stored, which REST namespace the endpoint lives under, and
//! what the page embed is called.

use serde::{Deserialize, Serialize};

/// Naming for one checkout variant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginProfile {
    /// Short slug (`spc`, `sspc`, `secwp`)
    pub slug: String,

    /// Key the settings record is persisted under
    pub option_name: String,

    /// First path segment of the REST routes
    pub rest_namespace: String,

    /// Id of the container element the widget mounts into. Also the name of
    /// the client-side global configuration object.
    pub container_id: String,

    /// Shortcode tag that expands to the container
    pub shortcode_tag: String,
}

impl PluginProfile {
    fn from_slug(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            option_name: format!("{slug}_settings"),
            rest_namespace: "stripe-embedded".into(),
            container_id: slug.to_string(),
            shortcode_tag: format!("{slug}_embedded_checkout"),
        }
    }

    /// Simple Payment Checkout
    pub fn simple_payment_checkout() -> Self {
        Self::from_slug("spc")
    }

    /// Suprematrix Simple Payment Checkout
    pub fn suprematrix() -> Self {
        Self::from_slug("sspc")
    }

    /// Stripe Embedded Checkout
    pub fn stripe_embedded_checkout() -> Self {
        Self::from_slug("secwp")
    }

    /// Look up a built-in profile by slug
    pub fn by_slug(slug: &str) -> Option<Self> {
        match slug.to_lowercase().as_str() {
            "spc" => Some(Self::simple_payment_checkout()),
            "sspc" => Some(Self::suprematrix()),
            "secwp" => Some(Self::stripe_embedded_checkout()),
            _ => None,
        }
    }

    /// `/<namespace>/v1/create-session`
    pub fn create_session_path(&self) -> String {
        format!("/{}/v1/create-session", self.rest_namespace)
    }

    /// `/<namespace>/v1/config`
    pub fn config_path(&self) -> String {
        format!("/{}/v1/config", self.rest_namespace)
    }

    /// `/<namespace>/v1/embed`
    pub fn embed_path(&self) -> String {
        format!("/{}/v1/embed", self.rest_namespace)
    }
}

impl Default for PluginProfile {
    fn default() -> Self {
        Self::simple_payment_checkout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let spc = PluginProfile::by_slug("spc").unwrap();
        assert_eq!(spc.option_name, "spc_settings");
        assert_eq!(spc.shortcode_tag, "spc_embedded_checkout");
        assert_eq!(spc.create_session_path(), "/stripe-embedded/v1/create-session");

        let sspc = PluginProfile::by_slug("SSPC").unwrap();
        assert_eq!(sspc.container_id, "sspc");

        assert!(PluginProfile::by_slug("woo").is_none());
    }
}
