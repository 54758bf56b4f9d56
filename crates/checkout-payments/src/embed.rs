//! Page Embedding
//!
//! Produces what the page needs to mount the widget: the client-side
//! configuration object, the container element and the shortcode expansion.

use serde::{Deserialize, Serialize};

use crate::profile::PluginProfile;
use crate::settings::Settings;

/// Stripe.js, loaded before the checkout script
pub const STRIPE_JS_URL: &str = "https://js.stripe.com/v3/";

/// Configuration object the browser script reads
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Active publishable key, empty when not configured
    pub publishable_key: String,

    /// Absolute URL of the session endpoint
    pub create_session_url: String,
}

impl ClientConfig {
    pub fn new(settings: &Settings, profile: &PluginProfile, site_url: &str) -> Self {
        Self {
            publishable_key: settings.active_keys().publishable_key,
            create_session_url: format!(
                "{}{}",
                site_url.trim_end_matches('/'),
                profile.create_session_path()
            ),
        }
    }
}

/// `var <global> = {...};`
pub fn localize_script(profile: &PluginProfile, config: &ClientConfig) -> String {
    // serde_json leaves '/' alone; keep "</script>" out of the literal
    let json = serde_json::to_string(config)
        .unwrap_or_else(|_| "{}".into())
        .replace("</", "<\\/");
    format!("var {} = {};", profile.container_id, json)
}

/// Element the widget mounts into
pub fn container_html(profile: &PluginProfile) -> String {
    format!(r#"<div id="{}"></div>"#, profile.container_id)
}

/// Replace every `[<tag>]` in authored content with the container
pub fn expand_shortcodes(content: &str, profile: &PluginProfile) -> String {
    let container = container_html(profile);
    content
        .replace(&format!("[{}]", profile.shortcode_tag), &container)
        .replace(&format!("[{} /]", profile.shortcode_tag), &container)
}

/// Full embed fragment: configuration, scripts, container
pub fn embed_snippet(
    profile: &PluginProfile,
    config: &ClientConfig,
    script_url: Option<&str>,
) -> String {
    let mut html = format!(
        "<script>{}</script>\n<script src=\"{}\"></script>\n",
        localize_script(profile, config),
        STRIPE_JS_URL
    );
    if let Some(src) = script_url {
        html.push_str(&format!("<script src=\"{}\"></script>\n", src.replace('"', "%22")));
    }
    html.push_str(&container_html(profile));
    html
}
