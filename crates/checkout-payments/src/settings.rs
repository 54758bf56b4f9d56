//! Checkout Settings
//!
//! The single settings record plus the active-key resolver.

use serde::{Deserialize, Serialize};

/// Placeholder the provider replaces with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Stored test-mode flag.
///
/// Older records hold the flag as `true`, `"1"` or `1`, so all three shapes
/// deserialize. Anything else (`null`, floats, objects) is kept as-is and
/// reads as live mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeFlag {
    Bool(bool),
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl ModeFlag {
    /// Tolerant truthiness: `true`, `"1"` and `1` enable test mode
    pub fn is_enabled(&self) -> bool {
        match self {
            ModeFlag::Bool(flag) => *flag,
            ModeFlag::Int(n) => *n == 1,
            ModeFlag::Text(s) => s == "1",
            ModeFlag::Other(_) => false,
        }
    }
}

impl Default for ModeFlag {
    fn default() -> Self {
        ModeFlag::Bool(true)
    }
}

impl From<bool> for ModeFlag {
    fn from(flag: bool) -> Self {
        ModeFlag::Bool(flag)
    }
}

/// Which credential pair is in use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Test,
    Live,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Test => "test",
            Mode::Live => "live",
        }
    }

    /// Required secret key prefix for this mode
    pub const fn secret_prefix(self) -> &'static str {
        match self {
            Mode::Test => "sk_test_",
            Mode::Live => "sk_live_",
        }
    }

    /// Required publishable key prefix for this mode
    pub const fn publishable_prefix(self) -> &'static str {
        match self {
            Mode::Test => "pk_test_",
            Mode::Live => "pk_live_",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted settings record.
///
/// Fields missing from a stored blob fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub test_mode: ModeFlag,
    pub test_secret_key: String,
    pub test_publishable_key: String,
    pub live_secret_key: String,
    pub live_publishable_key: String,
    pub return_url: String,
    pub price_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            test_mode: ModeFlag::default(),
            test_secret_key: String::new(),
            test_publishable_key: String::new(),
            live_secret_key: String::new(),
            live_publishable_key: String::new(),
            return_url: String::new(),
            price_id: String::new(),
        }
    }
}

impl Settings {
    /// Currently selected mode
    pub fn mode(&self) -> Mode {
        if self.test_mode.is_enabled() {
            Mode::Test
        } else {
            Mode::Live
        }
    }

    /// Keys of the active mode (see [`resolve_active_keys`])
    pub fn active_keys(&self) -> ActiveKeys {
        resolve_active_keys(self)
    }

    /// Configured return URL, or the site default when unset
    pub fn resolve_return_url(&self, site_url: &str) -> String {
        if self.return_url.is_empty() {
            default_return_url(site_url)
        } else {
            self.return_url.clone()
        }
    }
}

/// Key pair selected by the test-mode flag
#[derive(Clone, PartialEq, Eq)]
pub struct ActiveKeys {
    pub mode: Mode,
    pub secret_key: String,
    pub publishable_key: String,
}

impl ActiveKeys {
    /// Both members of the pair are present
    pub fn is_complete(&self) -> bool {
        !self.secret_key.is_empty() && !self.publishable_key.is_empty()
    }
}

impl std::fmt::Debug for ActiveKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveKeys")
            .field("mode", &self.mode)
            .field("secret_key", &if self.secret_key.is_empty() { "" } else { "[redacted]" })
            .field("publishable_key", &self.publishable_key)
            .finish()
    }
}

/// Pick the test or live pair.
///
/// Never falls back to the other mode: an empty key in the selected pair is
/// returned as empty.
pub fn resolve_active_keys(settings: &Settings) -> ActiveKeys {
    let mode = settings.mode();
    let (secret_key, publishable_key) = match mode {
        Mode::Test => (&settings.test_secret_key, &settings.test_publishable_key),
        Mode::Live => (&settings.live_secret_key, &settings.live_publishable_key),
    };

    ActiveKeys {
        mode,
        secret_key: secret_key.clone(),
        publishable_key: publishable_key.clone(),
    }
}

/// `<site>/?session_id={CHECKOUT_SESSION_ID}`
pub fn default_return_url(site_url: &str) -> String {
    format!(
        "{}/?session_id={}",
        site_url.trim_end_matches('/'),
        SESSION_ID_PLACEHOLDER
    )
}
