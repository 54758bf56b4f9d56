//! Settings Sanitization
//!
//! Turns a raw settings form submission into a stored [`Settings`] record plus
//! messages for the administrator. Invalid values never block the save: they
//! are stored and reported.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::settings::{Mode, Settings};

/// Value the settings form submits for a ticked checkbox
pub const CHECKBOX_CHECKED: &str = "1";

/// Schemes a stored return URL may use
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Raw form submission. Every field is optional: a missing field reads as
/// empty, and a missing checkbox reads as unticked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(default)]
    pub test_mode: Option<String>,
    #[serde(default)]
    pub test_secret_key: Option<String>,
    #[serde(default)]
    pub test_publishable_key: Option<String>,
    #[serde(default)]
    pub live_secret_key: Option<String>,
    #[serde(default)]
    pub live_publishable_key: Option<String>,
    #[serde(default)]
    pub return_url: Option<String>,
    #[serde(default)]
    pub price_id: Option<String>,
}

/// Message severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error,
    Warning,
}

/// Message code, one per kind of finding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCode {
    ValidationError,
    MissingTestKeys,
    MissingLiveKeys,
}

/// One message shown to the administrator after saving
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub level: MessageLevel,
    pub code: MessageCode,
    pub message: String,
}

impl ValidationMessage {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            code: MessageCode::ValidationError,
            message: message.into(),
        }
    }

    fn missing_keys(mode: Mode) -> Self {
        let (code, message) = match mode {
            Mode::Test => (
                MessageCode::MissingTestKeys,
                "Test mode is enabled but test keys are missing.",
            ),
            Mode::Live => (
                MessageCode::MissingLiveKeys,
                "Live mode is enabled but live keys are missing.",
            ),
        };
        Self {
            level: MessageLevel::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Sanitized record plus everything worth telling the administrator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub settings: Settings,
    pub messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    /// No field-level errors (warnings allowed)
    pub fn is_clean(&self) -> bool {
        !self
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// Secret key prefix check. Callers skip empty keys.
pub fn validate_secret_key(key: &str, mode: Mode) -> bool {
    key.starts_with(mode.secret_prefix())
}

/// Publishable key prefix check. Callers skip empty keys.
pub fn validate_publishable_key(key: &str, mode: Mode) -> bool {
    key.starts_with(mode.publishable_prefix())
}

/// Absolute URL with a scheme and a host
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

/// Sanitize a settings submission.
///
/// Field errors come out in field order; the missing-keys warning, if any,
/// comes last.
pub fn sanitize_settings(input: &RawSettings) -> ValidationResult {
    let mut messages = Vec::new();

    let test_mode = input.test_mode.as_deref() == Some(CHECKBOX_CHECKED);

    let test_secret_key = checked_key(
        input.test_secret_key.as_deref(),
        "Test Secret Key",
        Mode::Test.secret_prefix(),
        &mut messages,
    );
    let test_publishable_key = checked_key(
        input.test_publishable_key.as_deref(),
        "Test Publishable Key",
        Mode::Test.publishable_prefix(),
        &mut messages,
    );
    let live_secret_key = checked_key(
        input.live_secret_key.as_deref(),
        "Live Secret Key",
        Mode::Live.secret_prefix(),
        &mut messages,
    );
    let live_publishable_key = checked_key(
        input.live_publishable_key.as_deref(),
        "Live Publishable Key",
        Mode::Live.publishable_prefix(),
        &mut messages,
    );

    let return_url = input.return_url.as_deref().unwrap_or_default().trim();
    if !return_url.is_empty() && !is_valid_url(return_url) {
        messages.push(ValidationMessage::error("Return URL must be a valid URL"));
    }
    let return_url = escape_url(return_url);

    let price_id = sanitize_text(input.price_id.as_deref().unwrap_or_default());

    let settings = Settings {
        test_mode: test_mode.into(),
        test_secret_key,
        test_publishable_key,
        live_secret_key,
        live_publishable_key,
        return_url,
        price_id,
    };

    let active = settings.active_keys();
    if !active.is_complete() {
        messages.push(ValidationMessage::missing_keys(active.mode));
    }

    for message in &messages {
        tracing::debug!(code = ?message.code, level = ?message.level, "{}", message.message);
    }

    ValidationResult { settings, messages }
}

fn checked_key(
    raw: Option<&str>,
    label: &str,
    prefix: &str,
    messages: &mut Vec<ValidationMessage>,
) -> String {
    let key = raw.unwrap_or_default().trim();
    if !key.is_empty() && !key.starts_with(prefix) {
        messages.push(ValidationMessage::error(format!(
            "{label} must start with \"{prefix}\""
        )));
    }
    key.to_string()
}

/// Bytes percent-encoded in a stored URL. Non-ASCII is always encoded;
/// braces stay literal.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`');

/// Escape a URL for storage.
///
/// Control characters are dropped, spaces and unsafe bytes are
/// percent-encoded, braces are kept so `{CHECKOUT_SESSION_ID}` survives. A
/// value with a scheme outside http/https is discarded; a bare host gets
/// `http://` prepended.
pub fn escape_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let visible: String = trimmed.chars().filter(|c| !c.is_control()).collect();
    let escaped = utf8_percent_encode(&visible, URL_UNSAFE).to_string();

    match url_scheme(&escaped) {
        Some(scheme) if ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => escaped,
        Some(_) => String::new(),
        None if escaped.starts_with(['/', '#', '?']) => escaped,
        None => format!("http://{escaped}"),
    }
}

/// Leading `scheme:` of a URL, if there is one. `host:8080` is a port, not a
/// scheme.
fn url_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let scheme_chars = chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));
    let is_port = rest.chars().next().is_some_and(|c| c.is_ascii_digit());

    (starts_alpha && scheme_chars && !is_port).then_some(scheme)
}

/// Plain-text field cleanup: markup tags removed, line breaks and tabs
/// flattened, whitespace runs collapsed, ends trimmed.
pub fn sanitize_text(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        stripped.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = "";
            }
        }
    }
    stripped.push_str(rest);

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> RawSettings {
        RawSettings {
            test_mode: Some("1".into()),
            test_secret_key: Some("sk_test_123".into()),
            test_publishable_key: Some("pk_test_123".into()),
            live_secret_key: Some("sk_live_123".into()),
            live_publishable_key: Some("pk_live_123".into()),
            return_url: Some("https://shop.example.com/done?session_id={CHECKOUT_SESSION_ID}".into()),
            price_id: Some("price_abc".into()),
        }
    }

    #[test]
    fn test_secret_key_prefixes() {
        assert!(validate_secret_key("sk_test_abc", Mode::Test));
        assert!(!validate_secret_key("sk_live_abc", Mode::Test));
        assert!(validate_secret_key("sk_live_abc", Mode::Live));
        assert!(!validate_secret_key("pk_live_abc", Mode::Live));
        assert!(!validate_secret_key("SK_TEST_abc", Mode::Test));
    }

    #[test]
    fn test_publishable_key_prefixes() {
        assert!(validate_publishable_key("pk_test_abc", Mode::Test));
        assert!(!validate_publishable_key("sk_test_abc", Mode::Test));
        assert!(validate_publishable_key("pk_live_abc", Mode::Live));
    }

    #[test]
    fn test_clean_submission() {
        let result = sanitize_settings(&full_input());
        assert!(result.messages.is_empty());
        assert!(result.settings.test_mode.is_enabled());
        assert_eq!(result.settings.price_id, "price_abc");
        assert_eq!(
            result.settings.return_url,
            "https://shop.example.com/done?session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[test]
    fn test_missing_checkbox_means_live() {
        let input = RawSettings {
            test_mode: None,
            ..full_input()
        };
        let result = sanitize_settings(&input);
        assert!(!result.settings.test_mode.is_enabled());

        let input = RawSettings {
            test_mode: Some("on".into()),
            ..full_input()
        };
        assert!(!sanitize_settings(&input).settings.test_mode.is_enabled());
    }

    #[test]
    fn test_bad_keys_are_stored_and_reported_in_order() {
        let input = RawSettings {
            test_secret_key: Some("  sk_live_wrong  ".into()),
            live_publishable_key: Some("pk_test_wrong".into()),
            return_url: Some("not a url".into()),
            ..full_input()
        };
        let result = sanitize_settings(&input);

        assert_eq!(result.settings.test_secret_key, "sk_live_wrong");
        assert_eq!(result.settings.live_publishable_key, "pk_test_wrong");
        assert!(!result.is_clean());

        let texts: Vec<&str> = result.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Test Secret Key must start with \"sk_test_\"",
                "Live Publishable Key must start with \"pk_live_\"",
                "Return URL must be a valid URL",
            ]
        );
    }

    #[test]
    fn test_empty_keys_raise_no_field_error() {
        let input = RawSettings {
            test_mode: Some("1".into()),
            ..Default::default()
        };
        let result = sanitize_settings(&input);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].code, MessageCode::MissingTestKeys);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }

    #[test]
    fn test_missing_keys_warning_comes_last() {
        let input = RawSettings {
            test_mode: None,
            test_secret_key: Some("bogus".into()),
            live_secret_key: Some("sk_live_ok".into()),
            live_publishable_key: None,
            ..full_input()
        };
        let result = sanitize_settings(&input);
        let last = result.messages.last().unwrap();
        assert_eq!(last.code, MessageCode::MissingLiveKeys);
        assert_eq!(last.message, "Live mode is enabled but live keys are missing.");
        assert_eq!(result.messages[0].code, MessageCode::ValidationError);
    }

    #[test]
    fn test_price_id_is_opaque_text() {
        let input = RawSettings {
            price_id: Some("  price_<b>abc</b>\n".into()),
            ..full_input()
        };
        assert_eq!(sanitize_settings(&input).settings.price_id, "price_abc");
        assert_eq!(sanitize_text("a \t\r\n  b"), "a b");
        assert_eq!(sanitize_text("anything-goes_42"), "anything-goes_42");
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/?session_id={CHECKOUT_SESSION_ID}"));
        assert!(is_valid_url("http://localhost:8080/thanks"));
        assert!(!is_valid_url("example.com/thanks"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(
            escape_url(" https://example.com/a b?x={CHECKOUT_SESSION_ID} "),
            "https://example.com/a%20b?x={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(escape_url("example.com/thanks"), "http://example.com/thanks");
        assert_eq!(escape_url("localhost:8080/x"), "http://localhost:8080/x");
        assert_eq!(escape_url("/thanks"), "/thanks");
        assert_eq!(escape_url("javascript:alert(1)"), "");
        assert_eq!(escape_url("https://example.com/<x>"), "https://example.com/%3Cx%3E");
        assert_eq!(escape_url(""), "");
    }

    #[test]
    fn test_escape_url_non_ascii_and_controls() {
        assert_eq!(
            escape_url("https://example.com/caf\u{e9}?q=\"x\"\t"),
            "https://example.com/caf%C3%A9?q=%22x%22"
        );
        assert_eq!(
            escape_url("https://example.com/a|b?x=[1]&y=`z`"),
            "https://example.com/a|b?x=[1]&y=%60z%60"
        );
    }

    #[test]
    fn test_invalid_return_url_still_stored_escaped() {
        let input = RawSettings {
            return_url: Some("not a url".into()),
            ..full_input()
        };
        let result = sanitize_settings(&input);
        assert_eq!(result.settings.return_url, "http://not%20a%20url");
        assert_eq!(result.messages.len(), 1);
    }
}
