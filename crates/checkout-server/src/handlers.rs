//! HTTP Handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Html,
    Form, Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::Instrument;

use checkout_payments::{
    embed, CheckoutError, ClientConfig, Mode, RawSettings, Settings, ValidationMessage,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub mode: Option<Mode>,
    pub keys_configured: bool,
    pub price_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// Settings as shown to the administrator, secret keys masked
#[derive(Debug, Serialize)]
pub struct MaskedSettings {
    pub test_mode: bool,
    pub test_secret_key: String,
    pub test_publishable_key: String,
    pub live_secret_key: String,
    pub live_publishable_key: String,
    pub return_url: String,
    pub price_id: String,
}

impl From<&Settings> for MaskedSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            test_mode: settings.test_mode.is_enabled(),
            test_secret_key: mask_key(&settings.test_secret_key),
            test_publishable_key: settings.test_publishable_key.clone(),
            live_secret_key: mask_key(&settings.live_secret_key),
            live_publishable_key: settings.live_publishable_key.clone(),
            return_url: settings.return_url.clone(),
            price_id: settings.price_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminSettingsResponse {
    pub active_mode: Mode,
    pub settings: MaskedSettings,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ValidationMessage>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &'static str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: Some(code),
        }),
    )
}

fn storage_error(e: &CheckoutError) -> ApiError {
    tracing::error!("Settings store error: {}", e);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        e.public_message(),
        "STORAGE_ERROR",
    )
}

/// `sk_test_…wxyz`; short keys are fully hidden
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

// ============================================================================
// Public Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let settings = state.settings().get().ok();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.checkout.provider_name().to_string(),
        mode: settings.as_ref().map(Settings::mode),
        keys_configured: settings
            .as_ref()
            .is_some_and(|s| s.active_keys().is_complete()),
        price_configured: settings.as_ref().is_some_and(|s| !s.price_id.is_empty()),
    })
}

/// Create an Embedded Checkout session.
///
/// Anonymous; any request body is ignored.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let attempt_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("create_session", %attempt_id);

    let secret = state
        .checkout
        .create_session()
        .instrument(span)
        .await
        .map_err(|e| {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(ErrorResponse {
                    error: e.public_message(),
                    code: None,
                }),
            )
        })?;

    Ok(Json(SessionResponse {
        client_secret: secret.into_inner(),
    }))
}

/// Client configuration object for the browser script
pub async fn client_config(State(state): State<AppState>) -> Result<Json<ClientConfig>, ApiError> {
    let settings = state.settings().get().map_err(|e| storage_error(&e))?;

    Ok(Json(ClientConfig::new(
        &settings,
        &state.profile,
        state.checkout.site_url(),
    )))
}

/// HTML fragment that mounts the checkout on a page
pub async fn embed_snippet(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let settings = state.settings().get().map_err(|e| storage_error(&e))?;
    let config = ClientConfig::new(&settings, &state.profile, state.checkout.site_url());

    Ok(Html(embed::embed_snippet(
        &state.profile,
        &config,
        state.script_url.as_deref(),
    )))
}

// ============================================================================
// Admin Handlers
// ============================================================================

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.admin_token.as_deref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Admin access not configured",
            "ADMIN_DISABLED",
        )
    })?;

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided.is_some_and(|token| token_matches(token, expected)) {
        Ok(())
    } else {
        tracing::warn!("Rejected admin request with missing or wrong token");
        Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid admin token",
            "UNAUTHORIZED",
        ))
    }
}

/// Constant-time token comparison
fn token_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Current settings and active mode
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminSettingsResponse>, ApiError> {
    authorize(&state, &headers)?;

    let settings = state.settings().get().map_err(|e| storage_error(&e))?;

    Ok(Json(AdminSettingsResponse {
        active_mode: settings.mode(),
        settings: MaskedSettings::from(&settings),
        messages: Vec::new(),
    }))
}

/// Settings form submission.
///
/// Always saves; validation problems come back as messages.
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<RawSettings>,
) -> Result<Json<AdminSettingsResponse>, ApiError> {
    authorize(&state, &headers)?;

    let result = state.settings().set(&input).map_err(|e| storage_error(&e))?;

    Ok(Json(AdminSettingsResponse {
        active_mode: result.settings.mode(),
        settings: MaskedSettings::from(&result.settings),
        messages: result.messages,
    }))
}

/// Uninstall: delete the stored settings
pub async fn purge_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;

    state.settings().purge().map_err(|e| storage_error(&e))?;

    Ok(StatusCode::NO_CONTENT)
}
