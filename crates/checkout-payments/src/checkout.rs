//! Embedded Checkout Session Creation
//!
//! Reads the settings, checks the local preconditions in order, and asks the
//! provider for a fresh session. Nothing is stored on this side: every call
//! opens a brand-new provider session.

use std::sync::Arc;

use crate::error::{CheckoutError, Result};
use crate::provider::{CheckoutProvider, ClientSecret, SecretKey, SessionRequest};
use crate::settings::Settings;
use crate::store::SettingsStore;

pub const SECRET_KEY_NOT_CONFIGURED: &str = "Stripe secret key not configured";
pub const PRICE_ID_NOT_CONFIGURED: &str = "Product price ID not configured";

/// Session endpoint logic, with its collaborators injected
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn SettingsStore>,
    provider: Arc<dyn CheckoutProvider>,
    site_url: String,
}

impl CheckoutService {
    /// `site_url` is the base the default return URL is built from
    pub fn new(
        store: Arc<dyn SettingsStore>,
        provider: Arc<dyn CheckoutProvider>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            site_url: site_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Build the provider request from a settings record.
    ///
    /// Fails on a missing secret key first, then on a missing price id.
    pub fn prepare_session(&self, settings: &Settings) -> Result<SessionRequest> {
        let keys = settings.active_keys();
        if keys.secret_key.is_empty() {
            return Err(CheckoutError::Config(SECRET_KEY_NOT_CONFIGURED.into()));
        }

        if settings.price_id.is_empty() {
            return Err(CheckoutError::Config(PRICE_ID_NOT_CONFIGURED.into()));
        }

        Ok(SessionRequest::embedded_payment(
            SecretKey::new(keys.secret_key),
            settings.price_id.clone(),
            settings.resolve_return_url(&self.site_url),
        ))
    }

    /// Create one checkout session and return its client secret
    pub async fn create_session(&self) -> Result<ClientSecret> {
        let settings = self.store.get()?;
        let mode = settings.mode();

        let request = self.prepare_session(&settings).inspect_err(|e| {
            tracing::warn!(mode = %mode, "Checkout not configured: {}", e);
        })?;

        tracing::info!(
            mode = %mode,
            price_id = %settings.price_id,
            provider = self.provider.name(),
            "Creating checkout session"
        );

        let secret = self.provider.create_session(&request).await.map_err(|e| {
            tracing::error!(mode = %mode, price_id = %settings.price_id, "Checkout session failed: {}", e);
            CheckoutError::from(e)
        })?;

        Ok(secret)
    }
}
