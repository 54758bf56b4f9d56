//! Application State

use std::sync::Arc;

use checkout_payments::{CheckoutService, PluginProfile, SettingsStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session creation, with the settings store and provider behind it
    pub checkout: CheckoutService,

    /// Naming for this checkout variant
    pub profile: Arc<PluginProfile>,

    /// Bearer token for admin routes (None = admin routes disabled)
    pub admin_token: Option<Arc<str>>,

    /// Browser checkout script for the embed snippet
    pub script_url: Option<Arc<str>>,
}

impl AppState {
    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        self.checkout.store()
    }
}
