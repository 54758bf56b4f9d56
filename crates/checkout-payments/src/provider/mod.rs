//! Payment Provider Integration
//!
//! The session endpoint talks to the provider only through
//! [`CheckoutProvider`], so tests can swap Stripe for a scripted mock.

mod mock;
mod stripe;

pub use mock::MockCheckoutProvider;
pub use stripe::StripeProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Secret API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key, for handing to the provider client
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([redacted])")
    }
}

/// Short-lived token the embedded widget is initialised with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Checkout session mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutMode {
    /// One-time payment
    Payment,
}

/// Where the checkout UI is rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    /// Mounted into the merchant's page
    Embedded,
}

/// One priced line item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub price_id: String,
    pub quantity: u64,
}

/// Everything the provider needs to open one checkout session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub secret_key: SecretKey,
    pub mode: CheckoutMode,
    pub ui_mode: UiMode,
    pub line_items: Vec<LineItem>,
    pub return_url: String,
}

impl SessionRequest {
    /// Embedded, one-time payment for a single unit of `price_id`
    pub fn embedded_payment(
        secret_key: SecretKey,
        price_id: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            secret_key,
            mode: CheckoutMode::Payment,
            ui_mode: UiMode::Embedded,
            line_items: vec![LineItem {
                price_id: price_id.into(),
                quantity: 1,
            }],
            return_url: return_url.into(),
        }
    }
}

/// Payment provider trait (Strategy pattern)
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a new checkout session and return its client secret
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> std::result::Result<ClientSecret, ProviderError>;

    /// Provider name
    fn name(&self) -> &str;
}
