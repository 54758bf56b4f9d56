//! # checkout-payments
//!
//! Settings validation and session creation for a Stripe Embedded Checkout
//! widget.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  POST create-session  ┌──────────────────┐  create  ┌──────────┐
//! │   Browser   │──────────────────────▶│ CheckoutService  │─────────▶│  Stripe  │
//! │   script    │◀──────────────────────│ (settings store) │◀─────────│          │
//! └─────────────┘     clientSecret      └──────────────────┘          └──────────┘
//!        │
//!        ▼ mounts Stripe's iframe into <div id="..."> with the client secret
//! ```
//!
//! The settings record holds two credential pairs (test and live), a return
//! URL and one price id. Administrators write it through
//! [`SettingsStore::set`], which sanitizes the submission and reports
//! problems without rejecting the save.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_payments::{CheckoutService, MemorySettingsStore, StripeProvider};
//!
//! let service = CheckoutService::new(
//!     Arc::new(MemorySettingsStore::new()),
//!     Arc::new(StripeProvider::new()),
//!     "https://shop.example.com",
//! );
//!
//! let secret = service.create_session().await?;
//! // hand secret.as_str() to stripe.initEmbeddedCheckout()
//! ```

mod checkout;
mod error;
pub mod embed;
pub mod profile;
pub mod provider;
pub mod settings;
pub mod store;
pub mod validation;

pub use checkout::{CheckoutService, PRICE_ID_NOT_CONFIGURED, SECRET_KEY_NOT_CONFIGURED};
pub use embed::ClientConfig;
pub use error::{CheckoutError, ProviderError, Result};
pub use profile::PluginProfile;
pub use provider::{
    CheckoutProvider, ClientSecret, MockCheckoutProvider, SecretKey, SessionRequest,
    StripeProvider,
};
pub use settings::{resolve_active_keys, ActiveKeys, Mode, ModeFlag, Settings};
pub use store::{JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
pub use validation::{
    sanitize_settings, validate_publishable_key, validate_secret_key, RawSettings,
    ValidationMessage, ValidationResult,
};
