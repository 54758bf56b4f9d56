//! Embedded Checkout HTTP Server
//!
//! Axum-based server exposing the public session endpoint, the page embed and
//! a token-protected settings API.

mod app;
mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_payments::{
    CheckoutProvider, CheckoutService, JsonFileSettingsStore, MemorySettingsStore,
    MockCheckoutProvider, SettingsStore, StripeProvider,
};

use crate::config::{ProviderKind, ServerConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let profile = config.profile.clone();

    // Settings store
    let store: Arc<dyn SettingsStore> = match &config.settings_dir {
        Some(dir) => {
            tracing::info!(
                dir = %dir.display(),
                option = %profile.option_name,
                multisite = config.multisite,
                "Using JSON settings store"
            );
            Arc::new(
                JsonFileSettingsStore::new(dir, &profile.option_name).multisite(config.multisite),
            )
        }
        None => {
            tracing::warn!("SETTINGS_DIR not set - settings live in memory and are lost on restart");
            Arc::new(MemorySettingsStore::new())
        }
    };

    let settings = store.get()?;
    let keys = settings.active_keys();
    if keys.is_complete() && !settings.price_id.is_empty() {
        tracing::info!(mode = %keys.mode, "Checkout configured");
    } else {
        tracing::warn!(mode = %keys.mode, "Checkout not fully configured - set keys and price id via /admin/settings");
    }

    // Payment provider
    let provider: Arc<dyn CheckoutProvider> = match &config.provider {
        ProviderKind::Stripe => Arc::new(StripeProvider::new()),
        ProviderKind::Mock { client_secret } => {
            tracing::warn!("Using mock checkout provider - no real sessions are created");
            Arc::new(MockCheckoutProvider::succeeding(client_secret.clone()))
        }
    };

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set - admin settings routes are disabled");
    }

    // Build application state
    let state = AppState {
        checkout: CheckoutService::new(store, provider, config.site_url.clone()),
        profile: Arc::new(profile.clone()),
        admin_token: config.admin_token.as_deref().map(Arc::from),
        script_url: config.script_url.as_deref().map(Arc::from),
    };

    let app = app::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("Embedded checkout server ({}) running on http://{}", profile.slug, config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health");
    tracing::info!("  POST   {}", profile.create_session_path());
    tracing::info!("  GET    {}", profile.config_path());
    tracing::info!("  GET    {}", profile.embed_path());
    tracing::info!("  GET    /admin/settings");
    tracing::info!("  POST   /admin/settings");
    tracing::info!("  DELETE /admin/settings");
    tracing::info!("Shortcode: [{}]", profile.shortcode_tag);

    axum::serve(listener, app).await?;

    Ok(())
}
