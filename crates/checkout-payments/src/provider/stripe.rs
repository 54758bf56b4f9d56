//! Stripe Embedded Checkout
//!
//! Creates `ui_mode=embedded` Checkout Sessions. The page mounts Stripe's
//! iframe with the returned client secret, so card data never touches this
//! service.
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │              Merchant Page             │
//! │  ┌────────────────────────────────┐    │
//! │  │  Stripe Embedded Checkout      │    │
//! │  │  (iframe, client secret)       │    │
//! │  └────────────────────────────────┘    │
//! └────────────────────────────────────────┘
//!          │ return_url?session_id=cs_...
//!          ▼
//! ```

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, CheckoutSessionUiMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, StripeError,
};

use super::{CheckoutMode, CheckoutProvider, ClientSecret, SessionRequest, UiMode};
use crate::error::ProviderError;

/// Stripe-backed checkout provider.
///
/// The secret key comes from the settings record on every request, so a
/// client is built per call rather than held.
#[derive(Clone, Debug, Default)]
pub struct StripeProvider;

impl StripeProvider {
    pub const fn new() -> Self {
        Self
    }

    fn params<'a>(request: &'a SessionRequest) -> CreateCheckoutSession<'a> {
        let mut params = CreateCheckoutSession::new();
        params.mode = Some(match request.mode {
            CheckoutMode::Payment => CheckoutSessionMode::Payment,
        });
        params.ui_mode = Some(match request.ui_mode {
            UiMode::Embedded => CheckoutSessionUiMode::Embedded,
        });
        params.return_url = Some(&request.return_url);

        params.line_items = Some(
            request
                .line_items
                .iter()
                .map(|item| CreateCheckoutSessionLineItems {
                    price: Some(item.price_id.clone()),
                    quantity: Some(item.quantity),
                    ..Default::default()
                })
                .collect(),
        );

        params
    }
}

#[async_trait]
impl CheckoutProvider for StripeProvider {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> std::result::Result<ClientSecret, ProviderError> {
        let client = Client::new(request.secret_key.expose());

        let session = StripeCheckoutSession::create(&client, Self::params(request))
            .await
            .map_err(provider_error)?;

        tracing::debug!(session_id = %session.id, "Stripe checkout session created");

        session
            .client_secret
            .map(ClientSecret::new)
            .ok_or(ProviderError::MissingClientSecret)
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

/// Keep Stripe's own message text ("No such price: 'price_x'") intact.
fn provider_error(err: StripeError) -> ProviderError {
    match err {
        StripeError::Stripe(request_error) => {
            let status = request_error.http_status;
            ProviderError::Rejected {
                status,
                message: request_error
                    .message
                    .unwrap_or_else(|| format!("Stripe request failed with status {status}")),
            }
        }
        other => ProviderError::Transport(other.to_string()),
    }
}
