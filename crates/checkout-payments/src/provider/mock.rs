//! Mock Checkout Provider
//!
//! Scripted provider for tests and offline demos. Request recording is
//! opt-in so a long-running demo server does not accumulate requests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{CheckoutProvider, ClientSecret, SessionRequest};
use crate::error::ProviderError;

/// Mock provider that always answers the same way
pub struct MockCheckoutProvider {
    outcome: Result<ClientSecret, ProviderError>,
    requests: Option<Mutex<Vec<SessionRequest>>>,
}

impl MockCheckoutProvider {
    /// Every session succeeds with this client secret
    pub fn succeeding(client_secret: impl Into<String>) -> Self {
        Self {
            outcome: Ok(ClientSecret::new(client_secret)),
            requests: None,
        }
    }

    /// Every session is rejected with this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_error(ProviderError::Rejected {
            status: 400,
            message: message.into(),
        })
    }

    pub fn with_error(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            requests: None,
        }
    }

    /// Keep every request for later inspection
    #[must_use]
    pub fn recording(mut self) -> Self {
        self.requests = Some(Mutex::new(Vec::new()));
        self
    }

    /// Requests received so far; empty unless recording
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests
            .as_ref()
            .and_then(|requests| requests.lock().ok().map(|r| r.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> std::result::Result<ClientSecret, ProviderError> {
        if let Some(Ok(mut requests)) = self.requests.as_ref().map(Mutex::lock) {
            requests.push(request.clone());
        }
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SecretKey;

    fn request() -> SessionRequest {
        SessionRequest::embedded_payment(SecretKey::new("sk_test_1"), "price_abc", "https://e.com")
    }

    #[tokio::test]
    async fn test_mock_success_records_request() {
        let provider = MockCheckoutProvider::succeeding("cs_test_secret123").recording();
        let secret = provider.create_session(&request()).await.unwrap();

        assert_eq!(secret.as_str(), "cs_test_secret123");
        assert_eq!(provider.requests(), vec![request()]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let provider = MockCheckoutProvider::failing("No such price: 'price_bad'");
        let err = provider.create_session(&request()).await.unwrap_err();
        assert_eq!(err.message(), "No such price: 'price_bad'");
    }

    #[tokio::test]
    async fn test_mock_does_not_record_by_default() {
        let provider = MockCheckoutProvider::succeeding("cs_demo");
        for _ in 0..3 {
            provider.create_session(&request()).await.unwrap();
        }
        assert!(provider.requests().is_empty());
    }
}
