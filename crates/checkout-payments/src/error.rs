//! Checkout Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors raised while serving a checkout or persisting settings
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Local misconfiguration (missing secret key or price id)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The payment provider rejected or failed the call
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Settings persistence failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CheckoutError {
    /// Never true: every failure is terminal for the request that hit it.
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// HTTP status the endpoint answers with
    pub const fn status_code(&self) -> u16 {
        500
    }

    /// Message returned to the anonymous caller.
    ///
    /// Configuration errors carry their fixed text; provider errors are
    /// forwarded verbatim.
    pub fn public_message(&self) -> String {
        match self {
            CheckoutError::Config(msg) => msg.clone(),
            CheckoutError::Provider(err) => err.message().to_string(),
            CheckoutError::Storage(_) => "Checkout settings unavailable".into(),
        }
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::Storage(err.to_string())
    }
}

/// Failures reported by the payment provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider answered with an API error (invalid price, bad key, ...)
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Request never got a usable answer (network, timeout, decoding)
    #[error("{0}")]
    Transport(String),

    /// Session created but no client secret came back
    #[error("Checkout session has no client secret")]
    MissingClientSecret,
}

impl ProviderError {
    /// Provider's message text, unmodified
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Rejected { message, .. } => message,
            ProviderError::Transport(message) => message,
            ProviderError::MissingClientSecret => "Checkout session has no client secret",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message_is_not_prefixed() {
        let err = CheckoutError::Config("Stripe secret key not configured".into());
        assert_eq!(err.public_message(), "Stripe secret key not configured");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_provider_message_forwarded_verbatim() {
        let err: CheckoutError = ProviderError::Rejected {
            status: 400,
            message: "No such price: 'price_bad'".into(),
        }
        .into();
        assert_eq!(err.public_message(), "No such price: 'price_bad'");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_storage_message_is_generic() {
        let err = CheckoutError::Storage("/var/lib/checkout: permission denied".into());
        assert!(!err.public_message().contains("/var/lib"));
    }
}
