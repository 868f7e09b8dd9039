//! # Order Error Types
//!
//! Typed error handling for the storefront order engine.
//! All order, store, and gateway operations return `Result<T, OrderError>`.

use thiserror::Error;

/// Core error type for all order and payment operations
#[derive(Debug, Error)]
pub enum OrderError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (missing address, empty items, zero quantity)
    #[error("Invalid order data: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog; aborts the whole order
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Order not found in the store
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Payment provider API error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Checkout session creation failed
    #[error("Checkout session failed: {0}")]
    CheckoutSessionFailed(String),

    /// Backing store unavailable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    /// Returns true if the caller (or the webhook provider) should retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::NetworkError(_)
                | OrderError::ProviderError(_)
                | OrderError::StoreUnavailable(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error.
    ///
    /// For the webhook endpoint, 400 signals "do not redeliver" while
    /// 500 signals "retry later".
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::InvalidRequest(_) => 400,
            OrderError::ProductNotFound { .. } => 400,
            OrderError::WebhookVerificationFailed(_) => 400,
            OrderError::WebhookParseError(_) => 400,
            OrderError::OrderNotFound { .. } => 404,
            OrderError::Configuration(_) => 500,
            OrderError::ProviderError(_) => 500,
            OrderError::NetworkError(_) => 500,
            OrderError::CheckoutSessionFailed(_) => 500,
            OrderError::StoreUnavailable(_) => 500,
            OrderError::Serialization(_) => 500,
            OrderError::Internal(_) => 500,
        }
    }
}

/// Result type alias for order operations
pub type OrderResult<T> = Result<T, OrderError>;
