//! # Stripe Gateway
//!
//! Stripe implementation of the `PaymentGateway` trait: hosted Checkout
//! Sessions for order payment, webhook verification, and checkout-session
//! lookup by payment intent for the reconciler's failure branch.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::Utc;
use order_core::{
    CheckoutLine, CheckoutSession, CheckoutUrls, Order, OrderError, OrderResult, PaymentGateway,
    SessionMetadata, WebhookEvent,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

/// Conversion from whole currency units to Stripe's minor units (cents)
const MINOR_UNITS_PER_UNIT: i64 = 100;

/// Stripe payment gateway
///
/// Uses Stripe's hosted checkout page for secure payments.
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> OrderResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    async fn read_body(response: reqwest::Response) -> OrderResult<(reqwest::StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OrderError::NetworkError(e.to_string()))?;
        Ok((status, body))
    }

    fn provider_message(body: &str, status: reqwest::StatusCode) -> String {
        if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(body) {
            error_response.error.message
        } else {
            format!("HTTP {}: {}", status, body)
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, order, lines, urls), fields(order_id = %order.id))]
    async fn create_checkout(
        &self,
        order: &Order,
        lines: &[CheckoutLine],
        urls: &CheckoutUrls,
    ) -> OrderResult<CheckoutSession> {
        if lines.is_empty() {
            return Err(OrderError::InvalidRequest("Order has no items".to_string()));
        }

        debug!("Creating Stripe checkout session: {} lines", lines.len());

        // Build form data for the Stripe API
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("success_url".to_string(), urls.success_url.clone()),
            ("cancel_url".to_string(), urls.cancel_url.clone()),
        ];

        for (i, line) in lines.iter().enumerate() {
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                "usd".to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                (line.unit_price * MINOR_UNITS_PER_UNIT).to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                line.name.clone(),
            ));
            form_params.push((
                format!("line_items[{}][quantity]", i),
                line.quantity.to_string(),
            ));
        }

        // The hosted session must total the stored order amount, which
        // includes the tax surcharge the item lines alone do not carry
        let subtotal: i64 = lines
            .iter()
            .map(|line| line.unit_price * line.quantity as i64)
            .sum();
        let tax = order.amount - subtotal;
        if tax > 0 {
            let i = lines.len();
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                "usd".to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                (tax * MINOR_UNITS_PER_UNIT).to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                "Tax".to_string(),
            ));
            form_params.push((format!("line_items[{}][quantity]", i), "1".to_string()));
        }

        // Correlation metadata, round-tripped on every related event
        form_params.push(("metadata[orderId]".to_string(), order.id.clone()));
        form_params.push(("metadata[userId]".to_string(), order.user_id.clone()));

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &order.id)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| OrderError::NetworkError(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(OrderError::CheckoutSessionFailed(Self::provider_message(
                &body, status,
            )));
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                OrderError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session_response.id, session_response.url
        );

        Ok(CheckoutSession {
            session_id: session_response.id,
            order_id: order.id.clone(),
            checkout_url: session_response.url,
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> OrderResult<WebhookEvent> {
        webhook::verify_and_parse(
            &self.config.webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
        )
    }

    #[instrument(skip(self))]
    async fn session_metadata_for_intent(
        &self,
        payment_intent_id: &str,
    ) -> OrderResult<Option<SessionMetadata>> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("payment_intent", payment_intent_id)])
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| OrderError::NetworkError(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(OrderError::ProviderError(Self::provider_message(
                &body, status,
            )));
        }

        let list: StripeSessionListResponse = serde_json::from_str(&body).map_err(|e| {
            OrderError::Serialization(format!("Failed to parse session list: {}", e))
        })?;

        let metadata = list.data.into_iter().next().map(|session| {
            debug!(session_id = %session.id, "resolved session for payment intent");
            SessionMetadata {
                order_id: session.metadata.get("orderId").cloned(),
                user_id: session.metadata.get("userId").cloned(),
            }
        });

        Ok(metadata)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSessionListResponse {
    #[serde(default)]
    data: Vec<StripeSessionObject>,
}

#[derive(Debug, Deserialize)]
struct StripeSessionObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
