//! # Stripe Webhook Verification
//!
//! Signature verification and event parsing for inbound Stripe webhooks.
//!
//! Verification operates on the exact raw request bytes; the HMAC is
//! computed over `{timestamp}.{raw body}` without re-serializing, since the
//! check is byte-sensitive. Any failure here means zero state changes
//! upstream.

use hmac::{Hmac, Mac};
use order_core::{OrderError, OrderResult, SessionMetadata, WebhookEvent};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Provider tolerance for clock skew between signing and receipt
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> OrderResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        OrderError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(OrderError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// HMAC-SHA256 over `{timestamp}.{payload}` using the raw payload bytes
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

fn metadata_from_object(object: &serde_json::Map<String, serde_json::Value>) -> SessionMetadata {
    let field = |name: &str| {
        object
            .get("metadata")
            .and_then(|m| m.get(name))
            .and_then(|v| v.as_str())
            .map(String::from)
    };

    SessionMetadata {
        order_id: field("orderId"),
        user_id: field("userId"),
    }
}

/// Verify a webhook payload against the signing secret and map it into the
/// closed event union.
///
/// Fails closed: bad signature, malformed payload, and timestamps outside
/// the provider tolerance are all verification errors.
pub fn verify_and_parse(
    secret: &str,
    payload: &[u8],
    signature: &str,
    now: i64,
) -> OrderResult<WebhookEvent> {
    let sig_parts = parse_signature_header(signature)?;

    if (now - sig_parts.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(OrderError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected_sig = compute_signature(secret, sig_parts.timestamp, payload);

    let valid = sig_parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected_sig));

    if !valid {
        return Err(OrderError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }

    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| OrderError::WebhookParseError(format!("Failed to parse webhook: {}", e)))?;

    debug!(event_type = %event.event_type, "verified Stripe webhook");

    let event = match event.event_type.as_str() {
        "checkout.session.completed" => WebhookEvent::CheckoutCompleted {
            metadata: metadata_from_object(&event.data.object),
        },
        "payment_intent.payment_failed" => {
            let payment_intent_id = event
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| {
                    OrderError::WebhookParseError(
                        "payment_intent.payment_failed without intent id".to_string(),
                    )
                })?;
            WebhookEvent::PaymentFailed { payment_intent_id }
        }
        other => WebhookEvent::Ignored {
            event_type: other.to_string(),
        },
    };

    Ok(event)
}
