//! Stripe payment intents and webhook verification.

use std::collections::HashMap;
use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::payment::{PaymentDetails, PaymentEvent, PaymentIntent};
use crate::domain::ports::PaymentGateway;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const EVENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_FAILED: &str = "payment_intent.payment_failed";

// ── Payment intents ──────────────────────────────────────────────────────────

pub struct StripeGateway {
    api_base: String,
    secret_key: String,
    // Built on first use, on a blocking worker thread.
    client: OnceLock<reqwest::blocking::Client>,
}

impl StripeGateway {
    pub fn new(api_base: &str, secret_key: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    client_secret: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl PaymentGateway for StripeGateway {
    fn create_payment_intent(&self, order_id: Uuid, amount_cents: i64) -> Result<PaymentIntent, DomainError> {
        if self.secret_key.is_empty() {
            return Err(DomainError::Payment("Payment provider is not configured".to_string()));
        }
        let form = [
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[order_id]", order_id.to_string()),
        ];
        let response = self
            .client()
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .map_err(|e| DomainError::Payment(e.to_string()))?;
        let status = response.status();
        let body: IntentResponse = response
            .json()
            .map_err(|e| DomainError::Payment(e.to_string()))?;

        if !status.is_success() {
            let message = body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Payment provider returned {}", status));
            return Err(DomainError::Payment(message));
        }
        let client_secret = body
            .client_secret
            .ok_or_else(|| DomainError::Payment("Missing client secret".to_string()))?;
        log::info!("Created payment intent for order {}", order_id);
        Ok(PaymentIntent { client_secret })
    }
}

// ── Webhooks ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Checks a `t=<unix>,v1=<hex>` header against the raw body.
    pub fn verify(&self, payload: &[u8], header: &str, now: i64) -> Result<(), DomainError> {
        let invalid = |msg: &str| DomainError::InvalidInput(msg.to_string());
        if !self.is_configured() {
            return Err(invalid("Webhook secret or signature missing"));
        }

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }
        let timestamp = timestamp.ok_or_else(|| invalid("Invalid signature"))?;
        if signatures.is_empty() {
            return Err(invalid("Invalid signature"));
        }
        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(invalid("Invalid signature"));
        }

        for candidate in signatures {
            let Ok(expected) = hex::decode(candidate) else {
                continue;
            };
            let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            // verify_slice compares in constant time.
            if mac.verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }
        Err(invalid("Invalid signature"))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: IntentObject,
}

#[derive(Debug, Deserialize)]
struct IntentObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    payment_method_types: Vec<String>,
    #[serde(default)]
    charges: Option<ChargeList>,
}

#[derive(Debug, Deserialize)]
struct ChargeList {
    #[serde(default)]
    data: Vec<Charge>,
}

#[derive(Debug, Deserialize)]
struct Charge {
    id: Option<String>,
    receipt_url: Option<String>,
}

/// Parses a verified webhook body into the event reconciliation acts on.
pub fn parse_event(payload: &[u8]) -> Result<PaymentEvent, DomainError> {
    let envelope: Envelope = serde_json::from_slice(payload)
        .map_err(|_| DomainError::InvalidInput("Invalid payload".to_string()))?;
    let intent = envelope.data.object;

    if envelope.kind != EVENT_SUCCEEDED && envelope.kind != EVENT_FAILED {
        return Ok(PaymentEvent::Ignored(envelope.kind));
    }
    let order_id = match intent
        .metadata
        .get("order_id")
        .and_then(|raw| Uuid::parse_str(raw).ok())
    {
        Some(id) => id,
        None => return Ok(PaymentEvent::Ignored(format!("{} without order_id", envelope.kind))),
    };

    if envelope.kind == EVENT_FAILED {
        return Ok(PaymentEvent::Failed { order_id });
    }
    let first_charge = intent.charges.and_then(|c| c.data.into_iter().next());
    let (transaction_reference, receipt_url) = match first_charge {
        Some(charge) => (charge.id, charge.receipt_url),
        None => (None, None),
    };
    Ok(PaymentEvent::Succeeded(PaymentDetails {
        order_id,
        payment_id: intent.id,
        payment_method: intent.payment_method_types.into_iter().next(),
        transaction_reference,
        receipt_url,
    }))
}

/// Signs a payload the way the provider does; used by tests and local tooling.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> Result<String, DomainError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const NOW: i64 = 1_760_000_000;

    fn succeeded_payload(order_id: Uuid) -> Vec<u8> {
        serde_json::json!({
            "type": "payment_intent.succeeded",
            "data": {"object": {
                "id": "pi_42",
                "metadata": {"order_id": order_id.to_string()},
                "payment_method_types": ["card"],
                "charges": {"data": [{"id": "ch_42", "receipt_url": "https://pay.example.com/r/42"}]}
            }}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn valid_signature_is_accepted() {
        let verifier = WebhookVerifier::new(SECRET);
        let payload = succeeded_payload(Uuid::new_v4());
        let header = sign_payload(SECRET, &payload, NOW).unwrap();
        assert!(verifier.verify(&payload, &header, NOW + 10).is_ok());
    }

    #[test]
    fn wrong_secret_or_modified_payload_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let payload = succeeded_payload(Uuid::new_v4());
        let forged = sign_payload("wrong_secret", &payload, NOW).unwrap();
        assert!(verifier.verify(&payload, &forged, NOW).is_err());

        let header = sign_payload(SECRET, &payload, NOW).unwrap();
        assert!(verifier.verify(b"{\"hacked\":true}", &header, NOW).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        let payload = succeeded_payload(Uuid::new_v4());
        let header = sign_payload(SECRET, &payload, NOW - 600).unwrap();
        assert!(verifier.verify(&payload, &header, NOW).is_err());
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        for header in ["", "garbage", "t=1760000000", "v1=abcdef"] {
            assert!(verifier.verify(b"{}", header, NOW).is_err(), "{}", header);
        }
    }

    #[test]
    fn missing_secret_rejects_everything() {
        let verifier = WebhookVerifier::new("");
        let header = sign_payload("", b"{}", NOW).unwrap();
        assert!(verifier.verify(b"{}", &header, NOW).is_err());
    }

    #[test]
    fn success_event_carries_payment_details() {
        let order_id = Uuid::new_v4();
        match parse_event(&succeeded_payload(order_id)).unwrap() {
            PaymentEvent::Succeeded(details) => {
                assert_eq!(details.order_id, order_id);
                assert_eq!(details.payment_id, "pi_42");
                assert_eq!(details.payment_method.as_deref(), Some("card"));
                assert_eq!(details.transaction_reference.as_deref(), Some("ch_42"));
                assert_eq!(details.receipt_url.as_deref(), Some("https://pay.example.com/r/42"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn other_events_and_missing_order_are_ignored() {
        let refund = br#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        assert!(matches!(parse_event(refund).unwrap(), PaymentEvent::Ignored(_)));

        let no_order = br#"{"type":"payment_intent.payment_failed","data":{"object":{"id":"pi_1"}}}"#;
        assert!(matches!(parse_event(no_order).unwrap(), PaymentEvent::Ignored(_)));

        assert!(parse_event(b"not json").is_err());
    }

    #[test]
    fn failure_event_names_the_order() {
        let order_id = Uuid::new_v4();
        let payload = serde_json::json!({
            "type": "payment_intent.payment_failed",
            "data": {"object": {"id": "pi_9", "metadata": {"order_id": order_id.to_string()}}}
        })
        .to_string();
        assert_eq!(
            parse_event(payload.as_bytes()).unwrap(),
            PaymentEvent::Failed { order_id }
        );
    }
}
