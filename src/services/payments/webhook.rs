use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::errors::AppError;

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=..]`) against the raw body.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now_unix: i64,
) -> Result<(), AppError> {
    let mut timestamp = None;
    let mut candidates = vec![];
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
            Some(("v1", v)) => candidates.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| AppError::invalid("Invalid signature"))?;
    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::invalid("Invalid signature"));
    }

    for candidate in candidates {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| AppError::invalid("Invalid signature"))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::invalid("Invalid signature"))
}

/// Signs a payload the way Stripe does; returns the full header value.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PaymentSucceeded { intent_id: String, booking_id: String },
    PaymentFailed { intent_id: String, booking_id: String },
    Ignored(String),
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawData,
}

#[derive(Deserialize)]
struct RawData {
    object: RawIntent,
}

#[derive(Deserialize)]
struct RawIntent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, AppError> {
    let raw: RawEvent =
        serde_json::from_slice(payload).map_err(|_| AppError::invalid("Invalid payload"))?;

    let booking_id = || {
        raw.data
            .object
            .metadata
            .get("booking_id")
            .cloned()
            .ok_or_else(|| AppError::invalid("Invalid payload: missing booking_id"))
    };

    match raw.kind.as_str() {
        "payment_intent.succeeded" => Ok(WebhookEvent::PaymentSucceeded {
            intent_id: raw.data.object.id.clone(),
            booking_id: booking_id()?,
        }),
        "payment_intent.payment_failed" => Ok(WebhookEvent::PaymentFailed {
            intent_id: raw.data.object.id.clone(),
            booking_id: booking_id()?,
        }),
        other => Ok(WebhookEvent::Ignored(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","metadata":{"booking_id":"b-1"}}}}"#;

    #[test]
    fn test_valid_signature() {
        let header = sign_payload(SECRET, BODY, 1_700_000_000);
        assert!(verify_signature(SECRET, BODY, &header, 1_700_000_010).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign_payload(SECRET, BODY, 1_700_000_000);
        let tampered = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_2","metadata":{"booking_id":"b-1"}}}}"#;
        assert!(verify_signature(SECRET, tampered, &header, 1_700_000_000).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = sign_payload("other", BODY, 1_700_000_000);
        assert!(verify_signature(SECRET, BODY, &header, 1_700_000_000).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let header = sign_payload(SECRET, BODY, 1_700_000_000);
        let later = 1_700_000_000 + SIGNATURE_TOLERANCE_SECS + 1;
        assert!(verify_signature(SECRET, BODY, &header, later).is_err());
    }

    #[test]
    fn test_malformed_header_rejected() {
        for header in ["", "garbage", "t=abc,v1=00", "v1=deadbeef"] {
            assert!(matches!(
                verify_signature(SECRET, BODY, header, 1_700_000_000),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            parse_event(BODY).unwrap(),
            WebhookEvent::PaymentSucceeded {
                intent_id: "pi_1".into(),
                booking_id: "b-1".into()
            }
        );

        let failed = br#"{"type":"payment_intent.payment_failed","data":{"object":{"id":"pi_1","metadata":{"booking_id":"b-9"}}}}"#;
        assert!(matches!(
            parse_event(failed).unwrap(),
            WebhookEvent::PaymentFailed { booking_id, .. } if booking_id == "b-9"
        ));

        let other = br#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        assert_eq!(
            parse_event(other).unwrap(),
            WebhookEvent::Ignored("charge.refunded".into())
        );

        assert!(parse_event(b"not json").is_err());
        let missing = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","metadata":{}}}}"#;
        assert!(parse_event(missing).is_err());
    }
}
