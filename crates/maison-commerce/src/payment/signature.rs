//! Gateway signature checks.
//!
//! The gateway signs a completed checkout with
//! `HMAC-SHA256(key_secret, "<gateway_order_id>|<gateway_payment_id>")` and
//! every webhook body with `HMAC-SHA256(webhook_secret, body)`, both
//! hex-encoded. Verification goes through [`Mac::verify_slice`], which
//! compares in constant time.

use crate::error::CommerceError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> Result<HmacSha256, CommerceError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CommerceError::validation(format!("invalid signing secret: {e}")))
}

fn verify(mac: HmacSha256, signature: &str) -> bool {
    match hex::decode(signature.trim()) {
        Ok(expected) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

/// Signature the gateway returns after a successful checkout.
pub fn payment_signature(
    key_secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
) -> Result<String, CommerceError> {
    let mut mac = mac_for(key_secret)?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a checkout signature sent back by the client.
pub fn verify_payment_signature(
    key_secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    signature: &str,
) -> Result<(), CommerceError> {
    let mut mac = mac_for(key_secret)?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    if verify(mac, signature) {
        Ok(())
    } else {
        Err(CommerceError::InvalidSignature)
    }
}

/// Signature of a raw webhook body.
pub fn webhook_signature(webhook_secret: &str, body: &[u8]) -> Result<String, CommerceError> {
    let mut mac = mac_for(webhook_secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check the signature header of a webhook delivery.
pub fn verify_webhook_signature(
    webhook_secret: &str,
    body: &[u8],
    signature: &str,
) -> Result<(), CommerceError> {
    let mut mac = mac_for(webhook_secret)?;
    mac.update(body);
    if verify(mac, signature) {
        Ok(())
    } else {
        Err(CommerceError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_signature_round_trip() {
        let sig = payment_signature("secret", "order_1", "pay_1").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify_payment_signature("secret", "order_1", "pay_1", &sig).is_ok());
    }

    #[test]
    fn test_payment_signature_mismatch() {
        let sig = payment_signature("secret", "order_1", "pay_1").unwrap();
        assert!(matches!(
            verify_payment_signature("secret", "order_1", "pay_2", &sig),
            Err(CommerceError::InvalidSignature)
        ));
        assert!(verify_payment_signature("other", "order_1", "pay_1", &sig).is_err());
        assert!(verify_payment_signature("secret", "order_1", "pay_1", "not-hex").is_err());
    }

    #[test]
    fn test_known_hmac_vector() {
        // RFC 4231 test case 2.
        let sig = webhook_signature("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_webhook_signature() {
        let body = br#"{"event":"payment.captured"}"#;
        let sig = webhook_signature("whsec", body).unwrap();
        assert!(verify_webhook_signature("whsec", body, &sig).is_ok());
        assert!(verify_webhook_signature("whsec", b"{}", &sig).is_err());
    }
}
