//! Webhook signature verification and update parsing.
//!
//! The gateway signs each webhook body with
//! `hex(HMAC-SHA256(SHA-256(token), body))` and sends the result in the
//! `crypto-pay-api-signature` header. [`WebhookKey`] holds the derived key;
//! [`WebhookKey::parse_update`] runs the whole check on an already buffered
//! body.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::ApiToken;
use crate::error::Error;
use crate::proto::Update;

type HmacSha256 = Hmac<Sha256>;

/// HMAC key derived from the API token.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookKey([u8; 32]);

impl WebhookKey {
    /// Derives the key as `SHA-256(token)`.
    #[must_use]
    pub fn derive(token: &ApiToken) -> Self {
        Self(Sha256::digest(token.expose().as_bytes()).into())
    }

    /// Returns the lowercase hex signature the gateway would send for `body`.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> String {
        hex::encode(self.mac(body))
    }

    /// Checks `signature` against `body` in constant time.
    ///
    /// The header value must equal the lowercase hex MAC exactly; padding or
    /// case changes are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureMismatch`] if the signature does not match.
    pub fn verify(&self, signature: &str, body: &[u8]) -> Result<(), Error> {
        let expected = self.sign(body);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(Error::SignatureMismatch)
        }
    }

    /// Verifies and parses a webhook delivery.
    ///
    /// `signature` is the value of the signature header, `None` if the
    /// header was absent. An empty value counts as absent. The body is only
    /// parsed once the signature has been accepted.
    ///
    /// # Errors
    ///
    /// - [`Error::SignatureMissing`] if `signature` is `None` or empty.
    /// - [`Error::SignatureMismatch`] if the signature does not match.
    /// - [`Error::UnparseableUpdate`] if the body is not an [`Update`].
    #[cfg_attr(feature = "telemetry", instrument(name = "cryptopay.webhook", skip_all, err))]
    pub fn parse_update(&self, signature: Option<&str>, body: &[u8]) -> Result<Update, Error> {
        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or(Error::SignatureMissing)?;
        self.verify(signature, body)?;
        serde_json::from_slice(body).map_err(Error::UnparseableUpdate)
    }

    fn mac(&self, body: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.0).expect("HMAC accepts any key length");
        mac.update(body);
        mac.finalize().into_bytes().into()
    }
}

impl fmt::Debug for WebhookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "1234:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw";
    const BODY: &[u8] = br#"{"update_id":1,"update_type":"invoice_paid","request_date":"2024-03-01T10:05:13.000Z","payload":{"invoice_id":7,"hash":"IVx","currency_type":"crypto","asset":"TON","amount":"1","status":"paid","created_at":"2024-03-01T10:00:00.000Z"}}"#;

    fn key() -> WebhookKey {
        WebhookKey::derive(&ApiToken::new(TOKEN).unwrap())
    }

    fn reference_signature(body: &[u8]) -> String {
        let secret = Sha256::digest(TOKEN.as_bytes());
        let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_yields_update() {
        let signature = reference_signature(BODY);
        assert_eq!(key().sign(BODY), signature);
        let update = key().parse_update(Some(&signature), BODY).unwrap();
        assert_eq!(update.id, 1);
        assert_eq!(update.payload.id, 7);
    }

    #[test]
    fn flipped_body_byte_is_rejected() {
        let signature = reference_signature(BODY);
        let mut tampered = BODY.to_vec();
        tampered[20] ^= 0x01;
        let err = key().parse_update(Some(&signature), &tampered).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }

    #[test]
    fn flipped_signature_byte_is_rejected() {
        let mut signature = reference_signature(BODY).into_bytes();
        signature[0] = if signature[0] == b'0' { b'1' } else { b'0' };
        let signature = String::from_utf8(signature).unwrap();
        let err = key().parse_update(Some(&signature), BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let signature = reference_signature(BODY);
        let err = key().verify(&signature[..10], BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }

    #[test]
    fn missing_signature_is_reported() {
        let err = key().parse_update(None, BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMissing));
    }

    #[test]
    fn empty_signature_counts_as_missing() {
        let err = key().parse_update(Some(""), BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMissing));
    }

    #[test]
    fn padded_signature_is_rejected() {
        let padded = format!(" {}\n", reference_signature(BODY));
        let err = key().parse_update(Some(&padded), BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }

    #[test]
    fn uppercase_signature_is_rejected() {
        let upper = reference_signature(BODY).to_uppercase();
        let err = key().verify(&upper, BODY).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }

    #[test]
    fn update_with_unlisted_assets_is_accepted() {
        let body = br#"{"update_id":2,"update_type":"invoice_paid","request_date":"2024-03-01T10:05:13.000Z","payload":{"invoice_id":8,"hash":"IVy","currency_type":"fiat","fiat":"USD","accepted_assets":["USDT","NOT"],"amount":"5","paid_asset":"NOT","paid_amount":"120","fee_asset":"NOT","status":"paid","created_at":"2024-03-01T10:00:00.000Z"}}"#;
        let signature = reference_signature(body);
        let update = key().parse_update(Some(&signature), body).unwrap();
        assert_eq!(update.payload.paid_asset.as_deref(), Some("NOT"));
        assert_eq!(update.payload.paid_crypto_asset(), None);
        assert!(update.payload.is_paid());
    }

    #[test]
    fn authentic_garbage_is_unparseable() {
        let body = br#"{"update_id":"not-a-number"}"#;
        let signature = key().sign(body);
        let err = key().parse_update(Some(&signature), body).unwrap_err();
        assert!(matches!(err, Error::UnparseableUpdate(_)));
    }

    #[test]
    fn different_tokens_derive_different_keys() {
        let other = WebhookKey::derive(&ApiToken::new("5678:other").unwrap());
        assert_ne!(key(), other);
        assert!(!format!("{other:?}").contains("5678"));
    }
}
