//! Webhook adapter for `http::Request`.
//!
//! Works with any body implementing [`http_body::Body`], so it plugs into
//! hyper, axum or any other `http`-based server without extra glue.

use cryptopay::proto::Update;
use cryptopay::{BoxError, Error, WebhookKey};
use http_body::Body;
use http_body_util::BodyExt;

use crate::constants::SIGNATURE_HEADER;

/// Verifies inbound webhook requests and parses them into [`Update`]s.
#[derive(Debug, Clone)]
pub struct UpdateHandler {
    key: WebhookKey,
}

impl UpdateHandler {
    /// Creates a handler for the given key.
    #[must_use]
    pub const fn new(key: WebhookKey) -> Self {
        Self { key }
    }

    /// Returns the webhook key.
    #[must_use]
    pub const fn key(&self) -> &WebhookKey {
        &self.key
    }

    /// Verifies and parses one webhook request.
    ///
    /// The signature header is checked before the body is touched; the body
    /// is then read exactly once, fully buffered.
    ///
    /// # Errors
    ///
    /// - [`Error::SignatureMissing`] if the signature header is absent or
    ///   empty.
    /// - [`Error::Transport`] if the body cannot be read.
    /// - [`Error::SignatureMismatch`] if the signature does not match.
    /// - [`Error::UnparseableUpdate`] if the body is not an [`Update`].
    pub async fn handle<B>(&self, request: http::Request<B>) -> Result<Update, Error>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        let signature = match parts.headers.get(SIGNATURE_HEADER) {
            None => return Err(Error::SignatureMissing),
            Some(value) if value.is_empty() => return Err(Error::SignatureMissing),
            // A non-ASCII header value cannot be a hex signature.
            Some(value) => value.to_str().map_err(|_| Error::SignatureMismatch)?,
        };
        let bytes = body
            .collect()
            .await
            .map_err(|e| Error::Transport(e.into()))?
            .to_bytes();
        self.key.parse_update(Some(signature), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cryptopay::ApiToken;
    use http_body::Frame;
    use http_body_util::Full;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    const BODY: &str = r#"{"update_id":1,"update_type":"invoice_paid","request_date":"2024-03-01T10:05:13.000Z","payload":{"invoice_id":7,"hash":"IVx","currency_type":"crypto","asset":"TON","amount":"1","status":"paid","created_at":"2024-03-01T10:00:00.000Z"}}"#;

    /// Body that fails the test if anything polls it.
    struct UntouchableBody;

    impl Body for UntouchableBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            panic!("body was read before the signature header was checked")
        }
    }

    fn handler() -> UpdateHandler {
        UpdateHandler::new(WebhookKey::derive(&ApiToken::new("1234:test").unwrap()))
    }

    #[tokio::test]
    async fn signed_request_is_parsed() {
        let handler = handler();
        let signature = handler.key().sign(BODY.as_bytes());
        let request = http::Request::post("/webhook")
            .header(SIGNATURE_HEADER, signature)
            .body(Full::new(Bytes::from_static(BODY.as_bytes())))
            .unwrap();
        let update = handler.handle(request).await.unwrap();
        assert_eq!(update.id, 1);
    }

    #[tokio::test]
    async fn header_name_is_case_insensitive() {
        let handler = handler();
        let signature = handler.key().sign(BODY.as_bytes());
        let request = http::Request::post("/webhook")
            .header("Crypto-Pay-API-Signature", signature)
            .body(Full::new(Bytes::from_static(BODY.as_bytes())))
            .unwrap();
        assert!(handler.handle(request).await.is_ok());
    }

    #[tokio::test]
    async fn missing_header_never_reads_the_body() {
        let request = http::Request::post("/webhook")
            .body(UntouchableBody)
            .unwrap();
        let err = handler().handle(request).await.unwrap_err();
        assert!(matches!(err, Error::SignatureMissing));
    }

    #[tokio::test]
    async fn empty_header_never_reads_the_body() {
        let request = http::Request::post("/webhook")
            .header(SIGNATURE_HEADER, "")
            .body(UntouchableBody)
            .unwrap();
        let err = handler().handle(request).await.unwrap_err();
        assert!(matches!(err, Error::SignatureMissing));
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let request = http::Request::post("/webhook")
            .header(SIGNATURE_HEADER, "00".repeat(32))
            .body(Full::new(Bytes::from_static(BODY.as_bytes())))
            .unwrap();
        let err = handler().handle(request).await.unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch));
    }
}
