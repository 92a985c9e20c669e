//! Pluggable HTTP transport.
//!
//! [`CryptoPayClient`](crate::CryptoPayClient) never talks to the network
//! directly. It builds an [`HttpRequest`] and hands it to a [`Transport`],
//! which returns the raw response body. The body is returned for every HTTP
//! status: the gateway reports failures inside the `{ok, error}` envelope,
//! and that envelope is authoritative.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cryptopay::BoxError;
use http::{HeaderMap, Method};
use reqwest::Client;
use url::Url;

/// A boxed, `Send` future. Keeps [`Transport`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully built request, ready to send.
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute endpoint URL.
    pub url: Url,
    /// Request headers, including the API token.
    pub headers: HeaderMap,
    /// JSON body, if the operation has parameters.
    pub body: Option<Bytes>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values are left out: one of them is the API token.
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

/// Sends one request and returns the raw response body.
///
/// Implementations must not retry: every client operation maps to exactly
/// one `send` call.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response body, whatever the status.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, BoxError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, BoxError>> {
        (**self).send(request)
    }
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh `reqwest` client and no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing `reqwest` client (proxies, TLS settings, pools).
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, BoxError>> {
        Box::pin(async move {
            let mut req = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                req = req.body(body);
            }
            if let Some(timeout) = self.timeout {
                req = req.timeout(timeout);
            }
            let response = req.send().await?;
            Ok(response.bytes().await?)
        })
    }
}
