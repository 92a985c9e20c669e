//! [`CryptoPayClient`]: every Crypto Pay API operation over a [`Transport`].
//!
//! Each operation follows the same path: validate the descriptor, join the
//! endpoint path onto the base URL, serialize the wire body, attach the
//! token header, send through the transport, then decode the envelope.
//! A descriptor that fails validation never reaches the transport.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use cryptopay::envelope::{self, RawPayload};
use cryptopay::proto::{
    AppStats, AppStatsFilter, Balance, Check, CheckFilter, ExchangeRate, Invoice, InvoiceFilter,
    NewCheck, NewInvoice, NewTransfer, Transfer, TransferFilter, Update,
};
use cryptopay::{ClientConfig, Error, Validate, WebhookKey};
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method};
use http_body::Body;
use serde::Serialize;
use serde_json::json;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

use crate::constants::{
    API_TOKEN_HEADER, CREATE_CHECK, CREATE_INVOICE, DELETE_CHECK, DELETE_INVOICE, GET_BALANCE,
    GET_CHECKS, GET_EXCHANGE_RATES, GET_INVOICES, GET_ME, GET_STATS, GET_TRANSFERS, TRANSFER,
};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::webhook::UpdateHandler;

/// Decoder applied to a response body.
type Decoder<R> = fn(&[u8]) -> Result<R, Error>;

/// Client for the Crypto Pay API.
///
/// Holds only immutable state, so it is cheap to clone and safe to share
/// across tasks.
pub struct CryptoPayClient<T: ?Sized = ReqwestTransport> {
    config: ClientConfig,
    key: WebhookKey,
    transport: Arc<T>,
}

impl CryptoPayClient {
    /// Creates a client that sends requests with `reqwest`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Creates a client from `CRYPTO_PAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is missing or the network is
    /// unknown.
    pub fn from_env() -> Result<Self, Error> {
        ClientConfig::from_env().map(Self::new)
    }
}

impl<T: Transport> CryptoPayClient<T> {
    /// Creates a client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }
}

impl<T: Transport + ?Sized> CryptoPayClient<T> {
    /// Creates a client over a transport shared with other clients.
    #[must_use]
    pub fn with_shared_transport(config: ClientConfig, transport: Arc<T>) -> Self {
        let key = WebhookKey::derive(config.token());
        Self {
            config,
            key,
            transport,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the webhook key derived from the API token.
    #[must_use]
    pub const fn webhook_key(&self) -> &WebhookKey {
        &self.key
    }

    /// Returns an [`UpdateHandler`] sharing this client's webhook key.
    #[must_use]
    pub fn update_handler(&self) -> UpdateHandler {
        UpdateHandler::new(self.key.clone())
    }

    /// Returns basic information about the app.
    ///
    /// The result schema is undocumented and is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the request fails or the gateway rejects it.
    pub async fn get_me(&self) -> Result<RawPayload, Error> {
        self.call(Method::GET, GET_ME, None, envelope::decode).await
    }

    /// Creates an invoice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `invoice`
    /// breaks a rule, otherwise any transport, decode or API error.
    pub async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, Error> {
        let body = checked_body(invoice)?;
        self.call(Method::POST, CREATE_INVOICE, Some(body), envelope::decode)
            .await
    }

    /// Deletes an invoice. Returns the gateway's confirmation flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the request fails or the gateway rejects it.
    pub async fn delete_invoice(&self, invoice_id: u64) -> Result<bool, Error> {
        let body = encode(&json!({ "invoice_id": invoice_id }))?;
        self.call(Method::POST, DELETE_INVOICE, Some(body), envelope::decode)
            .await
    }

    /// Lists invoices matching `filter`, in gateway order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `filter`
    /// breaks a rule, otherwise any transport, decode or API error.
    pub async fn get_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, Error> {
        let body = checked_body(filter)?;
        self.call(Method::POST, GET_INVOICES, Some(body), envelope::decode_items)
            .await
    }

    /// Creates a check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `check`
    /// breaks a rule, otherwise any transport, decode or API error.
    pub async fn create_check(&self, check: &NewCheck) -> Result<Check, Error> {
        let body = checked_body(check)?;
        self.call(Method::POST, CREATE_CHECK, Some(body), envelope::decode)
            .await
    }

    /// Deletes a check. Returns the gateway's confirmation flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the request fails or the gateway rejects it.
    pub async fn delete_check(&self, check_id: u64) -> Result<bool, Error> {
        let body = encode(&json!({ "check_id": check_id }))?;
        self.call(Method::POST, DELETE_CHECK, Some(body), envelope::decode)
            .await
    }

    /// Lists checks matching `filter`, in gateway order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `filter`
    /// breaks a rule, otherwise any transport, decode or API error.
    pub async fn get_checks(&self, filter: &CheckFilter) -> Result<Vec<Check>, Error> {
        let body = checked_body(filter)?;
        self.call(Method::POST, GET_CHECKS, Some(body), envelope::decode_items)
            .await
    }

    /// Sends coins from the app balance to a user.
    ///
    /// A repeated `spend_id` never moves funds twice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `transfer`
    /// breaks a rule, otherwise any transport, decode or API error. A
    /// transport error leaves the outcome unknown; retry with the same
    /// `spend_id`.
    pub async fn transfer(&self, transfer: &NewTransfer) -> Result<Transfer, Error> {
        let body = checked_body(transfer)?;
        self.call(Method::POST, TRANSFER, Some(body), envelope::decode)
            .await
    }

    /// Lists transfers matching `filter`, in gateway order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `filter`
    /// breaks a rule, otherwise any transport, decode or API error.
    pub async fn get_transfers(&self, filter: &TransferFilter) -> Result<Vec<Transfer>, Error> {
        let body = checked_body(filter)?;
        self.call(Method::POST, GET_TRANSFERS, Some(body), envelope::decode_items)
            .await
    }

    /// Returns the app's balance in every currency.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the request fails or the gateway rejects it.
    pub async fn get_balance(&self) -> Result<Vec<Balance>, Error> {
        self.call(Method::GET, GET_BALANCE, None, envelope::decode)
            .await
    }

    /// Returns the current exchange rates.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the request fails or the gateway rejects it.
    pub async fn get_exchange_rates(&self) -> Result<Vec<ExchangeRate>, Error> {
        self.call(Method::GET, GET_EXCHANGE_RATES, None, envelope::decode)
            .await
    }

    /// Returns app statistics for the window in `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if the window
    /// is reversed, otherwise any transport, decode or API error.
    pub async fn get_stats(&self, filter: &AppStatsFilter) -> Result<AppStats, Error> {
        let body = checked_body(filter)?;
        self.call(Method::POST, GET_STATS, Some(body), envelope::decode)
            .await
    }

    /// Verifies and parses a webhook request addressed to this app.
    ///
    /// # Errors
    ///
    /// See [`UpdateHandler::handle`].
    pub async fn handle_update<B>(&self, request: http::Request<B>) -> Result<Update, Error>
    where
        B: Body,
        B::Error: Into<cryptopay::BoxError>,
    {
        self.update_handler().handle(request).await
    }

    /// Sends one request and decodes the response with `decode`.
    async fn call<R>(
        &self,
        method: Method,
        path: &'static str,
        body: Option<Bytes>,
        decode: Decoder<R>,
    ) -> Result<R, Error> {
        let fut = async {
            let result = async {
                let request = self.build(method, path, body)?;
                let bytes = self.transport.send(request).await.map_err(Error::Transport)?;
                decode(&bytes)
            }
            .await;
            record_result_on_span(&result);
            result
        };
        #[cfg(feature = "telemetry")]
        return fut
            .instrument(tracing::info_span!(
                "cryptopay.call",
                api.method = path,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            ))
            .await;
        #[cfg(not(feature = "telemetry"))]
        fut.await
    }

    fn build(
        &self,
        method: Method,
        path: &'static str,
        body: Option<Bytes>,
    ) -> Result<HttpRequest, Error> {
        let url = self.config.endpoint(path)?;
        let mut token = HeaderValue::from_str(self.config.token().expose())
            .map_err(|_| Error::Config("API token is not a valid header value".into()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, token);
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

impl<T: ?Sized> Clone for CryptoPayClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            key: self.key.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: ?Sized> fmt::Debug for CryptoPayClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoPayClient")
            .field("base_url", &self.config.base_url().as_str())
            .finish_non_exhaustive()
    }
}

/// Validates a descriptor, then serializes its wire shape.
fn checked_body<D: Validate + Serialize>(descriptor: &D) -> Result<Bytes, Error> {
    descriptor.validate()?;
    encode(descriptor)
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Bytes, Error> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(Error::Encode)
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R, Error>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::DEBUG, error = %err, "Crypto Pay call failed");
        }
    }
}

/// Records the outcome of a call on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span<R>(_result: &Result<R, Error>) {}
