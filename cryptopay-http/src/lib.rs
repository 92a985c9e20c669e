#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP layer for the Crypto Pay API.
//!
//! [`CryptoPayClient`] exposes every API operation on top of a pluggable
//! [`Transport`] (a `reqwest` implementation is provided), and
//! [`UpdateHandler`] verifies webhook requests arriving as `http::Request`s.
//!
//! # Modules
//!
//! - [`client`] - The API client
//! - [`constants`] - Header names and endpoint paths
//! - [`transport`] - Transport trait and the `reqwest` transport
//! - [`webhook`] - Webhook request adapter
//!
//! # Feature Flags
//!
//! - `telemetry` - Records a tracing span per API call
//!
//! # Example
//!
//! ```no_run
//! use cryptopay::proto::{CryptoAsset, NewInvoice};
//! use cryptopay::{ClientConfig, Network};
//! use cryptopay_http::CryptoPayClient;
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> Result<(), cryptopay::Error> {
//! let client = CryptoPayClient::new(ClientConfig::new("1234:token", Network::Testnet)?);
//! let invoice = client
//!     .create_invoice(&NewInvoice::crypto(CryptoAsset::Ton, Decimal::new(15, 1)))
//!     .await?;
//! println!("pay at {}", invoice.bot_invoice_url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod transport;
pub mod webhook;

pub use client::CryptoPayClient;
pub use transport::{BoxFuture, HttpRequest, ReqwestTransport, Transport};
pub use webhook::UpdateHandler;
