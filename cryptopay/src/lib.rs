#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Crypto Pay payment gateway API.
//!
//! This crate holds everything that does not touch the network: request and
//! resource types, client-side validation, the response envelope decoder and
//! webhook verification. The HTTP client lives in `cryptopay-http`.
//!
//! # Modules
//!
//! - [`config`] - API token, network selection and endpoint joining
//! - [`encoding`] - Comma-joined list fields
//! - [`envelope`] - `{ok, error, result}` response decoding
//! - [`error`] - Error types
//! - [`proto`] - Wire types: invoices, checks, transfers, balances, rates, stats, updates
//! - [`validation`] - Request rules checked before anything is sent
//! - [`webhook`] - Signature verification and update parsing
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of webhook verification

pub mod config;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod proto;
pub mod validation;
pub mod webhook;

pub use config::{ApiToken, ClientConfig, Network};
pub use envelope::RawPayload;
pub use error::{BoxError, Error, ValidationError, Violation};
pub use validation::Validate;
pub use webhook::WebhookKey;
