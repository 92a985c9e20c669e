//! Error types for the Crypto Pay client.
//!
//! Every fallible operation in the workspace reports through [`Error`]. The
//! variants mirror the stages of a call: validation happens before any I/O,
//! transport failures come from the injected transport, and decode/API errors
//! come from the response envelope.

use std::fmt;

use crate::envelope::RawPayload;

/// Boxed error type produced by transport implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Base error type for Crypto Pay operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client construction failed (missing token, missing endpoint).
    #[error("configuration error: {0}")]
    Config(String),

    /// An endpoint URL could not be built from the configured base.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The request failed one or more validation rules. No request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport failed to deliver the request or read the response.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response did not match the expected envelope or result shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The gateway answered with `ok: false`. The payload is passed through
    /// verbatim.
    #[error("API error: {0}")]
    Api(RawPayload),

    /// The webhook request carried no signature header.
    #[error("crypto-pay-api-signature header was not found")]
    SignatureMissing,

    /// The webhook signature does not match the request body.
    #[error("failed to verify the update signature")]
    SignatureMismatch,

    /// The webhook body was authentic but is not a valid update.
    #[error("failed to parse the update: {0}")]
    UnparseableUpdate(#[source] serde_json::Error),
}

impl Error {
    /// Returns `true` if the error was raised before any network I/O.
    #[must_use]
    pub const fn is_pre_network(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::UrlParse { .. } | Self::Validation(_) | Self::Encode(_)
        )
    }

    /// Returns the upstream error payload for [`Error::Api`].
    #[must_use]
    pub const fn api_payload(&self) -> Option<&RawPayload> {
        match self {
            Self::Api(payload) => Some(payload),
            _ => None,
        }
    }
}

/// A single violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the rule.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every rule a request violated, in the order they were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates an error from a non-empty list of violations.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the collected violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if any violation concerns `field`.
    #[must_use]
    pub fn concerns(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid request: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
