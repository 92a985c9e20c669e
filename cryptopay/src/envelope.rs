//! Decoding of the `{ok, error, result}` response envelope.
//!
//! Every gateway response has the same outer shape:
//!
//! ```json
//! { "ok": true,  "result": { ... } }
//! { "ok": false, "error": { "code": 400, "name": "EXPIRES_IN_INVALID" } }
//! ```
//!
//! The outer envelope is decoded first with `result` held as raw JSON, so an
//! error response is never reinterpreted as a result (and vice versa). The
//! error schema is undocumented; it is surfaced verbatim as a [`RawPayload`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::error::Error;

/// Verbatim JSON passed through without interpretation.
///
/// Used for the upstream error payload and for results whose schema is not
/// documented (`getMe`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Box<RawValue>);

impl RawPayload {
    /// The JSON `null` payload.
    #[must_use]
    pub fn null() -> Self {
        Self(RawValue::NULL.to_owned())
    }

    /// Returns the payload's JSON text exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    /// Parses the payload into a caller-chosen type.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not match `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.0.get())
    }
}

impl fmt::Display for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for RawPayload {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RawPayload {}

/// Outer envelope, with the result left undecoded.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<RawPayload>,
    #[serde(default, deserialize_with = "present")]
    result: Option<Box<RawValue>>,
}

/// Keeps an explicit `null` as a raw value; only an absent field is `None`.
fn present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Box<RawValue>>, D::Error> {
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// One-field carrier the list endpoints wrap their results in.
#[derive(Debug, Deserialize)]
struct Items<T> {
    items: Vec<T>,
}

/// Decodes a response body into the operation's result type.
///
/// # Errors
///
/// - [`Error::Decode`] if the bytes are not an envelope, if `result` is
///   missing, or if it does not match `T`.
/// - [`Error::Api`] if the envelope reports `ok: false`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    let envelope: Envelope = serde_json::from_slice(bytes).map_err(Error::Decode)?;
    if !envelope.ok {
        return Err(Error::Api(envelope.error.unwrap_or_else(RawPayload::null)));
    }
    let result = envelope
        .result
        .ok_or_else(|| Error::Decode(serde::de::Error::missing_field("result")))?;
    serde_json::from_str(result.get()).map_err(Error::Decode)
}

/// Decodes a response whose result is an `{"items": [...]}` carrier and
/// returns the bare list, in wire order.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_items<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, Error> {
    decode::<Items<T>>(bytes).map(|carrier| carrier.items)
}
