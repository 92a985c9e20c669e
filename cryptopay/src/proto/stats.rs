//! App statistics for a time window.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Statistics returned by `getStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStats {
    /// Total volume of paid invoices, in USD.
    pub volume: Decimal,
    /// Share of created invoices that were paid.
    pub conversion: Decimal,
    /// Number of distinct paying users.
    pub unique_users_count: u64,
    /// Number of invoices created.
    pub created_invoice_count: u64,
    /// Number of invoices paid.
    pub paid_invoice_count: u64,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
}

/// Parameters for `getStats`.
///
/// Without bounds the gateway reports the last 24 hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppStatsFilter {
    /// Window start.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rfc3339"
    )]
    pub start_at: Option<DateTime<Utc>>,
    /// Window end.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rfc3339"
    )]
    pub end_at: Option<DateTime<Utc>>,
}

impl AppStatsFilter {
    /// A window between two instants.
    #[must_use]
    pub const fn between(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: Some(end_at),
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_rfc3339<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        None => serializer.serialize_none(),
    }
}
