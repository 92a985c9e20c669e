//! Webhook updates pushed by the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Invoice;

wire_enum! {
    /// Kind of webhook update.
    UpdateType, "update type" {
        /// An invoice was paid.
        InvoicePaid => "invoice_paid",
    }
}

/// A webhook notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Non-unique update id.
    #[serde(rename = "update_id")]
    pub id: u64,
    /// Kind of update.
    pub update_type: UpdateType,
    /// When the gateway sent the request.
    pub request_date: DateTime<Utc>,
    /// The invoice the update concerns.
    pub payload: Invoice,
}
