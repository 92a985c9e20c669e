//! Transfers: direct payouts from the app balance to a Telegram user.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::CryptoAsset;
use crate::encoding::join_list;

wire_enum! {
    /// Lifecycle state of a transfer.
    TransferStatus, "transfer status" {
        /// Delivered to the user.
        Completed => "completed",
    }
}

/// A transfer as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique transfer id.
    #[serde(rename = "transfer_id")]
    pub id: u64,
    /// Idempotency key supplied at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_id: Option<String>,
    /// Recipient's Telegram user id.
    pub user_id: u64,
    /// Asset code transferred. See [`Transfer::crypto_asset`].
    pub asset: String,
    /// Amount transferred.
    pub amount: Decimal,
    /// Current status.
    pub status: TransferStatus,
    /// Completion date.
    pub completed_at: DateTime<Utc>,
    /// Comment shown to the recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Transfer {
    /// Returns the transferred asset, if it is a known crypto asset.
    #[must_use]
    pub fn crypto_asset(&self) -> Option<CryptoAsset> {
        self.asset.parse().ok()
    }
}

/// Parameters for `transfer`.
///
/// `spend_id` makes the call idempotent: the gateway executes at most one
/// transfer per spend id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTransfer {
    /// Recipient's Telegram user id. The user must have started the bot.
    pub user_id: u64,
    /// Asset to transfer.
    pub asset: CryptoAsset,
    /// Amount to transfer. Must be positive.
    pub amount: Decimal,
    /// Idempotency key, 1 to 64 characters.
    pub spend_id: String,
    /// Comment shown to the recipient. 1024 characters max.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Suppress the recipient's notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_send_notification: Option<bool>,
}

impl NewTransfer {
    /// A transfer of `amount` `asset` to `user_id`, keyed by `spend_id`.
    #[must_use]
    pub fn new(
        user_id: u64,
        asset: CryptoAsset,
        amount: Decimal,
        spend_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            asset,
            amount,
            spend_id: spend_id.into(),
            comment: None,
            disable_send_notification: None,
        }
    }

    /// Sets the comment shown to the recipient.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Suppresses the recipient's notification.
    #[must_use]
    pub const fn silent(mut self) -> Self {
        self.disable_send_notification = Some(true);
        self
    }
}

/// Parameters for `getTransfers`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFilter {
    /// Only transfers in this asset.
    pub asset: Option<CryptoAsset>,
    /// Only these transfer ids.
    pub transfer_ids: Vec<u64>,
    /// Only the transfer with this spend id. 64 characters max.
    pub spend_id: Option<String>,
    /// Number of transfers to skip. Must not be negative.
    pub offset: i64,
    /// Number of transfers to return, `1..=1000`.
    pub count: Option<u32>,
}

impl TransferFilter {
    fn to_wire(&self) -> TransferFilterWire<'_> {
        TransferFilterWire {
            asset: self.asset,
            transfer_ids: join_list(&self.transfer_ids),
            spend_id: self.spend_id.as_deref(),
            offset: self.offset,
            count: self.count,
        }
    }
}

impl Serialize for TransferFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

#[derive(Serialize)]
struct TransferFilterWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<CryptoAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transfer_ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spend_id: Option<&'a str>,
    #[serde(skip_serializing_if = "super::is_zero")]
    offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}
