//! Checks: vouchers that any (or one pinned) Telegram user can activate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::CryptoAsset;
use crate::encoding::join_list;

wire_enum! {
    /// Lifecycle state of a check.
    CheckStatus, "check status" {
        /// Not yet activated.
        Active => "active",
        /// Activated by a user.
        Activated => "activated",
    }
}

/// A check as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Unique check id.
    #[serde(rename = "check_id")]
    pub id: u64,
    /// Check hash.
    pub hash: String,
    /// Asset code the check pays out. See [`Check::crypto_asset`].
    pub asset: String,
    /// Amount paid out.
    pub amount: Decimal,
    /// URL the user opens to activate the check.
    #[serde(default)]
    pub bot_check_url: String,
    /// Current status.
    pub status: CheckStatus,
    /// Creation date.
    pub created_at: DateTime<Utc>,
    /// Activation date, once activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl Check {
    /// Returns the check asset, if it is a known crypto asset.
    #[must_use]
    pub fn crypto_asset(&self) -> Option<CryptoAsset> {
        self.asset.parse().ok()
    }
}

/// Parameters for `createCheck`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCheck {
    /// Asset to pay out.
    pub asset: CryptoAsset,
    /// Amount to pay out. Must be positive.
    pub amount: Decimal,
    /// Only this Telegram user may activate the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_to_user_id: Option<u64>,
    /// Only this Telegram username may activate the check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_to_username: Option<String>,
}

impl NewCheck {
    /// A check anyone can activate.
    #[must_use]
    pub const fn new(asset: CryptoAsset, amount: Decimal) -> Self {
        Self {
            asset,
            amount,
            pin_to_user_id: None,
            pin_to_username: None,
        }
    }

    /// Pins the check to a Telegram user id.
    #[must_use]
    pub const fn pinned_to_user(mut self, user_id: u64) -> Self {
        self.pin_to_user_id = Some(user_id);
        self
    }

    /// Pins the check to a Telegram username.
    #[must_use]
    pub fn pinned_to_username(mut self, username: impl Into<String>) -> Self {
        self.pin_to_username = Some(username.into());
        self
    }
}

/// Parameters for `getChecks`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckFilter {
    /// Only checks in this asset.
    pub asset: Option<CryptoAsset>,
    /// Only these check ids.
    pub check_ids: Vec<u64>,
    /// Only checks in this status.
    pub status: Option<CheckStatus>,
    /// Number of checks to skip. Must not be negative.
    pub offset: i64,
    /// Number of checks to return, `1..=1000`.
    pub count: Option<u32>,
}

impl CheckFilter {
    fn to_wire(&self) -> CheckFilterWire {
        CheckFilterWire {
            asset: self.asset,
            check_ids: join_list(&self.check_ids),
            status: self.status,
            offset: self.offset,
            count: self.count,
        }
    }
}

impl Serialize for CheckFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

#[derive(Serialize)]
struct CheckFilterWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<CryptoAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CheckStatus>,
    #[serde(skip_serializing_if = "super::is_zero")]
    offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}
