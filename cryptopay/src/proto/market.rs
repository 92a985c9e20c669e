//! Account balances and exchange rates.
//!
//! Currency codes here are kept as strings: the gateway lists every asset it
//! knows about, including ones this crate has no variant for yet. Use the
//! typed accessors to narrow them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CryptoAsset, FiatCurrency};

/// Balance of one currency held by the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Currency code, e.g. `"USDT"`.
    pub currency_code: String,
    /// Amount available for use.
    pub available: Decimal,
    /// Amount reserved by pending operations.
    #[serde(default)]
    pub onhold: Decimal,
}

impl Balance {
    /// Returns the currency as a known crypto asset.
    #[must_use]
    pub fn asset(&self) -> Option<CryptoAsset> {
        self.currency_code.parse().ok()
    }

    /// Returns `available + onhold`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.onhold
    }
}

/// One source/target exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Whether the rate is currently valid.
    pub is_valid: bool,
    /// Whether the source is a crypto asset.
    #[serde(default)]
    pub is_crypto: bool,
    /// Whether the source is a fiat currency.
    #[serde(default)]
    pub is_fiat: bool,
    /// Source currency code.
    pub source: String,
    /// Target currency code.
    pub target: String,
    /// Price of one `source` in `target`.
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Returns the source as a known crypto asset.
    #[must_use]
    pub fn source_asset(&self) -> Option<CryptoAsset> {
        self.source.parse().ok()
    }

    /// Returns the target as a known fiat currency.
    #[must_use]
    pub fn target_fiat(&self) -> Option<FiatCurrency> {
        self.target.parse().ok()
    }
}

/// Finds the valid rate from `source` to `target`, if listed.
#[must_use]
pub fn find_rate<'a>(
    rates: &'a [ExchangeRate],
    source: &str,
    target: &str,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .find(|r| r.is_valid && r.source == source && r.target == target)
}
