//! Wire types for the Crypto Pay API.
//!
//! # Key Types
//!
//! - [`Invoice`] / [`NewInvoice`] / [`InvoiceFilter`] - Invoices
//! - [`Check`] / [`NewCheck`] / [`CheckFilter`] - Checks
//! - [`Transfer`] / [`NewTransfer`] / [`TransferFilter`] - Transfers
//! - [`Balance`], [`ExchangeRate`], [`AppStats`] - Read-only account data
//! - [`Update`] - Webhook notification
//!
//! # Wire Format
//!
//! Field names are `snake_case`. Amounts travel as decimal strings and dates
//! as ISO-8601 strings. Request types that carry lists serialize through a
//! private wire struct that joins the lists with [`crate::encoding::join_list`].

/// Error returned when parsing an unknown enum tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownTag {
    kind: &'static str,
    value: String,
}

/// Declares a closed set of string tags with serde, `Display` and `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            /// Every tag in this set.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire tag.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::proto::UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Self::$variant),)+
                    other => Err($crate::proto::UnknownTag {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Whether an invoice is priced in crypto or in fiat.
    CurrencyType, "currency type" {
        /// Priced in a crypto asset.
        Crypto => "crypto",
        /// Priced in a fiat currency, paid in one of the accepted assets.
        Fiat => "fiat",
    }
}

wire_enum! {
    /// Crypto assets supported by the gateway.
    CryptoAsset, "crypto asset" {
        /// Tether.
        Usdt => "USDT",
        /// Toncoin.
        Ton => "TON",
        /// Bitcoin.
        Btc => "BTC",
        /// Ether.
        Eth => "ETH",
        /// Litecoin.
        Ltc => "LTC",
        /// BNB.
        Bnb => "BNB",
        /// Tron.
        Trx => "TRX",
        /// USD Coin.
        Usdc => "USDC",
    }
}

wire_enum! {
    /// Fiat currencies invoices can be priced in.
    FiatCurrency, "fiat currency" {
        /// US Dollar.
        Usd => "USD",
        /// Euro.
        Eur => "EUR",
        /// Russian Ruble.
        Rub => "RUB",
        /// Belarusian Ruble.
        Byn => "BYN",
        /// Ukrainian Hryvnia.
        Uah => "UAH",
        /// British Pound Sterling.
        Gbp => "GBP",
        /// Chinese Yuan.
        Cny => "CNY",
        /// Kazakhstani Tenge.
        Kzt => "KZT",
        /// Uzbekistani Som.
        Uzs => "UZS",
        /// Georgian Lari.
        Gel => "GEL",
        /// Turkish Lira.
        Try => "TRY",
        /// Armenian Dram.
        Amd => "AMD",
        /// Thai Baht.
        Thb => "THB",
        /// Indian Rupee.
        Inr => "INR",
        /// Brazilian Real.
        Brl => "BRL",
        /// Indonesian Rupiah.
        Idr => "IDR",
        /// Azerbaijani Manat.
        Azn => "AZN",
        /// UAE Dirham.
        Aed => "AED",
        /// Polish Zloty.
        Pln => "PLN",
        /// Israeli New Shekel.
        Ils => "ILS",
    }
}

/// Offsets of zero are the gateway default and are left off the wire.
#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

mod check;
mod invoice;
mod market;
mod stats;
mod transfer;
mod update;

pub use check::*;
pub use invoice::*;
pub use market::*;
pub use stats::*;
pub use transfer::*;
pub use update::*;
