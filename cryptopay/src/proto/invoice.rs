//! Invoices: payment requests the app issues to users.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::{CryptoAsset, CurrencyType, FiatCurrency};
use crate::encoding::join_list;

wire_enum! {
    /// Lifecycle state of an invoice.
    InvoiceStatus, "invoice status" {
        /// Waiting for payment.
        Active => "active",
        /// Paid by the user.
        Paid => "paid",
        /// Expired before payment.
        Expired => "expired",
    }
}

wire_enum! {
    /// Button shown to the user after an invoice is paid.
    PaidButton, "paid button" {
        /// "View Item".
        ViewItem => "viewItem",
        /// "View Channel".
        OpenChannel => "openChannel",
        /// "Open Bot".
        OpenBot => "openBot",
        /// "Return".
        Callback => "callback",
    }
}

/// An invoice as returned by the gateway.
///
/// Asset and currency codes are kept as strings so that a code this crate
/// has no variant for still decodes. The typed accessors narrow them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice id.
    #[serde(rename = "invoice_id")]
    pub id: u64,

    /// Invoice hash.
    pub hash: String,

    /// Whether the invoice is priced in crypto or fiat.
    pub currency_type: CurrencyType,

    /// Asset code to pay with. Present for crypto invoices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,

    /// Fiat currency code. Present for fiat invoices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiat: Option<String>,

    /// Asset codes that can pay a fiat invoice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_assets: Vec<String>,

    /// Invoice amount, in `asset` or `fiat` units.
    pub amount: Decimal,

    /// Asset code actually used for payment (paid fiat invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_asset: Option<String>,

    /// Amount actually paid in `paid_asset` (paid fiat invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,

    /// Rate of `paid_asset` in the invoice fiat (paid fiat invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_fiat_rate: Option<Decimal>,

    /// Asset code the fee was charged in (paid invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_asset: Option<String>,

    /// Fee charged (paid invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<Decimal>,

    /// URL to pay the invoice in the bot.
    #[serde(default)]
    pub bot_invoice_url: String,

    /// URL to pay the invoice in the Mini App.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_app_invoice_url: Option<String>,

    /// URL to pay the invoice in the Web App.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app_invoice_url: Option<String>,

    /// Description shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status.
    pub status: InvoiceStatus,

    /// Creation date.
    pub created_at: DateTime<Utc>,

    /// USD rate of the payment asset at payment time (paid invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_usd_rate: Option<Decimal>,

    /// Whether the user may leave a comment.
    #[serde(default)]
    pub allow_comments: bool,

    /// Whether the user may pay anonymously.
    #[serde(default)]
    pub allow_anonymous: bool,

    /// Expiration date, if one was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Payment date (paid invoices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,

    /// Whether the invoice was paid anonymously.
    #[serde(default)]
    pub paid_anonymously: bool,

    /// User comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Message shown after payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_message: Option<String>,

    /// App payload attached at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Button shown after payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_btn_name: Option<PaidButton>,

    /// URL behind the paid button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_btn_url: Option<String>,
}

impl Invoice {
    /// Returns `true` once the invoice has been paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Returns the invoice asset, if it is a known crypto asset.
    #[must_use]
    pub fn crypto_asset(&self) -> Option<CryptoAsset> {
        self.asset.as_deref()?.parse().ok()
    }

    /// Returns the invoice fiat currency, if it is a known one.
    #[must_use]
    pub fn fiat_currency(&self) -> Option<FiatCurrency> {
        self.fiat.as_deref()?.parse().ok()
    }

    /// Returns the accepted assets this crate knows, in wire order.
    pub fn known_accepted_assets(&self) -> impl Iterator<Item = CryptoAsset> + '_ {
        self.accepted_assets.iter().filter_map(|code| code.parse().ok())
    }

    /// Returns the asset used for payment, if it is a known crypto asset.
    #[must_use]
    pub fn paid_crypto_asset(&self) -> Option<CryptoAsset> {
        self.paid_asset.as_deref()?.parse().ok()
    }

    /// Returns the fee asset, if it is a known crypto asset.
    #[must_use]
    pub fn fee_crypto_asset(&self) -> Option<CryptoAsset> {
        self.fee_asset.as_deref()?.parse().ok()
    }
}

/// Parameters for `createInvoice`.
///
/// Start from [`NewInvoice::crypto`] or [`NewInvoice::fiat`]; the currency
/// type decides which of `asset` or `fiat` + `accepted_assets` is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    /// Crypto or fiat pricing.
    pub currency_type: CurrencyType,
    /// Asset to pay with. Required for crypto invoices.
    pub asset: Option<CryptoAsset>,
    /// Fiat currency. Required for fiat invoices.
    pub fiat: Option<FiatCurrency>,
    /// Assets accepted for a fiat invoice. Required (non-empty) for fiat invoices.
    pub accepted_assets: Vec<CryptoAsset>,
    /// Amount to pay. Must be positive.
    pub amount: Decimal,
    /// Description shown to the user. 1024 characters max.
    pub description: Option<String>,
    /// Message shown after payment. 2048 characters max.
    pub hidden_message: Option<String>,
    /// Button shown after payment. Requires `paid_btn_url`.
    pub paid_btn_name: Option<PaidButton>,
    /// URL behind the paid button.
    pub paid_btn_url: Option<String>,
    /// Opaque app data attached to the invoice. 4096 characters max.
    pub payload: Option<String>,
    /// Whether the user may leave a comment. Gateway default when unset.
    pub allow_comments: Option<bool>,
    /// Whether the user may pay anonymously. Gateway default when unset.
    pub allow_anonymous: Option<bool>,
    /// Seconds until expiry, `1..=2678400`.
    pub expires_in: Option<u32>,
}

impl NewInvoice {
    /// An invoice priced in a crypto asset.
    #[must_use]
    pub const fn crypto(asset: CryptoAsset, amount: Decimal) -> Self {
        Self {
            currency_type: CurrencyType::Crypto,
            asset: Some(asset),
            fiat: None,
            accepted_assets: Vec::new(),
            amount,
            description: None,
            hidden_message: None,
            paid_btn_name: None,
            paid_btn_url: None,
            payload: None,
            allow_comments: None,
            allow_anonymous: None,
            expires_in: None,
        }
    }

    /// An invoice priced in fiat and payable in any of `accepted_assets`.
    #[must_use]
    pub const fn fiat(
        fiat: FiatCurrency,
        amount: Decimal,
        accepted_assets: Vec<CryptoAsset>,
    ) -> Self {
        Self {
            currency_type: CurrencyType::Fiat,
            asset: None,
            fiat: Some(fiat),
            accepted_assets,
            amount,
            description: None,
            hidden_message: None,
            paid_btn_name: None,
            paid_btn_url: None,
            payload: None,
            allow_comments: None,
            allow_anonymous: None,
            expires_in: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the message shown after payment.
    #[must_use]
    pub fn with_hidden_message(mut self, message: impl Into<String>) -> Self {
        self.hidden_message = Some(message.into());
        self
    }

    /// Sets the button shown after payment.
    #[must_use]
    pub fn with_paid_button(mut self, name: PaidButton, url: impl Into<String>) -> Self {
        self.paid_btn_name = Some(name);
        self.paid_btn_url = Some(url.into());
        self
    }

    /// Attaches app data.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the expiry in seconds.
    #[must_use]
    pub const fn with_expires_in(mut self, seconds: u32) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Allows or forbids user comments.
    #[must_use]
    pub const fn with_allow_comments(mut self, allow: bool) -> Self {
        self.allow_comments = Some(allow);
        self
    }

    /// Allows or forbids anonymous payment.
    #[must_use]
    pub const fn with_allow_anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = Some(allow);
        self
    }

    fn to_wire(&self) -> NewInvoiceWire<'_> {
        NewInvoiceWire {
            currency_type: self.currency_type,
            asset: self.asset,
            fiat: self.fiat,
            accepted_assets: join_list(&self.accepted_assets),
            amount: self.amount,
            description: self.description.as_deref(),
            hidden_message: self.hidden_message.as_deref(),
            paid_btn_name: self.paid_btn_name,
            paid_btn_url: self.paid_btn_url.as_deref(),
            payload: self.payload.as_deref(),
            allow_comments: self.allow_comments,
            allow_anonymous: self.allow_anonymous,
            expires_in: self.expires_in,
        }
    }
}

impl Serialize for NewInvoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

#[derive(Serialize)]
struct NewInvoiceWire<'a> {
    currency_type: CurrencyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<CryptoAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fiat: Option<FiatCurrency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted_assets: Option<String>,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hidden_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paid_btn_name: Option<PaidButton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paid_btn_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_anonymous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u32>,
}

/// Parameters for `getInvoices`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Only invoices in this asset.
    pub asset: Option<CryptoAsset>,
    /// Only invoices in this fiat currency.
    pub fiat: Option<FiatCurrency>,
    /// Only these invoice ids.
    pub invoice_ids: Vec<u64>,
    /// Only invoices in this status.
    pub status: Option<InvoiceStatus>,
    /// Number of invoices to skip. Must not be negative.
    pub offset: i64,
    /// Number of invoices to return, `1..=1000`. Gateway default is 100.
    pub count: Option<u32>,
}

impl InvoiceFilter {
    /// Filter matching exactly the given ids.
    #[must_use]
    pub fn by_ids(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            invoice_ids: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    fn to_wire(&self) -> InvoiceFilterWire {
        InvoiceFilterWire {
            asset: self.asset,
            fiat: self.fiat,
            invoice_ids: join_list(&self.invoice_ids),
            status: self.status,
            offset: self.offset,
            count: self.count,
        }
    }
}

impl Serialize for InvoiceFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

#[derive(Serialize)]
struct InvoiceFilterWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<CryptoAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fiat: Option<FiatCurrency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<InvoiceStatus>,
    #[serde(skip_serializing_if = "super::is_zero")]
    offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}
