//! Client-side request validation.
//!
//! Every request descriptor implements [`Validate`]. The client runs it
//! before building a request; a failing descriptor never reaches the
//! transport. All violated rules are reported together, in the order they
//! are checked.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;

use crate::error::{ValidationError, Violation};
use crate::proto::{
    AppStatsFilter, CheckFilter, CurrencyType, InvoiceFilter, NewCheck, NewInvoice, NewTransfer,
    TransferFilter,
};

/// Longest accepted invoice description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1024;
/// Longest accepted hidden message, in characters.
pub const MAX_HIDDEN_MESSAGE_CHARS: usize = 2048;
/// Longest accepted invoice payload, in characters.
pub const MAX_PAYLOAD_CHARS: usize = 4096;
/// Longest accepted transfer spend id, in characters.
pub const MAX_SPEND_ID_CHARS: usize = 64;
/// Longest accepted transfer comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 1024;
/// Accepted invoice lifetimes, in seconds (up to 31 days).
pub const EXPIRES_IN_RANGE: RangeInclusive<u32> = 1..=2_678_400;
/// Accepted page sizes for list queries.
pub const COUNT_RANGE: RangeInclusive<u32> = 1..=1000;

/// A request that can be checked before it is sent.
pub trait Validate {
    /// Checks every rule and reports all violations at once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing each violated rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Accumulates violations while a descriptor is checked.
#[derive(Debug, Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(Violation::new(field, message));
        }
        self
    }

    fn positive(&mut self, field: &'static str, amount: Decimal) -> &mut Self {
        self.check(amount > Decimal::ZERO, field, "must be greater than 0")
    }

    fn max_chars(&mut self, field: &'static str, value: Option<&str>, max: usize) -> &mut Self {
        let len = value.map_or(0, |v| v.chars().count());
        self.check(
            len <= max,
            field,
            &format!("cannot exceed {max} characters"),
        )
    }

    fn page(&mut self, offset: i64, count: Option<u32>) -> &mut Self {
        self.check(offset >= 0, "offset", "cannot be less than 0");
        self.check(
            count.is_none_or(|c| COUNT_RANGE.contains(&c)),
            "count",
            &format!(
                "must be within {}-{}",
                COUNT_RANGE.start(),
                COUNT_RANGE.end()
            ),
        )
    }

    fn finish(&mut self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(std::mem::take(&mut self.0)))
        }
    }
}

impl Validate for NewInvoice {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Violations::default();
        match self.currency_type {
            CurrencyType::Crypto => {
                v.check(self.asset.is_some(), "asset", "is required for crypto invoices");
            }
            CurrencyType::Fiat => {
                v.check(self.fiat.is_some(), "fiat", "is required for fiat invoices")
                    .check(
                        !self.accepted_assets.is_empty(),
                        "accepted_assets",
                        "cannot be empty for fiat invoices",
                    );
            }
        }
        v.positive("amount", self.amount)
            .check(
                self.paid_btn_name.is_none() || self.paid_btn_url.is_some(),
                "paid_btn_url",
                "is required when paid_btn_name is set",
            )
            .max_chars(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_CHARS,
            )
            .max_chars(
                "hidden_message",
                self.hidden_message.as_deref(),
                MAX_HIDDEN_MESSAGE_CHARS,
            )
            .max_chars("payload", self.payload.as_deref(), MAX_PAYLOAD_CHARS)
            .check(
                self.expires_in
                    .is_none_or(|secs| EXPIRES_IN_RANGE.contains(&secs)),
                "expires_in",
                "must be within 1-2678400 seconds",
            )
            .finish()
    }
}

impl Validate for InvoiceFilter {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::default().page(self.offset, self.count).finish()
    }
}

impl Validate for NewCheck {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::default()
            .positive("amount", self.amount)
            .check(
                self.pin_to_user_id.is_none() || self.pin_to_username.is_none(),
                "pin_to_username",
                "cannot be combined with pin_to_user_id",
            )
            .finish()
    }
}

impl Validate for CheckFilter {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::default().page(self.offset, self.count).finish()
    }
}

impl Validate for NewTransfer {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::default()
            .check(!self.spend_id.is_empty(), "spend_id", "cannot be empty")
            .max_chars("spend_id", Some(&self.spend_id), MAX_SPEND_ID_CHARS)
            .positive("amount", self.amount)
            .max_chars("comment", self.comment.as_deref(), MAX_COMMENT_CHARS)
            .finish()
    }
}

impl Validate for TransferFilter {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::default()
            .max_chars("spend_id", self.spend_id.as_deref(), MAX_SPEND_ID_CHARS)
            .page(self.offset, self.count)
            .finish()
    }
}

impl Validate for AppStatsFilter {
    fn validate(&self) -> Result<(), ValidationError> {
        let ordered = match (self.start_at, self.end_at) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        };
        Violations::default()
            .check(ordered, "start_at", "cannot be later than end_at")
            .finish()
    }
}
