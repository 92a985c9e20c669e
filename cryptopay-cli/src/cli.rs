//! Command-line arguments.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use cryptopay::Network;
use cryptopay::proto::{
    CheckStatus, CryptoAsset, FiatCurrency, InvoiceStatus, PaidButton,
};
use rust_decimal::Decimal;

use crate::config::Overrides;

/// Crypto Pay command-line client
#[derive(Debug, Parser)]
#[command(name = "cryptopay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// API token (overrides config file and `CRYPTO_PAY_TOKEN`)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Gateway deployment: mainnet or testnet
    #[arg(long, global = true)]
    pub network: Option<Network>,

    /// Custom API endpoint, e.g. a local mock
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Flags that override configured values.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            network: self.network,
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show basic information about the app
    Me,
    /// Show the app balance
    Balance,
    /// Show exchange rates
    Rates {
        /// Only the rate from this currency
        #[arg(long, requires = "target")]
        source: Option<String>,
        /// Only the rate into this currency
        #[arg(long, requires = "source")]
        target: Option<String>,
    },
    /// Show app statistics
    Stats {
        /// Window start (RFC 3339)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Window end (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Manage invoices
    Invoices {
        #[command(subcommand)]
        action: InvoiceCommand,
    },
    /// Manage checks
    Checks {
        #[command(subcommand)]
        action: CheckCommand,
    },
    /// Send and list transfers
    Transfers {
        #[command(subcommand)]
        action: TransferCommand,
    },
    /// Sign or verify webhook bodies offline
    Webhook {
        #[command(subcommand)]
        action: WebhookCommand,
    },
}

/// Paging flags shared by list commands.
#[derive(Debug, Args)]
pub struct Page {
    /// Number of records to skip
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,
    /// Number of records to return (1-1000)
    #[arg(long)]
    pub count: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Create an invoice
    Create {
        /// Amount to charge
        #[arg(long)]
        amount: Decimal,
        /// Crypto asset to charge in
        #[arg(long, conflicts_with = "fiat", required_unless_present = "fiat")]
        asset: Option<CryptoAsset>,
        /// Fiat currency to charge in
        #[arg(long, requires = "accepted")]
        fiat: Option<FiatCurrency>,
        /// Comma-separated assets accepted for a fiat invoice
        #[arg(long)]
        accepted: Option<String>,
        /// Description shown to the user
        #[arg(long)]
        description: Option<String>,
        /// Message shown after payment
        #[arg(long)]
        hidden_message: Option<String>,
        /// Button shown after payment
        #[arg(long, requires = "paid_btn_url")]
        paid_btn_name: Option<PaidButton>,
        /// URL behind the paid button
        #[arg(long)]
        paid_btn_url: Option<String>,
        /// App data attached to the invoice
        #[arg(long)]
        payload: Option<String>,
        /// Allow the user to add a comment
        #[arg(long)]
        allow_comments: Option<bool>,
        /// Allow anonymous payment
        #[arg(long)]
        allow_anonymous: Option<bool>,
        /// Seconds until the invoice expires
        #[arg(long)]
        expires_in: Option<u32>,
    },
    /// List invoices
    List {
        /// Comma-separated invoice ids
        #[arg(long)]
        ids: Option<String>,
        /// Only this asset
        #[arg(long)]
        asset: Option<CryptoAsset>,
        /// Only this fiat currency
        #[arg(long)]
        fiat: Option<FiatCurrency>,
        /// Only this status
        #[arg(long)]
        status: Option<InvoiceStatus>,
        #[command(flatten)]
        page: Page,
    },
    /// Delete an invoice
    Delete {
        /// Invoice id
        id: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum CheckCommand {
    /// Create a check
    Create {
        /// Asset to pay out
        #[arg(long)]
        asset: CryptoAsset,
        /// Amount to pay out
        #[arg(long)]
        amount: Decimal,
        /// Only this Telegram user id may activate it
        #[arg(long, conflicts_with = "pin_to_username")]
        pin_to_user_id: Option<u64>,
        /// Only this Telegram username may activate it
        #[arg(long)]
        pin_to_username: Option<String>,
    },
    /// List checks
    List {
        /// Comma-separated check ids
        #[arg(long)]
        ids: Option<String>,
        /// Only this asset
        #[arg(long)]
        asset: Option<CryptoAsset>,
        /// Only this status
        #[arg(long)]
        status: Option<CheckStatus>,
        #[command(flatten)]
        page: Page,
    },
    /// Delete a check
    Delete {
        /// Check id
        id: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    /// Send coins to a Telegram user
    Send {
        /// Recipient's Telegram user id
        #[arg(long)]
        user_id: u64,
        /// Asset to send
        #[arg(long)]
        asset: CryptoAsset,
        /// Amount to send
        #[arg(long)]
        amount: Decimal,
        /// Idempotency key
        #[arg(long)]
        spend_id: String,
        /// Comment shown to the recipient
        #[arg(long)]
        comment: Option<String>,
        /// Do not notify the recipient
        #[arg(long)]
        silent: bool,
    },
    /// List transfers
    List {
        /// Comma-separated transfer ids
        #[arg(long)]
        ids: Option<String>,
        /// Only this asset
        #[arg(long)]
        asset: Option<CryptoAsset>,
        /// Only this spend id
        #[arg(long)]
        spend_id: Option<String>,
        #[command(flatten)]
        page: Page,
    },
}

#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Print the signature the gateway would send for a body
    Sign {
        /// File holding the body, `-` for stdin
        body: PathBuf,
    },
    /// Verify a signed body and print the parsed update
    Verify {
        /// Value of the `crypto-pay-api-signature` header
        #[arg(long)]
        signature: String,
        /// File holding the body, `-` for stdin
        body: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_invoice_creation() {
        let cli = Cli::try_parse_from([
            "cryptopay",
            "--network",
            "mainnet",
            "invoices",
            "create",
            "--fiat",
            "USD",
            "--accepted",
            "USDT,TON",
            "--amount",
            "12.50",
        ])
        .unwrap();
        assert_eq!(cli.network, Some(Network::Mainnet));
        let Command::Invoices {
            action: InvoiceCommand::Create { fiat, amount, .. },
        } = cli.command
        else {
            panic!("expected invoices create");
        };
        assert_eq!(fiat, Some(FiatCurrency::Usd));
        assert_eq!(amount, Decimal::new(1250, 2));
    }

    #[test]
    fn negative_offset_reaches_validation() {
        let cli =
            Cli::try_parse_from(["cryptopay", "transfers", "list", "--offset", "-1"]).unwrap();
        let Command::Transfers {
            action: TransferCommand::List { page, .. },
        } = cli.command
        else {
            panic!("expected transfers list");
        };
        assert_eq!(page.offset, -1);
    }
}
