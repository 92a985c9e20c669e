//! Command-line client for the Crypto Pay API.
//!
//! # Usage
//!
//! ```bash
//! # Check the token and show the app
//! CRYPTO_PAY_TOKEN=1234:AA... cryptopay me
//!
//! # Create a fiat invoice payable in USDT or TON
//! cryptopay invoices create --fiat USD --accepted USDT,TON --amount 12.50
//!
//! # Verify a captured webhook delivery offline
//! cryptopay webhook verify --signature 5f0c... body.json
//!
//! # Configure logging level
//! RUST_LOG=debug cryptopay balance
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `cryptopay.toml`)
//! - `CRYPTO_PAY_TOKEN` - API token
//! - `CRYPTO_PAY_NETWORK` - `mainnet` or `testnet` (default: `testnet`)
//! - `CRYPTO_PAY_BASE_URL` - Custom endpoint
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod cli;
mod config;

use std::io::Read;
use std::path::Path;

use clap::Parser;
use cryptopay::encoding::split_list;
use cryptopay::proto::{
    AppStatsFilter, CheckFilter, InvoiceFilter, NewCheck, NewInvoice, NewTransfer,
    TransferFilter, find_rate,
};
use cryptopay::{Error, WebhookKey};
use cryptopay_http::{CryptoPayClient, ReqwestTransport};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{CheckCommand, Cli, Command, InvoiceCommand, TransferCommand, WebhookCommand};
use crate::config::CliConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("cryptopay failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::load()?;
    config.apply_overrides(cli.overrides());
    let client_config = config.client_config()?;
    tracing::debug!(
        endpoint = %client_config.base_url(),
        timeout = ?config.timeout(),
        "Loaded configuration"
    );

    let mut transport = ReqwestTransport::new();
    if let Some(timeout) = config.timeout() {
        transport = transport.with_timeout(timeout);
    }
    let client = CryptoPayClient::with_transport(client_config, transport);

    match cli.command {
        Command::Me => print(&client.get_me().await?),
        Command::Balance => print(&client.get_balance().await?),
        Command::Rates { source, target } => {
            let rates = client.get_exchange_rates().await?;
            match (source, target) {
                (Some(source), Some(target)) => {
                    let rate = find_rate(&rates, &source, &target)
                        .ok_or_else(|| format!("no valid rate from {source} to {target}"))?;
                    print(rate)
                }
                _ => print(&rates),
            }
        }
        Command::Stats { start, end } => {
            let filter = AppStatsFilter {
                start_at: start,
                end_at: end,
            };
            print(&client.get_stats(&filter).await?)
        }
        Command::Invoices { action } => invoices(&client, action).await,
        Command::Checks { action } => checks(&client, action).await,
        Command::Transfers { action } => transfers(&client, action).await,
        Command::Webhook { action } => webhook(client.webhook_key(), action),
    }
}

async fn invoices(
    client: &CryptoPayClient,
    action: InvoiceCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        InvoiceCommand::Create {
            amount,
            asset,
            fiat,
            accepted,
            description,
            hidden_message,
            paid_btn_name,
            paid_btn_url,
            payload,
            allow_comments,
            allow_anonymous,
            expires_in,
        } => {
            let mut invoice = match (asset, fiat) {
                (_, Some(fiat)) => {
                    let accepted = split_list(accepted.as_deref().unwrap_or_default())?;
                    NewInvoice::fiat(fiat, amount, accepted)
                }
                (Some(asset), None) => NewInvoice::crypto(asset, amount),
                (None, None) => return Err("either --asset or --fiat is required".into()),
            };
            invoice.description = description;
            invoice.hidden_message = hidden_message;
            invoice.paid_btn_name = paid_btn_name;
            invoice.paid_btn_url = paid_btn_url;
            invoice.payload = payload;
            invoice.allow_comments = allow_comments;
            invoice.allow_anonymous = allow_anonymous;
            invoice.expires_in = expires_in;

            let created = client.create_invoice(&invoice).await?;
            tracing::info!(invoice_id = created.id, url = %created.bot_invoice_url, "Invoice created");
            print(&created)
        }
        InvoiceCommand::List {
            ids,
            asset,
            fiat,
            status,
            page,
        } => {
            let filter = InvoiceFilter {
                asset,
                fiat,
                invoice_ids: parse_ids(ids.as_deref())?,
                status,
                offset: page.offset,
                count: page.count,
            };
            print(&client.get_invoices(&filter).await?)
        }
        InvoiceCommand::Delete { id } => print(&client.delete_invoice(id).await?),
    }
}

async fn checks(
    client: &CryptoPayClient,
    action: CheckCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CheckCommand::Create {
            asset,
            amount,
            pin_to_user_id,
            pin_to_username,
        } => {
            let check = NewCheck {
                asset,
                amount,
                pin_to_user_id,
                pin_to_username,
            };
            print(&client.create_check(&check).await?)
        }
        CheckCommand::List {
            ids,
            asset,
            status,
            page,
        } => {
            let filter = CheckFilter {
                asset,
                check_ids: parse_ids(ids.as_deref())?,
                status,
                offset: page.offset,
                count: page.count,
            };
            print(&client.get_checks(&filter).await?)
        }
        CheckCommand::Delete { id } => print(&client.delete_check(id).await?),
    }
}

async fn transfers(
    client: &CryptoPayClient,
    action: TransferCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TransferCommand::Send {
            user_id,
            asset,
            amount,
            spend_id,
            comment,
            silent,
        } => {
            let mut transfer = NewTransfer::new(user_id, asset, amount, spend_id);
            transfer.comment = comment;
            if silent {
                transfer = transfer.silent();
            }
            let sent = client.transfer(&transfer).await?;
            tracing::info!(transfer_id = sent.id, "Transfer completed");
            print(&sent)
        }
        TransferCommand::List {
            ids,
            asset,
            spend_id,
            page,
        } => {
            let filter = TransferFilter {
                asset,
                transfer_ids: parse_ids(ids.as_deref())?,
                spend_id,
                offset: page.offset,
                count: page.count,
            };
            print(&client.get_transfers(&filter).await?)
        }
    }
}

fn webhook(key: &WebhookKey, action: WebhookCommand) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WebhookCommand::Sign { body } => {
            let body = read_body(&body)?;
            println!("{}", key.sign(&body));
            Ok(())
        }
        WebhookCommand::Verify { signature, body } => {
            let body = read_body(&body)?;
            let update = key.parse_update(Some(&signature), &body)?;
            print(&update)
        }
    }
}

fn parse_ids(ids: Option<&str>) -> Result<Vec<u64>, std::num::ParseIntError> {
    ids.map_or_else(|| Ok(Vec::new()), split_list)
}

fn read_body(path: &Path) -> std::io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut body = Vec::new();
        std::io::stdin().read_to_end(&mut body)?;
        Ok(body)
    } else {
        std::fs::read(path)
    }
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value).map_err(Error::Encode)?;
    println!("{json}");
    Ok(())
}
