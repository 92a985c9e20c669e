//! Header names and endpoint paths of the Crypto Pay API.

/// Request header carrying the API token (client → gateway).
///
/// Documented as `Crypto-Pay-API-Token`; header names are case-insensitive
/// and `http` stores them lowercase.
pub const API_TOKEN_HEADER: &str = "crypto-pay-api-token";

/// Webhook header carrying the body signature (gateway → app).
pub const SIGNATURE_HEADER: &str = "crypto-pay-api-signature";

/// `getMe`: basic information about the app.
pub const GET_ME: &str = "getMe";
/// `createInvoice`.
pub const CREATE_INVOICE: &str = "createInvoice";
/// `deleteInvoice`.
pub const DELETE_INVOICE: &str = "deleteInvoice";
/// `getInvoices`.
pub const GET_INVOICES: &str = "getInvoices";
/// `createCheck`.
pub const CREATE_CHECK: &str = "createCheck";
/// `deleteCheck`.
pub const DELETE_CHECK: &str = "deleteCheck";
/// `getChecks`.
pub const GET_CHECKS: &str = "getChecks";
/// `transfer`.
pub const TRANSFER: &str = "transfer";
/// `getTransfers`.
pub const GET_TRANSFERS: &str = "getTransfers";
/// `getBalance`.
pub const GET_BALANCE: &str = "getBalance";
/// `getExchangeRates`.
pub const GET_EXCHANGE_RATES: &str = "getExchangeRates";
/// `getStats`.
pub const GET_STATS: &str = "getStats";
