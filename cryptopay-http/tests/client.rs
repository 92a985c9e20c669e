//! End-to-end client tests against a mock gateway.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use cryptopay::proto::{
    AppStatsFilter, CheckFilter, CryptoAsset, FiatCurrency, InvoiceFilter, InvoiceStatus,
    NewCheck, NewInvoice, NewTransfer, TransferFilter,
};
use cryptopay::{BoxError, ClientConfig, Error};
use cryptopay_http::{BoxFuture, CryptoPayClient, HttpRequest, Transport};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "1234:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw";

fn client_for(server: &MockServer) -> CryptoPayClient {
    let config = ClientConfig::with_base_url(TOKEN, &format!("{}/api", server.uri())).unwrap();
    CryptoPayClient::new(config)
}

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
}

fn invoice_json(id: u64, status: &str) -> Value {
    json!({
        "invoice_id": id,
        "hash": format!("IV{id}"),
        "currency_type": "crypto",
        "asset": "TON",
        "amount": "1.5",
        "bot_invoice_url": format!("https://t.me/CryptoTestnetBot?start=IV{id}"),
        "status": status,
        "created_at": "2024-03-01T10:00:00.000Z"
    })
}

/// Transport double that records every request and answers with a fixed body.
#[derive(Debug, Default)]
struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    response: Bytes,
}

impl RecordingTransport {
    fn answering(body: &'static str) -> Self {
        Self {
            requests: Mutex::default(),
            response: Bytes::from_static(body.as_bytes()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<Bytes, BoxError>> {
        self.requests.lock().unwrap().push(request);
        let response = self.response.clone();
        Box::pin(async move { Ok(response) })
    }
}

fn recording_client(transport: &Arc<RecordingTransport>) -> CryptoPayClient<RecordingTransport> {
    let config = ClientConfig::with_base_url(TOKEN, "http://gateway.invalid/api").unwrap();
    CryptoPayClient::with_shared_transport(config, Arc::clone(transport))
}

#[tokio::test]
async fn create_invoice_sends_token_and_wire_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createInvoice"))
        .and(header("Crypto-Pay-API-Token", TOKEN))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "currency_type": "fiat",
            "fiat": "USD",
            "accepted_assets": "USDT,TON",
            "amount": "10",
            "payload": "order-1"
        })))
        .respond_with(ok(invoice_json(42, "active")))
        .expect(1)
        .mount(&server)
        .await;

    let invoice = NewInvoice::fiat(
        FiatCurrency::Usd,
        Decimal::new(10, 0),
        vec![CryptoAsset::Usdt, CryptoAsset::Ton],
    )
    .with_payload("order-1");
    let created = client_for(&server).create_invoice(&invoice).await.unwrap();

    assert_eq!(created.id, 42);
    assert_eq!(created.status, InvoiceStatus::Active);
}

#[tokio::test]
async fn get_invoices_joins_ids_and_unwraps_carrier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/getInvoices"))
        .and(body_json(json!({"invoice_ids": "3,1,2"})))
        .respond_with(ok(json!({"items": [
            invoice_json(3, "paid"),
            invoice_json(1, "active"),
            invoice_json(2, "expired")
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let invoices = client_for(&server)
        .get_invoices(&InvoiceFilter::by_ids([3, 1, 2]))
        .await
        .unwrap();

    let ids: Vec<u64> = invoices.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert!(invoices[0].is_paid());
}

#[tokio::test]
async fn api_error_payload_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transfer"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error": {"code": 400, "name": "INSUFFICIENT_FUNDS"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transfer = NewTransfer::new(7, CryptoAsset::Usdt, Decimal::ONE, "payout-7");
    let err = client_for(&server).transfer(&transfer).await.unwrap_err();

    let payload = err.api_payload().expect("api error");
    assert_eq!(payload.as_str(), r#"{"code":400,"name":"INSUFFICIENT_FUNDS"}"#);
}

#[tokio::test]
async fn delete_calls_return_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deleteInvoice"))
        .and(body_json(json!({"invoice_id": 42})))
        .respond_with(ok(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/deleteCheck"))
        .and(body_json(json!({"check_id": 9})))
        .respond_with(ok(json!(true)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.delete_invoice(42).await.unwrap());
    assert!(client.delete_check(9).await.unwrap());
}

#[tokio::test]
async fn parameterless_reads_use_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getMe"))
        .and(header("Crypto-Pay-API-Token", TOKEN))
        .respond_with(ok(json!({"app_id": 7, "name": "shop"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/getBalance"))
        .respond_with(ok(json!([
            {"currency_code": "TON", "available": "2.5", "onhold": "0"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/getExchangeRates"))
        .respond_with(ok(json!([
            {"is_valid": true, "is_crypto": true, "is_fiat": false, "source": "TON", "target": "USD", "rate": "5.1"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let me = client.get_me().await.unwrap();
    assert_eq!(me.parse::<Value>().unwrap()["app_id"], 7);
    let balances = client.get_balance().await.unwrap();
    assert_eq!(balances[0].asset(), Some(CryptoAsset::Ton));
    let rates = client.get_exchange_rates().await.unwrap();
    assert_eq!(rates[0].rate, Decimal::new(51, 1));
}

#[tokio::test]
async fn checks_and_transfers_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createCheck"))
        .and(body_json(json!({"asset": "USDT", "amount": "2", "pin_to_username": "alice"})))
        .respond_with(ok(json!({
            "check_id": 5,
            "hash": "CQ5",
            "asset": "USDT",
            "amount": "2",
            "bot_check_url": "https://t.me/CryptoTestnetBot?start=CQ5",
            "status": "active",
            "created_at": "2024-05-02T08:00:00.000Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/getChecks"))
        .and(body_json(json!({"check_ids": "5"})))
        .respond_with(ok(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/getTransfers"))
        .and(body_json(json!({"spend_id": "payout-7", "count": 10})))
        .respond_with(ok(json!({"items": [{
            "transfer_id": 70,
            "spend_id": "payout-7",
            "user_id": 7,
            "asset": "USDT",
            "amount": "1",
            "status": "completed",
            "completed_at": "2024-06-01T12:00:00Z"
        }]})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let check = client
        .create_check(&NewCheck::new(CryptoAsset::Usdt, Decimal::TWO).pinned_to_username("alice"))
        .await
        .unwrap();
    assert_eq!(check.id, 5);

    let checks = client
        .get_checks(&CheckFilter {
            check_ids: vec![5],
            ..CheckFilter::default()
        })
        .await
        .unwrap();
    assert!(checks.is_empty());

    let transfers = client
        .get_transfers(&TransferFilter {
            spend_id: Some("payout-7".into()),
            count: Some(10),
            ..TransferFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(transfers[0].id, 70);
}

#[tokio::test]
async fn stats_window_is_sent_as_rfc3339() {
    use chrono::{TimeZone, Utc};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/getStats"))
        .and(body_json(json!({
            "start_at": "2024-01-01T00:00:00Z",
            "end_at": "2024-01-02T00:00:00Z"
        })))
        .respond_with(ok(json!({
            "volume": "100",
            "conversion": "0.5",
            "unique_users_count": 4,
            "created_invoice_count": 10,
            "paid_invoice_count": 5,
            "start_at": "2024-01-01T00:00:00.000Z",
            "end_at": "2024-01-02T00:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = AppStatsFilter::between(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    );
    let stats = client_for(&server).get_stats(&filter).await.unwrap();
    assert_eq!(stats.paid_invoice_count, 5);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getBalance"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_balance().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    let config = ClientConfig::with_base_url(TOKEN, "http://127.0.0.1:9/api").unwrap();
    let err = CryptoPayClient::new(config).get_me().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn invalid_filter_never_reaches_the_transport() {
    let transport = Arc::new(RecordingTransport::answering(r#"{"ok":true,"result":{"items":[]}}"#));
    let client = recording_client(&transport);

    let err = client
        .get_invoices(&InvoiceFilter {
            offset: -1,
            ..InvoiceFilter::default()
        })
        .await
        .unwrap_err();

    match err {
        Error::Validation(ref validation) => assert!(validation.concerns("offset")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn invalid_invoice_never_reaches_the_transport() {
    let transport = Arc::new(RecordingTransport::answering(r#"{"ok":true,"result":true}"#));
    let client = recording_client(&transport);

    let mut invoice = NewInvoice::crypto(CryptoAsset::Ton, Decimal::ONE);
    invoice.asset = None;
    let err = client.create_invoice(&invoice).await.unwrap_err();

    assert!(err.is_pre_network());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn each_operation_sends_exactly_once() {
    let transport = Arc::new(RecordingTransport::answering(r#"{"ok":true,"result":true}"#));
    let client = recording_client(&transport);

    assert!(client.delete_invoice(1).await.unwrap());
    assert_eq!(transport.calls(), 1);

    let requests = transport.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.url.as_str(), "http://gateway.invalid/api/deleteInvoice");
    assert!(request.headers["crypto-pay-api-token"].is_sensitive());
    assert!(!format!("{request:?}").contains("AAHdq"));
}

#[tokio::test]
async fn webhook_signed_by_client_key_is_accepted() {
    let transport = Arc::new(RecordingTransport::default());
    let client = recording_client(&transport);
    let body = r#"{"update_id":1,"update_type":"invoice_paid","request_date":"2024-03-01T10:05:13.000Z","payload":{"invoice_id":7,"hash":"IVx","currency_type":"crypto","asset":"TON","amount":"1","status":"paid","created_at":"2024-03-01T10:00:00.000Z"}}"#;
    let request = http::Request::post("/webhook")
        .header("crypto-pay-api-signature", client.webhook_key().sign(body.as_bytes()))
        .body(http_body_util::Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();

    let update = client.handle_update(request).await.unwrap();
    assert_eq!(update.id, 1);
    assert_eq!(update.payload.id, 7);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn lists_with_unlisted_assets_still_decode() {
    let server = MockServer::start().await;
    let mut invoice = invoice_json(4, "paid");
    invoice["paid_asset"] = json!("NOT");
    invoice["fee_asset"] = json!("NOT");
    Mock::given(method("POST"))
        .and(path("/api/getInvoices"))
        .respond_with(ok(json!({"items": [invoice]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/getTransfers"))
        .respond_with(ok(json!({"items": [{
            "transfer_id": 3,
            "user_id": 77,
            "asset": "NOT",
            "amount": "10",
            "status": "completed",
            "completed_at": "2024-06-01T12:00:00Z"
        }]})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let invoices = client.get_invoices(&InvoiceFilter::default()).await.unwrap();
    assert_eq!(invoices[0].fee_asset.as_deref(), Some("NOT"));
    assert_eq!(invoices[0].crypto_asset(), Some(CryptoAsset::Ton));

    let transfers = client.get_transfers(&TransferFilter::default()).await.unwrap();
    assert_eq!(transfers[0].asset, "NOT");
    assert_eq!(transfers[0].crypto_asset(), None);
}

#[tokio::test]
async fn null_get_me_result_is_returned_verbatim() {
    let transport = Arc::new(RecordingTransport::answering(r#"{"ok":true,"result":null}"#));
    let me = recording_client(&transport).get_me().await.unwrap();
    assert_eq!(me.as_str(), "null");
}

/// Shared buffer the log subscriber writes into.
#[cfg(feature = "telemetry")]
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

#[cfg(feature = "telemetry")]
impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "telemetry")]
#[tokio::test]
async fn failed_calls_are_returned_not_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = Arc::new(RecordingTransport::answering(
        r#"{"ok":false,"error":{"code":400,"name":"INSUFFICIENT_FUNDS"}}"#,
    ));
    let err = recording_client(&transport).get_balance().await.unwrap_err();
    assert!(err.api_payload().is_some());

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.is_empty(), "unexpected log output: {text}");
}
