//! ProductFetcher integration tests over a scripted in-memory transport

use async_trait::async_trait;
use rmpv::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use agrichain::fetch::ProductFetcher;
use agrichain::ledger::{ContractClient, LedgerTransport};
use agrichain::logging::CallLogger;
use agrichain::types::{AgriChainError, Result};

/// In-memory ledger serving canned per-method responses
struct ScriptedLedger {
    /// MessagePack result bytes per method
    responses: HashMap<String, Vec<u8>>,
    /// Node-level error message per method
    errors: HashMap<String, String>,
    /// Methods seen, in call order
    calls: Mutex<Vec<String>>,
}

impl ScriptedLedger {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn respond(mut self, method: &str, result: Vec<u8>) -> Self {
        self.responses.insert(method.to_string(), result);
        self
    }

    fn fail(mut self, method: &str, message: &str) -> Self {
        self.errors.insert(method.to_string(), message.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerTransport for ScriptedLedger {
    async fn request(&self, data: Vec<u8>, _timeout_ms: u64) -> Result<Vec<u8>> {
        let method = method_of(&data);
        self.calls.lock().unwrap().push(method.clone());

        if let Some(message) = self.errors.get(&method) {
            return Ok(error_envelope(message));
        }
        match self.responses.get(&method) {
            Some(result) => Ok(ok_envelope(result)),
            None => Err(AgriChainError::Ledger(format!("no script for {method}"))),
        }
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

/// Extract the contract method name from a request envelope
fn method_of(envelope: &[u8]) -> String {
    let mut cursor = Cursor::new(envelope);
    let outer = rmpv::decode::read_value(&mut cursor).expect("request envelope");
    let outer_map = match outer {
        Value::Map(map) => map,
        other => panic!("expected envelope map, got {other:?}"),
    };
    let inner_bytes = match field(&outer_map, "data") {
        Some(Value::Binary(bytes)) => bytes.clone(),
        other => panic!("expected data bytes, got {other:?}"),
    };

    let mut cursor = Cursor::new(inner_bytes.as_slice());
    let inner = rmpv::decode::read_value(&mut cursor).expect("inner request");
    let inner_map = match inner {
        Value::Map(map) => map,
        other => panic!("expected inner map, got {other:?}"),
    };
    let call = match field(&inner_map, "value") {
        Some(Value::Map(map)) => map.clone(),
        other => panic!("expected call map, got {other:?}"),
    };
    match field(&call, "method") {
        Some(Value::String(s)) => s.as_str().unwrap().to_string(),
        other => panic!("expected method string, got {other:?}"),
    }
}

fn field<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::String(s) if s.as_str() == Some(key)))
        .map(|(_, v)| v)
}

/// Frame result bytes as a success response envelope
fn ok_envelope(result: &[u8]) -> Vec<u8> {
    let inner = Value::Map(vec![
        (Value::String("type".into()), Value::String("ok".into())),
        (Value::String("value".into()), Value::Binary(result.to_vec())),
    ]);
    let mut inner_buf = Vec::new();
    rmpv::encode::write_value(&mut inner_buf, &inner).unwrap();

    let envelope = Value::Map(vec![
        (Value::String("id".into()), Value::Integer(1.into())),
        (
            Value::String("type".into()),
            Value::String("response".into()),
        ),
        (Value::String("data".into()), Value::Binary(inner_buf)),
    ]);
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &envelope).unwrap();
    buf
}

/// Frame a node-level error envelope
fn error_envelope(message: &str) -> Vec<u8> {
    let err_data = Value::Map(vec![
        (
            Value::String("type".into()),
            Value::String("contract_error".into()),
        ),
        (
            Value::String("value".into()),
            Value::String(message.into()),
        ),
    ]);
    let envelope = Value::Map(vec![
        (Value::String("type".into()), Value::String("error".into())),
        (Value::String("value".into()), err_data),
    ]);
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &envelope).unwrap();
    buf
}

fn fetcher_over(ledger: Arc<ScriptedLedger>) -> ProductFetcher {
    let contract = ContractClient::with_transport(
        ledger,
        "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
        30_000,
        CallLogger::new("test-node".to_string()),
    );
    ProductFetcher::new(Arc::new(contract))
}

fn full_product_script() -> ScriptedLedger {
    ScriptedLedger::new()
        .respond(
            "get_product",
            rmp_serde::to_vec(&(
                "Organic Tomatoes",
                "Green Valley Farms, California",
                1_707_984_000u64,
            ))
            .unwrap(),
        )
        .respond(
            "get_quality_checks",
            rmp_serde::to_vec(&(
                vec!["AgriCert International", "Food Safety Alliance"],
                vec![95u8, 92],
                vec!["CERT-2024-001", "FSA-2024-123"],
            ))
            .unwrap(),
        )
        .respond(
            "get_history",
            rmp_serde::to_vec(&(
                vec!["Harvested", "Processed", "Shipped", "Received", "Stocked"],
                vec![
                    "John Smith",
                    "Fresh Pack Co.",
                    "Quick Ship Logistics",
                    "Metro Foods",
                    "Fresh Market",
                ],
                vec![
                    "Farmer",
                    "Manufacturer",
                    "Distributor",
                    "Wholesaler",
                    "Retailer",
                ],
                vec![
                    "Green Valley Farms",
                    "Processing Facility",
                    "Distribution Center",
                    "Wholesale Market",
                    "Store #123",
                ],
            ))
            .unwrap(),
        )
}

#[tokio::test]
async fn test_fetch_assembles_product_from_parallel_reads() {
    let ledger = Arc::new(full_product_script());
    let mut fetcher = fetcher_over(Arc::clone(&ledger));

    let product = fetcher.get_product("PROD123").await.expect("product");

    assert_eq!(product.id, "PROD123");
    assert_eq!(product.name, "Organic Tomatoes");
    assert_eq!(product.production_date, "2024-02-15");
    assert_eq!(product.quality_checks.len(), 2);
    assert_eq!(product.history.len(), 5);

    // Actor fields derived from history by exact role label
    assert_eq!(product.farmer, "John Smith");
    assert_eq!(product.manufacturer, "Fresh Pack Co.");
    assert_eq!(product.distributor, "Quick Ship Logistics");
    assert_eq!(product.wholesaler, "Metro Foods");
    assert_eq!(product.retailer, "Fresh Market");

    // Notes and details are never persisted remotely
    assert!(product.quality_checks.iter().all(|c| c.notes.is_empty()));
    assert!(product.history.iter().all(|h| h.details.is_empty()));

    assert!(!fetcher.is_loading());
    assert!(fetcher.error().is_none());

    // The three reads happen sequentially, in order
    assert_eq!(
        ledger.calls(),
        vec!["get_product", "get_quality_checks", "get_history"]
    );
}

#[tokio::test]
async fn test_absent_role_derives_to_empty_string() {
    let ledger = Arc::new(
        ScriptedLedger::new()
            .respond(
                "get_product",
                rmp_serde::to_vec(&("Raw Honey", "Hillside Apiary", 1_707_984_000u64)).unwrap(),
            )
            .respond(
                "get_quality_checks",
                rmp_serde::to_vec(&(Vec::<String>::new(), Vec::<u8>::new(), Vec::<String>::new()))
                    .unwrap(),
            )
            .respond(
                "get_history",
                rmp_serde::to_vec(&(
                    vec!["Harvested"],
                    vec!["Ann Lee"],
                    vec!["Farmer"],
                    vec!["Hillside Apiary"],
                ))
                .unwrap(),
            ),
    );
    let mut fetcher = fetcher_over(ledger);

    let product = fetcher.get_product("PROD777").await.expect("product");
    assert_eq!(product.farmer, "Ann Lee");
    assert_eq!(product.manufacturer, "");
    assert_eq!(product.distributor, "");
    assert_eq!(product.wholesaler, "");
    assert_eq!(product.retailer, "");
    assert!(product.quality_checks.is_empty());
}

#[tokio::test]
async fn test_read_failure_is_recorded_and_swallowed() {
    let ledger = Arc::new(ScriptedLedger::new().fail("get_product", "unknown product"));
    let mut fetcher = fetcher_over(ledger);

    let product = fetcher.get_product("PROD999").await;
    assert!(product.is_none());
    assert!(!fetcher.is_loading());
    assert!(fetcher.error().unwrap().contains("unknown product"));
}

#[tokio::test]
async fn test_unequal_parallel_sequences_rejected() {
    let ledger = Arc::new(
        full_product_script().respond(
            "get_quality_checks",
            // 2 organizations but 3 scores
            rmp_serde::to_vec(&(
                vec!["AgriCert International", "Food Safety Alliance"],
                vec![95u8, 92, 88],
                vec!["CERT-2024-001", "FSA-2024-123"],
            ))
            .unwrap(),
        ),
    );
    let mut fetcher = fetcher_over(ledger);

    let product = fetcher.get_product("PROD123").await;
    assert!(product.is_none());
    assert!(fetcher.error().unwrap().contains("malformed ledger response"));
}

#[tokio::test]
async fn test_write_failure_is_recorded_and_rethrown() {
    let ledger = Arc::new(ScriptedLedger::new().fail("add_product", "submission rejected"));
    let mut fetcher = fetcher_over(ledger);

    let result = fetcher
        .add_product("PROD200", "Heirloom Carrots", "Sunrise Farm")
        .await;

    match result {
        Err(AgriChainError::Ledger(msg)) => assert_eq!(msg, "submission rejected"),
        other => panic!("expected ledger error, got {other:?}"),
    }
    assert!(fetcher.error().unwrap().contains("submission rejected"));
    assert!(!fetcher.is_loading());
}

#[tokio::test]
async fn test_successful_write_clears_error_state() {
    let nil = rmp_serde::to_vec(&()).unwrap();
    let ledger = Arc::new(
        ScriptedLedger::new()
            .respond("add_quality_check", nil)
            .fail("add_product", "submission rejected"),
    );
    let mut fetcher = fetcher_over(Arc::clone(&ledger));

    assert!(fetcher
        .add_product("PROD200", "Heirloom Carrots", "Sunrise Farm")
        .await
        .is_err());
    assert!(fetcher.error().is_some());

    fetcher
        .add_quality_check("PROD200", "AgriCert International", 88, "CERT-2024-777")
        .await
        .expect("write acknowledged");
    assert!(fetcher.error().is_none());
    assert_eq!(ledger.calls(), vec!["add_product", "add_quality_check"]);
}
