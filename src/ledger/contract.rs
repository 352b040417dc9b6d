//! ContractClient - typed calls against the AgriChain contract
//!
//! Single-connection client with lazy init. Translates the six contract
//! operations into framed ledger requests:
//! - writes (`add_product`, `add_quality_check`, `add_history_entry`) are
//!   submit-and-wait: the call returns once the node acknowledges the write
//!   as finalized
//! - reads (`get_product`, `get_quality_checks`, `get_history`) return the
//!   contract's fixed-arity tuples of parallel sequences, unzipped
//!
//! No validation, retry or timeout beyond the transport's per-request
//! timeout is applied here; failures surface exactly as the node reports
//! them.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::ledger::codec::{build_contract_request, build_request_envelope, parse_response, CallKind};
use crate::ledger::connection::{LedgerConnection, LedgerTransport};
use crate::logging::{CallDirection, CallEvent, CallLogger};
use crate::types::{AgriChainError, Result};

/// Typed contract client with single-connection lazy init
pub struct ContractClient {
    node_url: String,
    contract_address: String,
    request_timeout_ms: u64,
    /// The single node connection (lazily initialized)
    connection: RwLock<Option<Arc<dyn LedgerTransport>>>,
    /// Lock to prevent concurrent connection attempts
    connecting: Mutex<()>,
    call_log: CallLogger,
}

impl ContractClient {
    /// Create a new client that connects lazily to `node_url`
    pub fn new(
        node_url: &str,
        contract_address: &str,
        request_timeout_ms: u64,
        call_log: CallLogger,
    ) -> Self {
        info!(
            node_url = %node_url,
            contract = %contract_address,
            "ContractClient created"
        );
        Self {
            node_url: node_url.to_string(),
            contract_address: contract_address.to_string(),
            request_timeout_ms,
            connection: RwLock::new(None),
            connecting: Mutex::new(()),
            call_log,
        }
    }

    /// Create a client over an already-established transport
    pub fn with_transport(
        transport: Arc<dyn LedgerTransport>,
        contract_address: &str,
        request_timeout_ms: u64,
        call_log: CallLogger,
    ) -> Self {
        Self {
            node_url: String::new(),
            contract_address: contract_address.to_string(),
            request_timeout_ms,
            connection: RwLock::new(Some(transport)),
            connecting: Mutex::new(()),
            call_log,
        }
    }

    /// Get or create the node connection
    async fn get_connection(&self) -> Result<Arc<dyn LedgerTransport>> {
        // Fast path: check if we have a connection
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                if c.is_connected().await {
                    return Ok(Arc::clone(c));
                }
            }
        }

        // Slow path: need to (re)connect
        let _lock = self.connecting.lock().await;

        // Double-check after acquiring lock
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                if c.is_connected().await {
                    return Ok(Arc::clone(c));
                }
            }
        }

        if self.node_url.is_empty() {
            return Err(AgriChainError::Ledger(
                "Ledger transport lost and no node URL to reconnect".into(),
            ));
        }

        info!("ContractClient connecting to ledger node at {}", self.node_url);
        let conn: Arc<dyn LedgerTransport> =
            Arc::new(LedgerConnection::connect(&self.node_url).await?);

        // Store the connection
        {
            let mut write_conn = self.connection.write().await;
            *write_conn = Some(Arc::clone(&conn));
        }

        info!("ContractClient connected to ledger node");
        Ok(conn)
    }

    /// Call a contract method with raw bytes args, return raw result bytes
    async fn call_raw(
        &self,
        kind: CallKind,
        method: &str,
        product_id: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let started = Instant::now();
        let result = self.dispatch(kind, method, args).await;

        let direction = match kind {
            CallKind::Call => CallDirection::Read,
            CallKind::Submit => CallDirection::Write,
        };
        let mut event = CallEvent::new(method, direction, self.call_log.node_id().to_string())
            .with_product(product_id)
            .with_duration(started.elapsed().as_millis() as u64);
        if let Err(ref e) = result {
            event = event.failed(e.to_string());
        }
        self.call_log.log(event).await;

        result
    }

    async fn dispatch(&self, kind: CallKind, method: &str, args: Vec<u8>) -> Result<Vec<u8>> {
        let conn = self.get_connection().await?;

        let request = build_contract_request(kind, &self.contract_address, method, args);
        let request_id = 1u64;
        let envelope = build_request_envelope(request_id, &request);

        debug!(
            contract = %self.contract_address,
            method = %method,
            "ContractClient sending {} ({} bytes)",
            kind.wire_tag(),
            envelope.len()
        );

        match conn.request(envelope, self.request_timeout_ms).await {
            Ok(response) => {
                debug!("ContractClient got response ({} bytes)", response.len());
                parse_response(&response)
            }
            Err(e) => {
                warn!("ContractClient request failed: {}", e);
                // Clear connection so next call reconnects
                let mut write_conn = self.connection.write().await;
                *write_conn = None;
                Err(e)
            }
        }
    }

    /// Typed wrapper: serialize args with MessagePack, deserialize the result
    async fn call<I: Serialize, O: DeserializeOwned>(
        &self,
        kind: CallKind,
        method: &str,
        product_id: &str,
        args: &I,
    ) -> Result<O> {
        let payload = rmp_serde::to_vec(args)
            .map_err(|e| AgriChainError::Codec(format!("Failed to serialize args: {e}")))?;

        let response_bytes = self.call_raw(kind, method, product_id, payload).await?;

        rmp_serde::from_slice(&response_bytes).map_err(|e| {
            AgriChainError::MalformedResponse(format!("Failed to decode {method} result: {e}"))
        })
    }

    /// Register a product, stamped with the current time.
    /// Returns once the node acknowledges the write as finalized.
    pub async fn add_product(&self, product_id: &str, name: &str, origin: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp() as u64;
        let payload = rmp_serde::to_vec(&(product_id, name, origin, timestamp))
            .map_err(|e| AgriChainError::Codec(format!("Failed to serialize args: {e}")))?;
        self.call_raw(CallKind::Submit, "add_product", product_id, payload)
            .await?;
        Ok(())
    }

    /// Record a quality check. Score is passed through unvalidated.
    pub async fn add_quality_check(
        &self,
        product_id: &str,
        organization: &str,
        score: u8,
        certification_id: &str,
    ) -> Result<()> {
        let payload = rmp_serde::to_vec(&(product_id, organization, score, certification_id))
            .map_err(|e| AgriChainError::Codec(format!("Failed to serialize args: {e}")))?;
        self.call_raw(CallKind::Submit, "add_quality_check", product_id, payload)
            .await?;
        Ok(())
    }

    /// Record a provenance event
    pub async fn add_history_entry(
        &self,
        product_id: &str,
        action: &str,
        actor: &str,
        role: &str,
        location: &str,
    ) -> Result<()> {
        let payload = rmp_serde::to_vec(&(product_id, action, actor, role, location))
            .map_err(|e| AgriChainError::Codec(format!("Failed to serialize args: {e}")))?;
        self.call_raw(CallKind::Submit, "add_history_entry", product_id, payload)
            .await?;
        Ok(())
    }

    /// Read the product record: (name, origin, timestamp).
    /// No existence check - behavior for an unknown id is whatever the
    /// contract returns.
    pub async fn get_product(&self, product_id: &str) -> Result<(String, String, u64)> {
        self.call(CallKind::Call, "get_product", product_id, &(product_id,))
            .await
    }

    /// Read quality checks as parallel sequences:
    /// (organizations, scores, certification_ids)
    pub async fn get_quality_checks(
        &self,
        product_id: &str,
    ) -> Result<(Vec<String>, Vec<u8>, Vec<String>)> {
        self.call(CallKind::Call, "get_quality_checks", product_id, &(product_id,))
            .await
    }

    /// Read provenance history as parallel sequences:
    /// (actions, actors, roles, locations)
    pub async fn get_history(
        &self,
        product_id: &str,
    ) -> Result<(Vec<String>, Vec<String>, Vec<String>, Vec<String>)> {
        self.call(CallKind::Call, "get_history", product_id, &(product_id,))
            .await
    }

    /// Check if currently connected
    pub async fn is_connected(&self) -> bool {
        let conn = self.connection.read().await;
        if let Some(ref c) = *conn {
            c.is_connected().await
        } else {
            false
        }
    }
}
