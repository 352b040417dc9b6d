//! Ledger call audit trail
//!
//! Records every contract call in JSONL format so operators can reconcile
//! what the gateway asked the ledger to do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Whether a call reads or mutates ledger state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Read,
    Write,
}

/// One contract call, for the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Gateway instance that made the call
    pub node_id: String,
    /// Contract method name
    pub method: String,
    /// Product the call concerned
    pub product_id: Option<String>,
    /// Read or write
    pub direction: CallDirection,
    /// Whether the node acknowledged the call
    pub success: bool,
    /// Round-trip duration in milliseconds
    pub duration_ms: Option<u64>,
    /// Failure message as surfaced by the node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallEvent {
    /// Create a new successful call event
    pub fn new(method: &str, direction: CallDirection, node_id: String) -> Self {
        Self {
            timestamp: Utc::now(),
            node_id,
            method: method.to_string(),
            product_id: None,
            direction,
            success: true,
            duration_ms: None,
            error: None,
        }
    }

    /// Set the product id
    pub fn with_product(mut self, product_id: &str) -> Self {
        self.product_id = Some(product_id.to_string());
        self
    }

    /// Set the round-trip duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Mark the call as failed with the node's message
    pub fn failed(mut self, message: String) -> Self {
        self.success = false;
        self.error = Some(message);
        self
    }

    /// Convert to JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Call logger that appends events to a JSONL file
///
/// Without a file, events are still emitted through `tracing` at debug level.
#[derive(Clone)]
pub struct CallLogger {
    inner: Arc<Mutex<CallLoggerInner>>,
    node_id: String,
}

struct CallLoggerInner {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl CallLogger {
    /// Create a new call logger
    pub fn new(node_id: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CallLoggerInner {
                writer: None,
                path: None,
            })),
            node_id,
        }
    }

    /// Gateway instance id stamped on every event
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Initialize file logging to the specified path
    pub async fn init_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let writer = BufWriter::new(file);

        let mut inner = self.inner.lock().await;
        inner.writer = Some(writer);
        inner.path = Some(path.clone());

        info!("Call logging initialized to {}", path.display());
        Ok(())
    }

    /// Log a call event
    pub async fn log(&self, event: CallEvent) {
        let jsonl = match event.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize call event: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;

        if let Some(ref mut writer) = inner.writer {
            if let Err(e) = writeln!(writer, "{}", jsonl) {
                error!("Failed to write call event: {}", e);
            }
            // Flush per event for durability
            if let Err(e) = writer.flush() {
                error!("Failed to flush call log: {}", e);
            }
        } else {
            debug!(
                method = %event.method,
                product_id = ?event.product_id,
                success = event.success,
                "ledger call"
            );
        }
    }
}
