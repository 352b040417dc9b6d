//! Configuration for AgriChain
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

use crate::types::{AgriChainError, Result};

/// AgriChain - supply-chain traceability gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "agrichain")]
#[command(about = "Supply-chain traceability gateway for the AgriChain ledger")]
pub struct Args {
    /// Unique identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// AgriChain ledger node WebSocket URL
    #[arg(long, env = "LEDGER_URL", default_value = "ws://localhost:4455")]
    pub ledger_url: String,

    /// Address of the deployed AgriChain contract
    /// Required in ledger mode; the demo ships without a deployment
    #[arg(long, env = "CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,

    /// Read products from the ledger instead of the static demo catalog
    #[arg(long, env = "ONLINE", default_value = "false")]
    pub online: bool,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// JSONL file for the ledger call audit trail
    #[arg(long, env = "CALL_LOG")]
    pub call_log: Option<PathBuf>,
}

impl Args {
    /// Validate the configuration before startup
    pub fn validate(&self) -> Result<()> {
        if self.online && self.contract_address.is_none() {
            return Err(AgriChainError::Config(
                "CONTRACT_ADDRESS is required in ledger mode".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(AgriChainError::Config(
                "REQUEST_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
