//! AgriChain - supply-chain traceability gateway
//!
//! AgriChain lets a session act as one of six supply-chain roles, track a
//! product's provenance and quality-check history, and record new products
//! against an AgriChain ledger node.
//!
//! ## Components
//!
//! - **Ledger**: typed contract calls over a MessagePack/WebSocket link
//! - **Fetch**: assembly of products from the contract's raw parallel reads
//! - **Session**: the role-scoped state machine behind the UI
//! - **UI**: interactive shell with a track panel and a gated add panel
//! - **Catalog**: the static demo data the primary path renders from
//! - **Logging**: JSONL audit trail of every ledger call

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod ledger;
pub mod logging;
pub mod session;
pub mod types;
pub mod ui;

pub use config::Args;
pub use types::{AgriChainError, Result};
