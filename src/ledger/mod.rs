//! Ledger client for the AgriChain node
//!
//! - [`connection`]: persistent WebSocket transport with reconnection
//! - [`codec`]: MessagePack request/response envelopes
//! - [`contract`]: typed contract call surface

pub mod codec;
pub mod connection;
pub mod contract;

pub use codec::CallKind;
pub use connection::{LedgerConnection, LedgerTransport};
pub use contract::ContractClient;
