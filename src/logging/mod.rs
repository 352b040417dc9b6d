//! Logging infrastructure for AgriChain
//!
//! Provides the structured ledger call audit trail.

pub mod calls;

pub use calls::{CallDirection, CallEvent, CallLogger};
