//! Core types for AgriChain
//!
//! Domain records for products, quality checks and provenance history,
//! the supply-chain role set, and the crate-wide error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum AgriChainError {
    /// Failure surfaced by the ledger node or its transport.
    /// The message is passed through unmodified.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// The node returned data that violates the read contract
    /// (unequal parallel sequences, out-of-range timestamp, wrong shape).
    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    /// MessagePack envelope encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// Rejected startup configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AgriChainError>;

/// A supply-chain participant category a session can act as.
///
/// `User` is the consumer role: it can track products but never add them.
/// The remaining five roles are the actors that appear in provenance history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Farmer,
    Manufacturer,
    Distributor,
    Wholesaler,
    Retailer,
}

impl Role {
    /// Every role selectable at login, in picker order.
    pub const ALL: [Role; 6] = [
        Role::User,
        Role::Farmer,
        Role::Manufacturer,
        Role::Distributor,
        Role::Wholesaler,
        Role::Retailer,
    ];

    /// The five roles that act on products, in supply-chain order.
    pub const SUPPLY_CHAIN: [Role; 5] = [
        Role::Farmer,
        Role::Manufacturer,
        Role::Distributor,
        Role::Wholesaler,
        Role::Retailer,
    ];

    /// Display label, also the exact string recorded as the role of a
    /// history entry for the five supply-chain roles.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Consumer",
            Role::Farmer => "Farmer",
            Role::Manufacturer => "Manufacturer",
            Role::Distributor => "Distributor",
            Role::Wholesaler => "Wholesaler",
            Role::Retailer => "Retailer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Farmer => "farmer",
            Role::Manufacturer => "manufacturer",
            Role::Distributor => "distributor",
            Role::Wholesaler => "wholesaler",
            Role::Retailer => "retailer",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Role {
    type Err = AgriChainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "consumer" => Ok(Role::User),
            "farmer" => Ok(Role::Farmer),
            "manufacturer" => Ok(Role::Manufacturer),
            "distributor" => Ok(Role::Distributor),
            "wholesaler" => Ok(Role::Wholesaler),
            "retailer" => Ok(Role::Retailer),
            other => Err(AgriChainError::Config(format!("unknown role: {other}"))),
        }
    }
}

/// A third-party certification record associated with a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    /// Certifying organization name
    pub organization: String,

    /// Score, intended range 0-100 (not validated anywhere)
    pub score: u8,

    /// When the check was performed
    pub timestamp: String,

    /// Certification ID issued by the organization
    pub certification_id: String,

    /// Free-text notes; never persisted on-chain
    #[serde(default)]
    pub notes: Vec<String>,
}

/// One provenance event recorded against a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the event happened
    pub timestamp: String,

    /// Action label (Harvested, Processed, Shipped, ...)
    pub action: String,

    /// Actor name
    pub actor: String,

    /// Role label, a free string matched by exact equality against
    /// [`Role::label`] when deriving per-role actor fields
    pub role: String,

    /// Where the event happened
    pub location: String,

    /// Free-text details; never persisted on-chain
    #[serde(default)]
    pub details: String,
}

/// A traceable product with its full provenance
///
/// A product may have zero or many checks and history entries; the only
/// ordering is the insertion order of the source sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique string key
    pub id: String,

    /// Product name
    pub name: String,

    /// Origin description
    pub origin: String,

    /// Actor names per supply-chain role, empty string when unknown
    pub farmer: String,
    pub manufacturer: String,
    pub distributor: String,
    pub wholesaler: String,
    pub retailer: String,

    /// Production date (YYYY-MM-DD)
    pub production_date: String,

    /// Quality checks in insertion order
    #[serde(default)]
    pub quality_checks: Vec<QualityCheck>,

    /// Provenance history in insertion order
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("FARMER".parse::<Role>().unwrap(), Role::Farmer);
        assert_eq!("Consumer".parse::<Role>().unwrap(), Role::User);
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("auditor".parse::<Role>().is_err());
    }

    #[test]
    fn test_supply_chain_labels_exclude_consumer() {
        for role in Role::SUPPLY_CHAIN {
            assert_ne!(role.label(), "Consumer");
        }
    }
}
