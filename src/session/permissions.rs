//! Access levels and panel whitelist for dashboard panels

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::Panel;
use crate::types::Role;

/// Access levels for dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
#[derive(Default)]
pub enum AccessLevel {
    /// Any logged-in role - read-only tracking
    #[default]
    Consumer = 0,
    /// Supply-chain participant - may record products
    Participant = 1,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Consumer => write!(f, "CONSUMER"),
            AccessLevel::Participant => write!(f, "PARTICIPANT"),
        }
    }
}

/// Access level a role holds once logged in
pub fn access_level(role: Role) -> AccessLevel {
    match role {
        Role::User => AccessLevel::Consumer,
        Role::Farmer
        | Role::Manufacturer
        | Role::Distributor
        | Role::Wholesaler
        | Role::Retailer => AccessLevel::Participant,
    }
}

/// Access level a panel requires
pub fn required_access(panel: Panel) -> AccessLevel {
    match panel {
        Panel::Track => AccessLevel::Consumer,
        Panel::Add => AccessLevel::Participant,
    }
}

/// Check if a panel is reachable for the given role
pub fn is_panel_allowed(panel: Panel, role: Role) -> bool {
    access_level(role) >= required_access(panel)
}

/// Human-readable description of a panel for logging
pub fn panel_description(panel: Panel) -> &'static str {
    match panel {
        Panel::Track => "Track a product's provenance",
        Panel::Add => "Record a new product",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_panel_open_to_all() {
        for role in Role::ALL {
            assert!(is_panel_allowed(Panel::Track, role));
        }
    }

    #[test]
    fn test_add_panel_requires_participant() {
        assert!(!is_panel_allowed(Panel::Add, Role::User));
        for role in Role::SUPPLY_CHAIN {
            assert!(is_panel_allowed(Panel::Add, role));
        }
    }

    #[test]
    fn test_access_ordering() {
        assert!(AccessLevel::Participant > AccessLevel::Consumer);
    }
}
