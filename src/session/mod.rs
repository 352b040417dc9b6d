//! Session state machine
//!
//! Exactly one active role context per session: `LoggedOut` or
//! `LoggedIn(dashboard)`. The [`Session`] value is the single owning root of
//! all in-session UI state; the only transitions are the two defined here.
//! `login` is unconditional (any role button grants that role), `logout`
//! drops the dashboard wholesale so no search text, displayed product,
//! active panel, form field or pending notice survives re-login.

pub mod permissions;

pub use permissions::{access_level, is_panel_allowed, required_access, AccessLevel};

use std::fmt;
use tracing::{debug, info};

use crate::catalog::ProductCatalog;
use crate::types::Role;
use crate::ui::form::ProductForm;
use crate::ui::tracker::{SearchOutcome, Tracker};

/// Dashboard panel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Track,
    Add,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Track => write!(f, "track"),
            Panel::Add => write!(f, "add"),
        }
    }
}

/// Per-login UI state: active panel, tracker, form, pending notice
#[derive(Debug)]
pub struct Dashboard {
    role: Role,
    active: Panel,
    pub tracker: Tracker,
    pub form: ProductForm,
    notice: Option<String>,
}

impl Dashboard {
    fn new(role: Role) -> Self {
        Self {
            role,
            active: Panel::Track,
            tracker: Tracker::new(),
            form: ProductForm::new(),
            notice: None,
        }
    }

    /// Role this dashboard was opened with
    pub fn role(&self) -> Role {
        self.role
    }

    /// Currently rendered panel
    pub fn active_panel(&self) -> Panel {
        self.active
    }

    /// Switch panels. A denied switch leaves the active panel unchanged
    /// and returns false.
    pub fn open_panel(&mut self, panel: Panel) -> bool {
        if !is_panel_allowed(panel, self.role) {
            debug!(role = %self.role, panel = %panel, "panel switch denied");
            return false;
        }
        self.active = panel;
        true
    }

    /// Search the catalog with the tracker's current query.
    ///
    /// A non-match clears the display and raises exactly one blocking
    /// notice.
    pub fn search_catalog(&mut self, catalog: &ProductCatalog) -> SearchOutcome {
        let outcome = self.tracker.search(catalog);
        if outcome == SearchOutcome::NotFound {
            self.raise_notice("Product not found");
        }
        outcome
    }

    /// Queue a blocking notice for the view to acknowledge
    pub fn raise_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    /// Whether a notice is pending acknowledgment
    pub fn has_notice(&self) -> bool {
        self.notice.is_some()
    }

    /// Take the pending notice, acknowledging it
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

/// Mutually exclusive authentication states
#[derive(Debug)]
enum AuthState {
    LoggedOut,
    LoggedIn(Dashboard),
}

/// The single owning root of session state
#[derive(Debug)]
pub struct Session {
    state: AuthState,
}

impl Session {
    /// Start logged out
    pub fn new() -> Self {
        Self {
            state: AuthState::LoggedOut,
        }
    }

    /// Unconditional login: any role grants that role. A fresh dashboard
    /// replaces whatever was active.
    pub fn login(&mut self, role: Role) {
        info!(role = %role, "session login");
        self.state = AuthState::LoggedIn(Dashboard::new(role));
    }

    /// Return to logged out, discarding all in-session UI state
    pub fn logout(&mut self) {
        if let AuthState::LoggedIn(ref dashboard) = self.state {
            info!(role = %dashboard.role(), "session logout");
        }
        self.state = AuthState::LoggedOut;
    }

    /// Whether a role context is active
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::LoggedIn(_))
    }

    /// The active role, if any
    pub fn role(&self) -> Option<Role> {
        match self.state {
            AuthState::LoggedOut => None,
            AuthState::LoggedIn(ref dashboard) => Some(dashboard.role()),
        }
    }

    /// The active dashboard, if any
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self.state {
            AuthState::LoggedOut => None,
            AuthState::LoggedIn(ref dashboard) => Some(dashboard),
        }
    }

    /// Mutable access to the active dashboard, if any
    pub fn dashboard_mut(&mut self) -> Option<&mut Dashboard> {
        match self.state {
            AuthState::LoggedOut => None,
            AuthState::LoggedIn(ref mut dashboard) => Some(dashboard),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
