//! Track panel: search state and product card rendering

use std::fmt::Write as _;

use crate::catalog::ProductCatalog;
use crate::types::Product;

/// Result of a tracker search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    NotFound,
}

/// Search input plus the currently displayed product
#[derive(Debug, Default)]
pub struct Tracker {
    query: String,
    product: Option<Product>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the search text
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Currently displayed product
    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// Show a product fetched outside the catalog path
    pub fn show(&mut self, product: Product) {
        self.product = Some(product);
    }

    /// Clear the display
    pub fn clear(&mut self) {
        self.product = None;
    }

    /// Look the current query up in the catalog: a match shows the product,
    /// a non-match clears the display
    pub fn search(&mut self, catalog: &ProductCatalog) -> SearchOutcome {
        match catalog.lookup(&self.query) {
            Some(product) => {
                self.product = Some(product.clone());
                SearchOutcome::Found
            }
            None => {
                self.product = None;
                SearchOutcome::NotFound
            }
        }
    }
}

/// Quality score band, thresholds at 90 and 70
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        if score >= 90 {
            ScoreBand::Good
        } else if score >= 70 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            ScoreBand::Good => "+",
            ScoreBand::Fair => "~",
            ScoreBand::Poor => "!",
        }
    }
}

/// Render the full product card: details, quality assurance, history
pub fn render_product(product: &Product) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Product Details");
    let _ = writeln!(out, "  ID:              {}", product.id);
    let _ = writeln!(out, "  Name:            {}", product.name);
    let _ = writeln!(out, "  Origin:          {}", product.origin);
    let _ = writeln!(out, "  Production date: {}", product.production_date);

    let _ = writeln!(out, "Quality Assurance");
    for check in &product.quality_checks {
        let band = ScoreBand::of(check.score);
        let _ = writeln!(
            out,
            "  [{}] {}% {} (cert {})",
            band.marker(),
            check.score,
            check.organization,
            check.certification_id
        );
        for note in &check.notes {
            let _ = writeln!(out, "      - {}", note);
        }
        let _ = writeln!(out, "      Verified on: {}", check.timestamp);
    }

    let _ = writeln!(out, "Supply Chain History");
    for event in &product.history {
        let _ = writeln!(
            out,
            "  {} {} by {} ({}) at {}",
            event.timestamp, event.action, event.actor, event.role, event.location
        );
        if !event.details.is_empty() {
            let _ = writeln!(out, "      {}", event.details);
        }
    }

    out
}
