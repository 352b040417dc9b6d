//! Demo product catalog
//!
//! The primary demo path renders from this fixed in-memory catalog instead
//! of the ledger. It is rebuilt on every start and never mutated by the UI.

use crate::types::{HistoryEntry, Product, QualityCheck};

/// Fixed in-memory catalog with case-insensitive id lookup
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Create the demo catalog holding the one sample product
    pub fn demo() -> Self {
        Self {
            products: vec![sample_product()],
        }
    }

    /// Add a product
    pub fn insert(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Case-insensitive equality lookup by id. No partial or fuzzy matching.
    pub fn lookup(&self, id: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::demo()
    }
}

/// The sample product shown in the demo: PROD123, two quality checks, five
/// history entries in supply-chain order
pub fn sample_product() -> Product {
    Product {
        id: "PROD123".to_string(),
        name: "Organic Tomatoes".to_string(),
        origin: "Green Valley Farms, California".to_string(),
        farmer: "John Smith".to_string(),
        manufacturer: "Fresh Pack Co.".to_string(),
        distributor: "Quick Ship Logistics".to_string(),
        wholesaler: "Metro Foods".to_string(),
        retailer: "Fresh Market".to_string(),
        production_date: "2024-02-15".to_string(),
        quality_checks: vec![
            QualityCheck {
                organization: "AgriCert International".to_string(),
                score: 95,
                timestamp: "2024-02-15 09:30".to_string(),
                certification_id: "CERT-2024-001".to_string(),
                notes: vec![
                    "Meets organic certification standards".to_string(),
                    "Pesticide-free verification completed".to_string(),
                    "Optimal ripeness confirmed".to_string(),
                ],
            },
            QualityCheck {
                organization: "Food Safety Alliance".to_string(),
                score: 92,
                timestamp: "2024-02-16 11:00".to_string(),
                certification_id: "FSA-2024-123".to_string(),
                notes: vec![
                    "Storage conditions verified".to_string(),
                    "Temperature monitoring compliant".to_string(),
                    "Packaging integrity confirmed".to_string(),
                ],
            },
        ],
        history: vec![
            HistoryEntry {
                timestamp: "2024-02-15 08:00".to_string(),
                action: "Harvested".to_string(),
                actor: "John Smith".to_string(),
                role: "Farmer".to_string(),
                location: "Green Valley Farms".to_string(),
                details: "Harvested at optimal ripeness".to_string(),
            },
            HistoryEntry {
                timestamp: "2024-02-16 10:00".to_string(),
                action: "Processed".to_string(),
                actor: "Fresh Pack Co.".to_string(),
                role: "Manufacturer".to_string(),
                location: "Processing Facility".to_string(),
                details: "Cleaned and packaged".to_string(),
            },
            HistoryEntry {
                timestamp: "2024-02-17 09:00".to_string(),
                action: "Shipped".to_string(),
                actor: "Quick Ship Logistics".to_string(),
                role: "Distributor".to_string(),
                location: "Distribution Center".to_string(),
                details: "Temperature controlled transport".to_string(),
            },
            HistoryEntry {
                timestamp: "2024-02-18 14:00".to_string(),
                action: "Received".to_string(),
                actor: "Metro Foods".to_string(),
                role: "Wholesaler".to_string(),
                location: "Wholesale Market".to_string(),
                details: "Quality check passed".to_string(),
            },
            HistoryEntry {
                timestamp: "2024-02-19 11:00".to_string(),
                action: "Stocked".to_string(),
                actor: "Fresh Market".to_string(),
                role: "Retailer".to_string(),
                location: "Store #123".to_string(),
                details: "Display temperature: 4\u{b0}C".to_string(),
            },
        ],
    }
}
