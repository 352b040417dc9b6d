//! Product assembly from raw contract reads
//!
//! [`ProductFetcher`] composes the contract's tuple-shaped reads into a
//! [`Product`] and exposes the async operation state (loading flag, last
//! error) the view renders from.
//!
//! Read failures are recorded and swallowed - the caller gets `None` and
//! cannot distinguish not-found from fetch failure. Write failures are
//! recorded AND propagated.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::ledger::ContractClient;
use crate::types::{AgriChainError, HistoryEntry, Product, QualityCheck, Result, Role};

/// Assembles products from contract reads and tracks async UI state
pub struct ProductFetcher {
    contract: Arc<ContractClient>,
    loading: bool,
    error: Option<String>,
}

impl ProductFetcher {
    /// Create a fetcher over a contract client
    pub fn new(contract: Arc<ContractClient>) -> Self {
        Self {
            contract,
            loading: false,
            error: None,
        }
    }

    /// Whether an operation is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed operation, cleared on the next one
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch and assemble one product.
    ///
    /// Performs the three reads sequentially. On any failure the error
    /// message is recorded and `None` is returned. The loading flag is
    /// always cleared on exit.
    pub async fn get_product(&mut self, product_id: &str) -> Option<Product> {
        self.loading = true;
        self.error = None;

        let result = self.fetch(product_id).await;
        self.loading = false;

        match result {
            Ok(product) => Some(product),
            Err(e) => {
                debug!(product_id = %product_id, error = %e, "product fetch failed");
                self.error = Some(e.to_string());
                None
            }
        }
    }

    async fn fetch(&self, product_id: &str) -> Result<Product> {
        let record = self.contract.get_product(product_id).await?;
        let checks = self.contract.get_quality_checks(product_id).await?;
        let history = self.contract.get_history(product_id).await?;
        assemble_product(product_id, record, checks, history)
    }

    /// Register a product. Failures are recorded and re-thrown.
    pub async fn add_product(&mut self, product_id: &str, name: &str, origin: &str) -> Result<()> {
        self.loading = true;
        self.error = None;

        let result = self.contract.add_product(product_id, name, origin).await;
        self.loading = false;

        if let Err(ref e) = result {
            self.error = Some(e.to_string());
        }
        result
    }

    /// Record a quality check. Failures are recorded and re-thrown.
    pub async fn add_quality_check(
        &mut self,
        product_id: &str,
        organization: &str,
        score: u8,
        certification_id: &str,
    ) -> Result<()> {
        self.loading = true;
        self.error = None;

        let result = self
            .contract
            .add_quality_check(product_id, organization, score, certification_id)
            .await;
        self.loading = false;

        if let Err(ref e) = result {
            self.error = Some(e.to_string());
        }
        result
    }
}

/// Assemble a [`Product`] from the contract's three raw reads.
///
/// The parallel sequences are an external data contract: unequal lengths are
/// rejected here rather than zipped into misaligned records.
pub fn assemble_product(
    product_id: &str,
    record: (String, String, u64),
    checks: (Vec<String>, Vec<u8>, Vec<String>),
    history: (Vec<String>, Vec<String>, Vec<String>, Vec<String>),
) -> Result<Product> {
    let (name, origin, timestamp) = record;

    let seconds = i64::try_from(timestamp).map_err(|_| {
        AgriChainError::MalformedResponse(format!("timestamp {timestamp} out of range"))
    })?;
    let minted = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
        AgriChainError::MalformedResponse(format!("timestamp {timestamp} out of range"))
    })?;
    let minted_at = minted.to_rfc3339();

    let (organizations, scores, certification_ids) = checks;
    if organizations.len() != scores.len() || organizations.len() != certification_ids.len() {
        return Err(AgriChainError::MalformedResponse(format!(
            "quality check sequences differ in length: {} organizations, {} scores, {} certification ids",
            organizations.len(),
            scores.len(),
            certification_ids.len()
        )));
    }

    let quality_checks: Vec<QualityCheck> = organizations
        .into_iter()
        .zip(scores)
        .zip(certification_ids)
        .map(|((organization, score), certification_id)| QualityCheck {
            organization,
            score,
            timestamp: minted_at.clone(),
            certification_id,
            // Notes are not stored on-chain
            notes: Vec::new(),
        })
        .collect();

    let (actions, actors, roles, locations) = history;
    if actions.len() != actors.len()
        || actions.len() != roles.len()
        || actions.len() != locations.len()
    {
        return Err(AgriChainError::MalformedResponse(format!(
            "history sequences differ in length: {} actions, {} actors, {} roles, {} locations",
            actions.len(),
            actors.len(),
            roles.len(),
            locations.len()
        )));
    }

    let history: Vec<HistoryEntry> = actions
        .into_iter()
        .zip(actors)
        .zip(roles)
        .zip(locations)
        .map(|(((action, actor), role), location)| HistoryEntry {
            timestamp: minted_at.clone(),
            action,
            actor,
            role,
            location,
            // Details are not stored on-chain
            details: String::new(),
        })
        .collect();

    Ok(Product {
        id: product_id.to_string(),
        name,
        origin,
        farmer: derive_actor(&history, Role::Farmer),
        manufacturer: derive_actor(&history, Role::Manufacturer),
        distributor: derive_actor(&history, Role::Distributor),
        wholesaler: derive_actor(&history, Role::Wholesaler),
        retailer: derive_actor(&history, Role::Retailer),
        production_date: minted.format("%Y-%m-%d").to_string(),
        quality_checks,
        history,
    })
}

/// First actor whose history role label exactly equals the role's label,
/// empty string when the role never appears
fn derive_actor(history: &[HistoryEntry], role: Role) -> String {
    history
        .iter()
        .find(|entry| entry.role == role.label())
        .map(|entry| entry.actor.clone())
        .unwrap_or_default()
}
