//! Holdings persistence
//!
//! Holdings are keyed by `(owner, symbol)`: an upsert replaces the record for
//! that key and a removal deletes it. Implementations must serialise
//! mutations of one key so that no update is lost.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portfolio_analytics::Holding;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use json_file::JsonFileHoldingsStore;
pub use memory::InMemoryHoldingsStore;

/// Persisted holding row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub owner: String,
    pub symbol: String,
    pub shares: u64,
    pub cost_basis: f64,
    pub updated_at: DateTime<Utc>,
}

impl HoldingRecord {
    pub fn new(owner: &str, holding: &Holding) -> Self {
        Self {
            owner: owner.to_string(),
            symbol: holding.symbol.clone(),
            shares: holding.shares,
            cost_basis: holding.cost_basis,
            updated_at: Utc::now(),
        }
    }

    pub fn holding(&self) -> Holding {
        Holding::new(self.symbol.clone(), self.shares, self.cost_basis)
    }
}

/// Storage of holdings per owner
#[async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Holdings of `owner` in insertion order
    async fn list(&self, owner: &str) -> Result<Vec<Holding>>;

    /// Insert or replace the holding for `(owner, holding.symbol)`
    async fn upsert(&self, owner: &str, holding: Holding) -> Result<()>;

    /// Delete the holding for `(owner, symbol)`; returns whether one existed
    async fn remove(&self, owner: &str, symbol: &str) -> Result<bool>;
}
