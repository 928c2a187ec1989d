//! In-process holdings store

use async_trait::async_trait;
use portfolio_analytics::Holding;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::HoldingsStore;
use crate::error::Result;

/// Thread-safe in-memory holdings store
#[derive(Debug, Clone, Default)]
pub struct InMemoryHoldingsStore {
    owners: Arc<RwLock<HashMap<String, Vec<Holding>>>>,
}

impl InMemoryHoldingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldingsStore for InMemoryHoldingsStore {
    async fn list(&self, owner: &str) -> Result<Vec<Holding>> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner).cloned().unwrap_or_default())
    }

    async fn upsert(&self, owner: &str, holding: Holding) -> Result<()> {
        let mut owners = self.owners.write().await;
        let holdings = owners.entry(owner.to_string()).or_default();
        match holdings.iter_mut().find(|h| h.symbol == holding.symbol) {
            Some(existing) => *existing = holding,
            None => holdings.push(holding),
        }
        Ok(())
    }

    async fn remove(&self, owner: &str, symbol: &str) -> Result<bool> {
        let mut owners = self.owners.write().await;
        let Some(holdings) = owners.get_mut(owner) else {
            return Ok(false);
        };
        let before = holdings.len();
        holdings.retain(|h| h.symbol != symbol);
        Ok(holdings.len() != before)
    }
}
