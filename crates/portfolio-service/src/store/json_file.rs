//! Holdings store persisted as a JSON array on disk

use async_trait::async_trait;
use chrono::Utc;
use portfolio_analytics::Holding;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{HoldingRecord, HoldingsStore};
use crate::error::{PortfolioError, Result};

/// JSON-file holdings store.
///
/// Each mutation is a read-modify-write of the whole file performed under one
/// lock, so concurrent upserts through the same store never overwrite each
/// other. The file is replaced atomically via a sibling temporary file.
#[derive(Debug, Clone)]
pub struct JsonFileHoldingsStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileHoldingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<HoldingRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                PortfolioError::Storage(format!(
                    "Corrupt holdings file {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_records(&self, records: &[HoldingRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), records = records.len(), "Wrote holdings file");
        Ok(())
    }
}

#[async_trait]
impl HoldingsStore for JsonFileHoldingsStore {
    async fn list(&self, owner: &str) -> Result<Vec<Holding>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_records()
            .await?
            .iter()
            .filter(|r| r.owner == owner)
            .map(HoldingRecord::holding)
            .collect())
    }

    async fn upsert(&self, owner: &str, holding: Holding) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;

        match records
            .iter_mut()
            .find(|r| r.owner == owner && r.symbol == holding.symbol)
        {
            Some(existing) => {
                existing.shares = holding.shares;
                existing.cost_basis = holding.cost_basis;
                existing.updated_at = Utc::now();
            }
            None => records.push(HoldingRecord::new(owner, &holding)),
        }

        self.write_records(&records).await?;
        info!(owner, symbol = %holding.symbol, shares = holding.shares, "Saved holding");
        Ok(())
    }

    async fn remove(&self, owner: &str, symbol: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;
        let before = records.len();
        records.retain(|r| !(r.owner == owner && r.symbol == symbol));
        if records.len() == before {
            return Ok(false);
        }
        self.write_records(&records).await?;
        info!(owner, symbol, "Removed holding");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileHoldingsStore::new(dir.path().join("portfolio.json"));
        assert!(store.list("alice").await.unwrap().is_empty());
        assert!(!store.remove("alice", "AAPL").await.unwrap());
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");

        let store = JsonFileHoldingsStore::new(&path);
        store.upsert("alice", Holding::new("AAPL", 10, 150.0)).await.unwrap();
        store.upsert("bob", Holding::new("AAPL", 1, 100.0)).await.unwrap();
        store.upsert("alice", Holding::new("AAPL", 12, 155.0)).await.unwrap();

        let reopened = JsonFileHoldingsStore::new(&path);
        assert_eq!(
            reopened.list("alice").await.unwrap(),
            vec![Holding::new("AAPL", 12, 155.0)]
        );
        assert_eq!(reopened.list("bob").await.unwrap().len(), 1);

        assert!(reopened.remove("alice", "AAPL").await.unwrap());
        assert!(store.list("alice").await.unwrap().is_empty());
        assert_eq!(store.list("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = JsonFileHoldingsStore::new(dir.path().join("portfolio.json"));

        let mut handles = Vec::new();
        for i in 0..8_u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert("alice", Holding::new(format!("SYM{i}"), i + 1, 1.0))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.list("alice").await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let err = JsonFileHoldingsStore::new(&path).list("alice").await.unwrap_err();
        assert!(matches!(err, PortfolioError::Storage(_)));
    }
}
