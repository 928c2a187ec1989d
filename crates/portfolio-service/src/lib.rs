//! Portfolio service layer
//!
//! Async orchestration around the pure [`portfolio_analytics`] core:
//!
//! - [`HistoryProvider`]: price history sources (Yahoo Finance, static files)
//! - [`HoldingsStore`]: per-owner holdings persistence (memory, JSON file)
//! - [`PortfolioService`]: holdings management, quotes, consolidated overview
//!   and portfolio analysis with partial-failure reporting
//! - [`SummaryService`]: cached one-sentence company summaries from an
//!   injected [`TextGenerator`]
//!
//! # Example
//!
//! ```rust,no_run
//! use portfolio_service::{
//!     JsonFileHoldingsStore, PortfolioConfig, PortfolioService, YahooHistoryProvider,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> portfolio_service::Result<()> {
//!     let config = Arc::new(PortfolioConfig::from_env()?);
//!     let service = PortfolioService::new(
//!         config.clone(),
//!         Arc::new(YahooHistoryProvider::new(&config)),
//!         Arc::new(JsonFileHoldingsStore::new("portfolio.json")),
//!     );
//!
//!     service.add_holding("alice", "AAPL", "10", "150").await?;
//!     let analysis = service.analyze("alice").await?;
//!     println!("{}", serde_json::to_string_pretty(&analysis.report())?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod providers;
pub mod service;
pub mod store;
pub mod summary;

pub use config::{PortfolioConfig, PortfolioConfigBuilder};
pub use error::{ErrorKind, FetchFailure, PortfolioError, Result};
pub use providers::{HistoryProvider, StaticHistoryProvider, YahooHistoryProvider};
pub use service::{PortfolioAnalysis, PortfolioService};
pub use store::{HoldingRecord, HoldingsStore, InMemoryHoldingsStore, JsonFileHoldingsStore};
pub use summary::{SummaryCache, SummaryService, TextGenerator, TimedSummaryCache};
