//! Price history sources

pub mod fixture;
pub mod yahoo;

use async_trait::async_trait;
use portfolio_analytics::{Period, PriceSeries};

use crate::error::Result;

pub use fixture::StaticHistoryProvider;
pub use yahoo::YahooHistoryProvider;

/// Capability to fetch OHLCV history for one symbol.
///
/// Implementations own their timeouts; a slow or failing symbol surfaces as an
/// error and is excluded by the caller instead of aborting the analysis.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Bars covering roughly the last `days` periods, ascending by date
    async fn fetch_history(&self, symbol: &str, days: u32, period: Period) -> Result<PriceSeries>;

    /// Human-readable name for `symbol`
    async fn display_name(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    /// Provider name used in logs
    fn name(&self) -> &str;
}
