//! Yahoo Finance history provider

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use portfolio_analytics::{Market, Period, PriceBar, PriceSeries, classify_market, resample};
use std::num::NonZeroU32;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use super::HistoryProvider;
use crate::config::PortfolioConfig;
use crate::error::{PortfolioError, Result};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Yahoo Finance history provider with rate limiting, timeouts and retries
#[derive(Clone)]
pub struct YahooHistoryProvider {
    rate_limiter: SharedRateLimiter,
    config: PortfolioConfig,
}

/// Yahoo ticker for a symbol; domestic codes get their exchange suffix.
///
/// Shanghai listings start with 6 or 9, everything else numeric trades in Shenzhen.
pub fn yahoo_ticker(symbol: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    match classify_market(&symbol) {
        Market::Domestic if symbol.starts_with('6') || symbol.starts_with('9') => {
            format!("{symbol}.SS")
        }
        Market::Domestic => format!("{symbol}.SZ"),
        Market::Foreign => symbol,
    }
}

impl YahooHistoryProvider {
    /// Create a provider using the timeouts and limits of `config`
    pub fn new(config: &PortfolioConfig) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            config: config.clone(),
        }
    }

    async fn fetch_once(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| PortfolioError::YahooFinanceError(e.to_string()))?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            PortfolioError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp()).map_err(|e| {
            PortfolioError::YahooFinanceError(format!("Invalid end timestamp: {e}"))
        })?;

        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| PortfolioError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| PortfolioError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume as f64,
                    amount: None,
                    change_pct: None,
                })
            })
            .collect())
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    async fn fetch_history(&self, symbol: &str, days: u32, period: Period) -> Result<PriceSeries> {
        let ticker = yahoo_ticker(symbol);
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(period.lookback_days(days)));

        let mut last_error = None;
        let timeout = self.config.request_timeout;
        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_backoff(attempt - 1)).await;
            }
            self.rate_limiter.until_ready().await;

            debug!(%ticker, attempt, %period, "Fetching Yahoo history");
            match tokio::time::timeout(timeout, self.fetch_once(&ticker, start, end)).await {
                Ok(Ok(bars)) if bars.is_empty() => {
                    return Err(PortfolioError::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: "No historical data available".to_string(),
                    });
                }
                Ok(Ok(bars)) => {
                    let series = PriceSeries::new(symbol, bars);
                    return Ok(resample(&series, period));
                }
                Ok(Err(e)) => {
                    warn!(%ticker, attempt, error = %e, "Yahoo history request failed");
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!(%ticker, attempt, "Yahoo history request timed out");
                    last_error = Some(PortfolioError::Timeout {
                        symbol: symbol.to_string(),
                        seconds: timeout.as_secs(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PortfolioError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "No attempts made".to_string(),
        }))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_yahoo_ticker_mapping() {
        assert_eq!(yahoo_ticker("600519"), "600519.SS");
        assert_eq!(yahoo_ticker("000001"), "000001.SZ");
        assert_eq!(yahoo_ticker("300750"), "300750.SZ");
        assert_eq!(yahoo_ticker("aapl"), "AAPL");
    }

    #[test]
    fn test_retry_policy_comes_from_config() {
        let config = PortfolioConfig::builder()
            .max_retries(4)
            .retry_backoff_base(Duration::from_millis(250))
            .build()
            .unwrap();
        let provider = YahooHistoryProvider::new(&config);

        assert_eq!(provider.config.max_retries, 4);
        assert_eq!(provider.config.retry_backoff(0), Duration::from_millis(250));
        assert_eq!(provider.config.retry_backoff(2), Duration::from_secs(1));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_history() {
        let provider = YahooHistoryProvider::new(&PortfolioConfig::default());
        let series = provider.fetch_history("AAPL", 30, Period::Daily).await.unwrap();
        assert!(!series.is_empty());
        assert!(series.bars().iter().all(|b| b.close > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_weekly_domestic_history() {
        let provider = YahooHistoryProvider::new(&PortfolioConfig::default());
        let series = provider.fetch_history("600519", 20, Period::Weekly).await.unwrap();
        assert!(series.len() > 1);
    }
}
