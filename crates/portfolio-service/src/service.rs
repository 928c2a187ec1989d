//! Portfolio orchestration over injected collaborators
//!
//! [`PortfolioService`] ties the holdings store and the history provider to the
//! pure analytics core. Fetches run one symbol at a time; a symbol whose fetch
//! fails is recorded and excluded instead of aborting the request.

use portfolio_analytics::{
    AnalysisError, AnalysisReport, AnalyticsResult, Holding, Period, PortfolioOverview,
    PriceSeries, Quote, align, analyze, consolidate, normalize_symbol,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PortfolioConfig;
use crate::error::{FetchFailure, PortfolioError, Result};
use crate::providers::HistoryProvider;
use crate::store::HoldingsStore;

/// Successful analysis, possibly over a subset of the held symbols
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub analytics: AnalyticsResult,
    /// Symbols excluded because their history could not be fetched
    pub dropped: Vec<FetchFailure>,
    pub period: Period,
}

impl PortfolioAnalysis {
    pub fn dropped_symbols(&self) -> Vec<String> {
        self.dropped.iter().map(|f| f.symbol.clone()).collect()
    }

    /// Serialisable payload with non-finite values nulled
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from(&self.analytics).with_dropped(self.dropped_symbols())
    }
}

/// Holdings management, quotes, consolidation and analysis for one deployment
#[derive(Clone)]
pub struct PortfolioService {
    config: Arc<PortfolioConfig>,
    history: Arc<dyn HistoryProvider>,
    store: Arc<dyn HoldingsStore>,
}

impl PortfolioService {
    pub fn new(
        config: Arc<PortfolioConfig>,
        history: Arc<dyn HistoryProvider>,
        store: Arc<dyn HoldingsStore>,
    ) -> Self {
        Self {
            config,
            history,
            store,
        }
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    pub async fn holdings(&self, owner: &str) -> Result<Vec<Holding>> {
        self.store.list(owner).await
    }

    /// Validate raw input and store it as a new holding
    pub async fn add_holding(
        &self,
        owner: &str,
        symbol: &str,
        quantity: &str,
        cost: &str,
    ) -> Result<Holding> {
        let holding = Holding::parse(symbol, quantity, cost)?;
        self.store.upsert(owner, holding.clone()).await?;
        Ok(holding)
    }

    /// Replace the quantity and cost of a holding; absent holdings are created
    pub async fn update_holding(
        &self,
        owner: &str,
        symbol: &str,
        quantity: &str,
        cost: &str,
    ) -> Result<Holding> {
        self.add_holding(owner, symbol, quantity, cost).await
    }

    /// Returns whether a holding was removed
    pub async fn remove_holding(&self, owner: &str, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol)?;
        self.store.remove(owner, &symbol).await
    }

    /// Latest quote per symbol derived from a short daily history.
    ///
    /// Symbols whose fetch fails or whose last close is unusable are omitted.
    pub async fn quotes(&self, symbols: &[String]) -> HashMap<String, Quote> {
        let mut quotes = HashMap::new();
        for symbol in symbols {
            match self.quote(symbol).await {
                Ok(Some(quote)) => {
                    quotes.insert(symbol.clone(), quote);
                }
                Ok(None) => warn!(%symbol, "No usable price for quote"),
                Err(e) => warn!(%symbol, error = %e, "Quote fetch failed"),
            }
        }
        quotes
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let series = self
            .history
            .fetch_history(symbol, self.config.quote_lookback_days, Period::Daily)
            .await?;

        let Some(last) = series.last().filter(|b| b.is_usable()) else {
            return Ok(None);
        };
        let change_pct = series
            .change_pct_at(series.len() - 1)
            .filter(|pct| pct.is_finite())
            .unwrap_or(0.0);

        Ok(Some(Quote {
            price: last.close,
            change_pct,
            name: self.history.display_name(symbol).await,
        }))
    }

    /// Value every holding of `owner` and consolidate into the reporting currency
    pub async fn overview(&self, owner: &str) -> Result<PortfolioOverview> {
        let holdings = self.store.list(owner).await?;
        let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
        let quotes = self.quotes(&symbols).await;

        let overview = consolidate(&holdings, &quotes, self.config.fx_rate);
        info!(
            owner,
            holdings = holdings.len(),
            quoted = quotes.len(),
            total_market_value = overview.total_market_value,
            "Consolidated portfolio"
        );
        Ok(overview)
    }

    /// Fetch, align and analyze the held symbols of `owner`.
    ///
    /// Zero-share holdings are skipped. When some fetches fail the analysis
    /// runs on the remainder; if that also fails, the error is wrapped in
    /// [`PortfolioError::PartialFetchFailure`] naming the dropped symbols.
    pub async fn analyze(&self, owner: &str) -> Result<PortfolioAnalysis> {
        let holdings = self.store.list(owner).await?;
        let shares: HashMap<String, u64> = holdings
            .iter()
            .filter(|h| h.shares > 0)
            .map(|h| (h.symbol.clone(), h.shares))
            .collect();

        let period = self.config.period;
        let mut fetched: Vec<PriceSeries> = Vec::with_capacity(shares.len());
        let mut dropped = Vec::new();

        for holding in holdings.iter().filter(|h| h.shares > 0) {
            match self.fetch(&holding.symbol, period).await {
                Ok(series) => fetched.push(series),
                Err(reason) => {
                    warn!(symbol = %holding.symbol, %reason, "Dropping symbol from analysis");
                    dropped.push(FetchFailure {
                        symbol: holding.symbol.clone(),
                        reason,
                    });
                }
            }
        }

        match self.compute(&fetched, &shares) {
            Ok(analytics) => {
                info!(
                    owner,
                    symbols = fetched.len(),
                    dropped = dropped.len(),
                    observations = analytics.observations,
                    total_return = analytics.total_return,
                    "Portfolio analysis complete"
                );
                Ok(PortfolioAnalysis {
                    analytics,
                    dropped,
                    period,
                })
            }
            Err(e) if dropped.is_empty() => Err(e.into()),
            Err(e) => Err(PortfolioError::PartialFetchFailure {
                dropped,
                source: Box::new(e.into()),
            }),
        }
    }

    /// History for one symbol, or the reason it must be excluded
    async fn fetch(
        &self,
        symbol: &str,
        period: Period,
    ) -> std::result::Result<PriceSeries, String> {
        debug!(%symbol, provider = self.history.name(), "Fetching history for analysis");
        match self
            .history
            .fetch_history(symbol, self.config.history_days, period)
            .await
        {
            Ok(series) if series.bars().iter().any(|b| b.is_usable()) => Ok(series),
            Ok(_) => Err("No usable price history".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn compute(
        &self,
        fetched: &[PriceSeries],
        shares: &HashMap<String, u64>,
    ) -> std::result::Result<AnalyticsResult, AnalysisError> {
        let matrix = align(fetched)?;
        analyze(&matrix, shares, &self.config.analytics_params())
    }
}
