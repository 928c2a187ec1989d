//! In-memory history provider backed by preloaded bars

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use portfolio_analytics::{Period, PriceBar, PriceSeries, normalize_symbol, resample};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::HistoryProvider;
use crate::error::{PortfolioError, Result};

/// Bar as written in a price file; missing OHLC fields default to the close
#[derive(Debug, Deserialize)]
struct FileBar {
    date: NaiveDate,
    close: f64,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    #[serde(default)]
    volume: f64,
    amount: Option<f64>,
    change_pct: Option<f64>,
}

impl From<FileBar> for PriceBar {
    fn from(b: FileBar) -> Self {
        PriceBar {
            date: b.date,
            open: b.open.unwrap_or(b.close),
            high: b.high.unwrap_or(b.close),
            low: b.low.unwrap_or(b.close),
            close: b.close,
            volume: b.volume,
            amount: b.amount,
            change_pct: b.change_pct,
        }
    }
}

/// Serves histories from memory.
///
/// The `days` window is measured back from each symbol's latest bar, so
/// recorded data stays usable regardless of the current date.
#[derive(Debug, Clone, Default)]
pub struct StaticHistoryProvider {
    series: HashMap<String, PriceSeries>,
    names: HashMap<String, String>,
    failures: HashMap<String, String>,
}

impl StaticHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bars served for `symbol`
    pub fn with_series(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        let symbol = symbol.to_uppercase();
        self.series
            .insert(symbol.clone(), PriceSeries::new(symbol, bars));
        self
    }

    /// Set the display name reported for `symbol`
    pub fn with_name(mut self, symbol: &str, name: impl Into<String>) -> Self {
        self.names.insert(symbol.to_uppercase(), name.into());
        self
    }

    /// Make every fetch of `symbol` fail with `reason`
    pub fn with_failure(mut self, symbol: &str, reason: impl Into<String>) -> Self {
        self.failures.insert(symbol.to_uppercase(), reason.into());
        self
    }

    /// Parse `{"SYMBOL": [{"date": "2024-01-02", "close": 10.0, ...}, ...]}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<FileBar>> = serde_json::from_str(json)?;
        let mut provider = Self::new();
        for (symbol, bars) in raw {
            let symbol = normalize_symbol(&symbol)?;
            let bars = bars.into_iter().map(PriceBar::from).collect();
            provider = provider.with_series(&symbol, bars);
        }
        Ok(provider)
    }

    /// Load a price file in the format accepted by [`Self::from_json_str`]
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&content)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

#[async_trait]
impl HistoryProvider for StaticHistoryProvider {
    async fn fetch_history(&self, symbol: &str, days: u32, period: Period) -> Result<PriceSeries> {
        let symbol = symbol.to_uppercase();
        if let Some(reason) = self.failures.get(&symbol) {
            return Err(PortfolioError::DataUnavailable {
                symbol,
                reason: reason.clone(),
            });
        }

        let series = self
            .series
            .get(&symbol)
            .ok_or_else(|| PortfolioError::DataUnavailable {
                symbol: symbol.clone(),
                reason: "No recorded history".to_string(),
            })?;

        let window = match series.last() {
            Some(last) => {
                let lookback = Days::new(u64::from(period.lookback_days(days)));
                let start = last.date.checked_sub_days(lookback).unwrap_or(NaiveDate::MIN);
                series.since(start)
            }
            None => series.clone(),
        };

        debug!(%symbol, bars = window.len(), %period, "Serving recorded history");
        Ok(resample(&window, period))
    }

    async fn display_name(&self, symbol: &str) -> String {
        self.names
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
