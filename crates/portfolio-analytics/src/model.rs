//! Price data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One trading-period observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

impl PriceBar {
    /// Create a bar where every price field equals `close`
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
            amount: None,
            change_pct: None,
        }
    }

    /// Whether the close can take part in return computation
    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Ordered bars for one symbol, strictly increasing by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting by date and keeping the last bar for duplicate dates
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Percent change of bar `index`, falling back to the previous close.
    ///
    /// Returns `None` for the first bar when the source gave no percent change.
    pub fn change_pct_at(&self, index: usize) -> Option<f64> {
        let bar = self.bars.get(index)?;
        if let Some(pct) = bar.change_pct.filter(|p| p.is_finite()) {
            return Some(pct);
        }
        let prev = self.bars.get(index.checked_sub(1)?)?;
        if prev.is_usable() && bar.close.is_finite() {
            Some((bar.close / prev.close - 1.0) * 100.0)
        } else {
            None
        }
    }

    /// Keep only bars dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars.iter().filter(|b| b.date >= start).cloned().collect(),
        }
    }
}

/// Bar granularity requested from a history source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    /// Calendar days of history to request for a daily window of `days`.
    ///
    /// Coarser bars widen the window so enough returns remain after
    /// resampling: the default 400 days becomes 500 weekly and 2000 monthly.
    pub fn lookback_days(self, days: u32) -> u32 {
        match self {
            Self::Daily => days,
            Self::Weekly => days.saturating_mul(5) / 4,
            Self::Monthly => days.saturating_mul(5),
        }
    }

    /// Bars per year, used to annualize returns and volatility
    pub fn periods_per_year(self, trading_days_per_year: u32) -> u32 {
        match self {
            Self::Daily => trading_days_per_year,
            Self::Weekly => 52,
            Self::Monthly => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "d" => Ok(Self::Daily),
            "weekly" | "w" => Ok(Self::Weekly),
            "monthly" | "m" => Ok(Self::Monthly),
            other => Err(format!("unknown period '{other}'")),
        }
    }
}
