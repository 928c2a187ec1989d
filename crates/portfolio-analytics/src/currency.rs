//! Holding valuation and multi-currency consolidation
//!
//! Holdings are valued in their own market's currency, summed per currency
//! bucket, and the domestic bucket is converted into the foreign reporting
//! currency at a single fixed rate. There is no live FX lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::holding::Holding;
use crate::market::Currency;

/// Latest price snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    /// Percent change versus the previous close (1.5 means +1.5%)
    pub change_pct: f64,
    pub name: String,
}

/// Previous close implied by today's price and percent change.
///
/// Falls back to `price` for a −100% move where the inversion is undefined.
pub fn previous_close(price: f64, change_pct: f64) -> f64 {
    let factor = 1.0 + change_pct / 100.0;
    if factor == 0.0 { price } else { price / factor }
}

/// Profit or loss of the current session
pub fn day_pl(price: f64, change_pct: f64, shares: u64) -> f64 {
    (price - previous_close(price, change_pct)) * shares as f64
}

/// One holding valued at its latest quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub symbol: String,
    pub name: String,
    pub shares: u64,
    pub cost_basis: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub unrealized_pl: f64,
    pub unrealized_pl_pct: f64,
    pub day_change_pct: f64,
    pub day_pl: f64,
    pub currency: Currency,
    /// False when no quote could be obtained and the holding was valued at zero
    pub quote_available: bool,
}

impl HoldingValuation {
    pub fn new(holding: &Holding, quote: Option<&Quote>) -> Self {
        let (price, change_pct, name) = match quote {
            Some(q) => (q.price, q.change_pct, q.name.clone()),
            None => (0.0, 0.0, holding.symbol.clone()),
        };
        let market_value = price * holding.shares as f64;
        let cost_value = holding.cost_value();
        let unrealized_pl = market_value - cost_value;
        let unrealized_pl_pct = if cost_value == 0.0 {
            0.0
        } else {
            unrealized_pl / cost_value * 100.0
        };

        Self {
            symbol: holding.symbol.clone(),
            name,
            shares: holding.shares,
            cost_basis: holding.cost_basis,
            current_price: price,
            market_value,
            unrealized_pl,
            unrealized_pl_pct,
            day_change_pct: change_pct,
            day_pl: day_pl(price, change_pct, holding.shares),
            currency: holding.market().currency(),
            quote_available: quote.is_some(),
        }
    }

    fn cost_value(&self) -> f64 {
        self.cost_basis * self.shares as f64
    }
}

/// Sums of one currency bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTotals {
    pub market_value: f64,
    pub cost: f64,
    pub day_pl: f64,
}

impl CurrencyTotals {
    fn add(&mut self, valuation: &HoldingValuation) {
        self.market_value += valuation.market_value;
        self.cost += valuation.cost_value();
        self.day_pl += valuation.day_pl;
    }

    /// Convert into the reporting currency by dividing by `rate`
    fn converted(self, rate: f64) -> Self {
        Self {
            market_value: self.market_value / rate,
            cost: self.cost / rate,
            day_pl: self.day_pl / rate,
        }
    }
}

/// Consolidated portfolio snapshot in the reporting currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOverview {
    pub total_market_value: f64,
    pub total_cost: f64,
    pub total_pl: f64,
    pub total_pl_pct: f64,
    pub day_pl: f64,
    pub currency: Currency,
    /// Domestic currency units per reporting unit
    pub exchange_rate: f64,
    pub domestic: CurrencyTotals,
    pub foreign: CurrencyTotals,
    pub holdings: Vec<HoldingValuation>,
}

/// Value every holding and consolidate into the foreign reporting currency.
///
/// `fx_rate` is the number of domestic currency units per reporting unit
/// (e.g. 7.1 CNY per USD) and must be positive.
pub fn consolidate(
    holdings: &[Holding],
    quotes: &HashMap<String, Quote>,
    fx_rate: f64,
) -> PortfolioOverview {
    let mut domestic = CurrencyTotals::default();
    let mut foreign = CurrencyTotals::default();

    let valuations: Vec<HoldingValuation> = holdings
        .iter()
        .map(|h| HoldingValuation::new(h, quotes.get(&h.symbol)))
        .collect();

    for v in &valuations {
        match v.currency {
            Currency::Cny => domestic.add(v),
            Currency::Usd => foreign.add(v),
        }
    }

    let converted = domestic.converted(fx_rate);
    let total_market_value = foreign.market_value + converted.market_value;
    let total_cost = foreign.cost + converted.cost;
    let total_day_pl = foreign.day_pl + converted.day_pl;
    let total_pl = total_market_value - total_cost;
    let total_pl_pct = if total_cost == 0.0 {
        0.0
    } else {
        total_pl / total_cost * 100.0
    };

    debug!(
        holdings = valuations.len(),
        total_market_value, total_pl, fx_rate, "Consolidated portfolio overview"
    );

    PortfolioOverview {
        total_market_value,
        total_cost,
        total_pl,
        total_pl_pct,
        day_pl: total_day_pl,
        currency: Currency::Usd,
        exchange_rate: fx_rate,
        domestic,
        foreign,
        holdings: valuations,
    }
}
