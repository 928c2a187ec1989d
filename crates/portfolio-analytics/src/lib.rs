//! Portfolio analytics core
//!
//! Pure, synchronous building blocks that turn per-symbol price histories into
//! a consolidated portfolio view:
//!
//! - [`align`]: forward-filled, fully overlapping close-price matrix
//! - [`analyze`]: total/annualized return, volatility, Sharpe ratio, maximum
//!   drawdown and the return correlation matrix
//! - [`consolidate`]: per-currency valuation of holdings converted into one
//!   reporting currency at a fixed rate
//! - [`resample`]: weekly and monthly bars from daily ones
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use portfolio_analytics::{AnalyticsParams, PriceBar, PriceSeries, align, analyze};
//! use std::collections::HashMap;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let bars = (0..30)
//!     .map(|i| PriceBar::flat(start + chrono::Days::new(i), 100.0 + (i % 7) as f64))
//!     .collect();
//! let series = PriceSeries::new("AAPL", bars);
//!
//! let matrix = align([&series]).unwrap();
//! let shares = HashMap::from([("AAPL".to_string(), 10)]);
//! let result = analyze(&matrix, &shares, &AnalyticsParams::default()).unwrap();
//! assert_eq!(result.observations, 29);
//! ```

pub mod align;
pub mod analytics;
pub mod currency;
pub mod error;
pub mod holding;
pub mod market;
pub mod model;
pub mod report;
pub mod resample;
pub mod stats;

pub use align::{AlignedMatrix, align};
pub use analytics::{
    AnalyticsParams, AnalyticsResult, CorrelationMatrix, ValuePoint, analyze, correlation_matrix,
    portfolio_values,
};
pub use currency::{
    CurrencyTotals, HoldingValuation, PortfolioOverview, Quote, consolidate, day_pl,
    previous_close,
};
pub use error::{AnalysisError, Result};
pub use holding::{Holding, HoldingError, normalize_symbol};
pub use market::{Currency, Market, classify_market};
pub use model::{Period, PriceBar, PriceSeries};
pub use report::{AnalysisReport, finite};
pub use resample::resample;
