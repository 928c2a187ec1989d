//! Portfolio performance and risk statistics over an aligned matrix

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::align::AlignedMatrix;
use crate::error::{AnalysisError, Result};
use crate::stats;

/// Parameters of the statistics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsParams {
    /// Annual risk-free rate used by the Sharpe ratio
    pub risk_free_rate: f64,
    /// Periods per year used for annualisation
    pub trading_days_per_year: u32,
    /// Fewest return observations accepted
    pub min_return_observations: usize,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            trading_days_per_year: 252,
            min_return_observations: 10,
        }
    }
}

/// One point of the portfolio value curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Pairwise return correlations; `None` marks an undefined coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.matrix[i][j]
    }
}

/// Statistics of a portfolio over its aligned history.
///
/// Ratios are fractions (0.175 is 17.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Number of daily return observations
    pub observations: usize,
    pub value_series: Vec<ValuePoint>,
    pub correlation: CorrelationMatrix,
}

/// Daily portfolio value: Σ close × shares per row.
///
/// Symbols absent from `shares` contribute nothing.
pub fn portfolio_values(matrix: &AlignedMatrix, shares: &HashMap<String, u64>) -> Vec<ValuePoint> {
    let mut values = vec![0.0; matrix.len()];
    for (symbol, column) in matrix.columns() {
        let held = shares.get(symbol).copied().unwrap_or(0) as f64;
        for (total, close) in values.iter_mut().zip(column) {
            *total += close * held;
        }
    }
    matrix
        .dates()
        .iter()
        .zip(values)
        .map(|(&date, value)| ValuePoint { date, value })
        .collect()
}

/// Compute return, risk and correlation statistics for held `shares`.
pub fn analyze(
    matrix: &AlignedMatrix,
    shares: &HashMap<String, u64>,
    params: &AnalyticsParams,
) -> Result<AnalyticsResult> {
    if matrix.is_empty() {
        return Err(AnalysisError::NoOverlap);
    }

    let value_series = portfolio_values(matrix, shares);
    let values: Vec<f64> = value_series.iter().map(|p| p.value).collect();
    let returns = stats::pct_change(&values);

    if returns.len() < params.min_return_observations {
        return Err(AnalysisError::InsufficientData {
            observations: returns.len(),
            required: params.min_return_observations,
        });
    }

    let days = f64::from(params.trading_days_per_year);
    let first = values[0];
    let last = values[values.len() - 1];
    let total_return = last / first - 1.0;

    let years = returns.len() as f64 / days;
    let annualized_return = if years > 0.0 {
        (1.0 + total_return).powf(1.0 / years) - 1.0
    } else {
        0.0
    };

    let annualized_volatility = stats::sample_std(&returns).unwrap_or(0.0) * days.sqrt();
    let sharpe_ratio = if annualized_volatility == 0.0 {
        0.0
    } else {
        (annualized_return - params.risk_free_rate) / annualized_volatility
    };
    let max_drawdown = stats::max_drawdown(&values);
    let correlation = correlation_matrix(matrix);

    debug!(
        observations = returns.len(),
        total_return,
        annualized_volatility,
        sharpe_ratio,
        max_drawdown,
        "Computed portfolio analytics"
    );

    Ok(AnalyticsResult {
        total_return,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
        max_drawdown,
        observations: returns.len(),
        value_series,
        correlation,
    })
}

/// Pearson correlation of each symbol's own daily returns.
///
/// The diagonal is 1 unless the symbol's returns have zero variance, in which
/// case the whole row and column are undefined.
pub fn correlation_matrix(matrix: &AlignedMatrix) -> CorrelationMatrix {
    let returns: Vec<Vec<f64>> = matrix
        .columns()
        .map(|(_, column)| stats::pct_change(column))
        .collect();
    let defined: Vec<bool> = returns
        .iter()
        .map(|r| stats::sample_std(r).is_some_and(|s| s > 0.0))
        .collect();

    let n = returns.len();
    let mut grid = vec![vec![None; n]; n];
    for i in 0..n {
        if defined[i] {
            grid[i][i] = Some(1.0);
        }
        for j in (i + 1)..n {
            let r = stats::pearson(&returns[i], &returns[j]);
            grid[i][j] = r;
            grid[j][i] = r;
        }
    }

    CorrelationMatrix {
        symbols: matrix.symbols().to_vec(),
        matrix: grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::model::{PriceBar, PriceSeries};
    use chrono::Days;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::new(
            symbol,
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PriceBar::flat(start() + Days::new(i as u64), c))
                .collect(),
        )
    }

    fn shares(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(s, n)| ((*s).to_string(), *n)).collect()
    }

    fn relaxed() -> AnalyticsParams {
        AnalyticsParams {
            min_return_observations: 1,
            ..AnalyticsParams::default()
        }
    }

    #[test]
    fn test_two_symbol_value_series_and_total_return() {
        let a = series("A", &[10.0, 11.0, 12.0, 13.0]);
        let b = series("B", &[100.0, 90.0, 95.0, 105.0]);
        let matrix = align([&a, &b]).unwrap();

        let result = analyze(&matrix, &shares(&[("A", 10), ("B", 1)]), &relaxed()).unwrap();
        let values: Vec<f64> = result.value_series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![200.0, 200.0, 215.0, 235.0]);
        assert!((result.total_return - 0.175).abs() < 1e-12);
        assert_eq!(result.observations, 3);
        assert_eq!(result.max_drawdown, 0.0);
    }

    #[test]
    fn test_insufficient_data_below_floor() {
        let a = series("A", &[10.0, 11.0, 12.0, 13.0]);
        let matrix = align([&a]).unwrap();
        assert_eq!(
            analyze(&matrix, &shares(&[("A", 1)]), &AnalyticsParams::default()),
            Err(AnalysisError::InsufficientData {
                observations: 3,
                required: 10
            })
        );
    }

    #[test]
    fn test_flat_portfolio_has_zero_sharpe() {
        let a = series("A", &[50.0; 15]);
        let matrix = align([&a]).unwrap();
        let result = analyze(&matrix, &shares(&[("A", 3)]), &AnalyticsParams::default()).unwrap();

        assert_eq!(result.annualized_volatility, 0.0);
        assert_eq!(result.sharpe_ratio, 0.0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.correlation.matrix, vec![vec![None]]);
    }

    #[test]
    fn test_drawdown_negative_after_peak() {
        let closes = [
            100.0, 102.0, 104.0, 110.0, 99.0, 101.0, 103.0, 105.0, 107.0, 109.0, 111.0, 112.0,
        ];
        let matrix = align([&series("A", &closes)]).unwrap();
        let result = analyze(&matrix, &shares(&[("A", 1)]), &AnalyticsParams::default()).unwrap();

        assert!((result.max_drawdown - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
        assert!(result.max_drawdown < 0.0);
        assert!(result.annualized_volatility > 0.0);
    }

    #[test]
    fn test_annualization() {
        // 12 observations of +1% each
        let closes: Vec<f64> = (0..13).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let matrix = align([&series("A", &closes)]).unwrap();
        let params = AnalyticsParams::default();
        let result = analyze(&matrix, &shares(&[("A", 1)]), &params).unwrap();

        let total = 1.01_f64.powi(12) - 1.0;
        let expected = (1.0 + total).powf(252.0 / 12.0) - 1.0;
        assert!((result.total_return - total).abs() < 1e-9);
        assert!((result.annualized_return - expected).abs() < 1e-6);
        // Constant returns: volatility is numerically ~0
        assert!(result.annualized_volatility < 1e-9);
    }

    #[test]
    fn test_sharpe_uses_risk_free_rate() {
        let closes = [
            100.0, 101.0, 99.5, 102.0, 103.5, 101.0, 104.0, 106.0, 105.0, 107.5, 108.0, 110.0,
        ];
        let matrix = align([&series("A", &closes)]).unwrap();
        let params = AnalyticsParams::default();
        let result = analyze(&matrix, &shares(&[("A", 2)]), &params).unwrap();

        let expected =
            (result.annualized_return - params.risk_free_rate) / result.annualized_volatility;
        assert!((result.sharpe_ratio - expected).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_matrix() {
        let a = series("A", &[10.0, 11.0, 10.5, 12.0, 11.0]);
        let b = series("B", &[20.0, 22.0, 21.0, 24.0, 22.0]);
        let c = series("C", &[5.0, 5.0, 5.0, 5.0, 5.0]);
        let matrix = align([&a, &b, &c]).unwrap();

        let corr = correlation_matrix(&matrix);
        assert_eq!(corr.symbols, vec!["A", "B", "C"]);
        assert_eq!(corr.get("A", "A"), Some(1.0));
        assert!((corr.get("A", "B").unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.get("A", "B"), corr.get("B", "A"));
        assert_eq!(corr.get("C", "C"), None);
        assert_eq!(corr.get("A", "C"), None);
    }

    #[test]
    fn test_unheld_symbol_contributes_nothing() {
        let a = series("A", &[10.0, 20.0]);
        let b = series("B", &[1.0, 1.0]);
        let matrix = align([&a, &b]).unwrap();
        let values = portfolio_values(&matrix, &shares(&[("B", 4)]));
        assert_eq!(values[0].value, 4.0);
        assert_eq!(values[1].value, 4.0);
    }
}
