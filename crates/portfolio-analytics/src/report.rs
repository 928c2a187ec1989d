//! Presentation payload for analytics results
//!
//! All floats leave through [`finite`], so NaN and infinities serialize as
//! `null` instead of producing invalid JSON.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::AnalyticsResult;

/// `Some(x)` for finite `x`, otherwise `None`
pub fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsPayload {
    pub total_return_pct: Option<f64>,
    pub annual_return_pct: Option<f64>,
    pub volatility_pct: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub time: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPayload {
    pub symbols: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

/// Serialized form of an [`AnalyticsResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub metrics: MetricsPayload,
    pub chart_data: Vec<ChartPoint>,
    pub correlation: CorrelationPayload,
    pub period_days: usize,
    /// Symbols excluded because their history could not be fetched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_symbols: Vec<String>,
}

impl AnalysisReport {
    pub fn with_dropped(mut self, dropped: Vec<String>) -> Self {
        self.dropped_symbols = dropped;
        self
    }
}

impl From<&AnalyticsResult> for AnalysisReport {
    fn from(result: &AnalyticsResult) -> Self {
        Self {
            metrics: MetricsPayload {
                total_return_pct: finite(result.total_return * 100.0),
                annual_return_pct: finite(result.annualized_return * 100.0),
                volatility_pct: finite(result.annualized_volatility * 100.0),
                sharpe_ratio: finite(result.sharpe_ratio),
                max_drawdown_pct: finite(result.max_drawdown * 100.0),
            },
            chart_data: result
                .value_series
                .iter()
                .map(|p| ChartPoint {
                    time: p.date,
                    value: finite(p.value),
                })
                .collect(),
            correlation: CorrelationPayload {
                symbols: result.correlation.symbols.clone(),
                matrix: result
                    .correlation
                    .matrix
                    .iter()
                    .map(|row| row.iter().map(|c| c.and_then(finite)).collect())
                    .collect(),
            },
            period_days: result.observations,
            dropped_symbols: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{CorrelationMatrix, ValuePoint};
    use serde_json::json;

    fn result() -> AnalyticsResult {
        AnalyticsResult {
            total_return: 0.175,
            annualized_return: f64::INFINITY,
            annualized_volatility: 0.2,
            sharpe_ratio: f64::NAN,
            max_drawdown: -0.05,
            observations: 3,
            value_series: vec![ValuePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                value: 200.0,
            }],
            correlation: CorrelationMatrix {
                symbols: vec!["A".to_string(), "B".to_string()],
                matrix: vec![vec![Some(1.0), None], vec![None, Some(f64::NAN)]],
            },
        }
    }

    #[test]
    fn test_non_finite_values_become_null() {
        let report = AnalysisReport::from(&result());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["metrics"]["annual_return_pct"], json!(null));
        assert_eq!(value["metrics"]["sharpe_ratio"], json!(null));
        assert_eq!(value["correlation"]["matrix"], json!([[1.0, null], [null, null]]));
    }

    #[test]
    fn test_payload_shape() {
        let report = AnalysisReport::from(&result()).with_dropped(vec!["MSFT".to_string()]);
        let value = serde_json::to_value(&report).unwrap();

        assert!((value["metrics"]["total_return_pct"].as_f64().unwrap() - 17.5).abs() < 1e-9);
        assert_eq!(value["metrics"]["max_drawdown_pct"], json!(-5.0));
        assert_eq!(value["chart_data"], json!([{"time": "2024-01-02", "value": 200.0}]));
        assert_eq!(value["period_days"], json!(3));
        assert_eq!(value["dropped_symbols"], json!(["MSFT"]));
    }

    #[test]
    fn test_dropped_symbols_omitted_when_empty() {
        let value = serde_json::to_value(AnalysisReport::from(&result())).unwrap();
        assert!(value.get("dropped_symbols").is_none());
    }
}
