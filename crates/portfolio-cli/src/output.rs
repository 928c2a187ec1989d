//! Table rendering for command output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use portfolio_analytics::{AnalysisReport, Holding, PortfolioOverview, finite};
use portfolio_service::{ErrorKind, FetchFailure, PortfolioError};
use serde::Serialize;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Two decimals, or `n/a` for undefined values
fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"))
}

pub fn holdings_table(holdings: &[Holding]) -> Table {
    let mut table = table(vec!["Symbol", "Market", "Shares", "Cost basis", "Cost value"]);
    for h in holdings {
        table.add_row(vec![
            h.symbol.clone(),
            h.market().currency().to_string(),
            h.shares.to_string(),
            num(finite(h.cost_basis)),
            num(finite(h.cost_value())),
        ]);
    }
    table
}

pub fn overview_tables(overview: &PortfolioOverview) -> (Table, Table) {
    let mut holdings = table(vec![
        "Symbol", "Name", "Shares", "Price", "Value", "P&L", "P&L %", "Day %", "Day P&L", "CCY",
    ]);
    for v in &overview.holdings {
        let price = if v.quote_available {
            num(finite(v.current_price))
        } else {
            "n/a".to_string()
        };
        holdings.add_row(vec![
            v.symbol.clone(),
            v.name.clone(),
            v.shares.to_string(),
            price,
            num(finite(v.market_value)),
            num(finite(v.unrealized_pl)),
            pct(finite(v.unrealized_pl_pct)),
            pct(finite(v.day_change_pct)),
            num(finite(v.day_pl)),
            v.currency.to_string(),
        ]);
    }

    let mut totals = table(vec!["Total", "Value", "Cost", "Day P&L"]);
    totals.add_row(vec![
        "Domestic (CNY)".to_string(),
        num(finite(overview.domestic.market_value)),
        num(finite(overview.domestic.cost)),
        num(finite(overview.domestic.day_pl)),
    ]);
    totals.add_row(vec![
        "Foreign (USD)".to_string(),
        num(finite(overview.foreign.market_value)),
        num(finite(overview.foreign.cost)),
        num(finite(overview.foreign.day_pl)),
    ]);
    totals.add_row(vec![
        format!("Consolidated ({}, rate {})", overview.currency, overview.exchange_rate),
        num(finite(overview.total_market_value)),
        num(finite(overview.total_cost)),
        num(finite(overview.day_pl)),
    ]);
    totals.add_row(vec![
        "Unrealized P&L".to_string(),
        num(finite(overview.total_pl)),
        pct(finite(overview.total_pl_pct)),
        String::new(),
    ]);

    (holdings, totals)
}

pub fn analysis_tables(report: &AnalysisReport) -> (Table, Table) {
    let mut metrics = table(vec!["Metric", "Value"]);
    let m = &report.metrics;
    metrics.add_row(vec!["Total return".to_string(), pct(m.total_return_pct)]);
    metrics.add_row(vec!["Annualized return".to_string(), pct(m.annual_return_pct)]);
    metrics.add_row(vec!["Annualized volatility".to_string(), pct(m.volatility_pct)]);
    metrics.add_row(vec!["Sharpe ratio".to_string(), num(m.sharpe_ratio)]);
    metrics.add_row(vec!["Max drawdown".to_string(), pct(m.max_drawdown_pct)]);
    metrics.add_row(vec!["Return observations".to_string(), report.period_days.to_string()]);
    if !report.dropped_symbols.is_empty() {
        metrics.add_row(vec!["Dropped".to_string(), report.dropped_symbols.join(", ")]);
    }

    let symbols = &report.correlation.symbols;
    let mut header = vec![""];
    header.extend(symbols.iter().map(String::as_str));
    let mut correlation = table(header);
    for (symbol, row) in symbols.iter().zip(&report.correlation.matrix) {
        let mut cells = vec![symbol.clone()];
        cells.extend(row.iter().map(|c| num(*c)));
        correlation.add_row(cells);
    }

    (metrics, correlation)
}

/// Machine-readable form of a failed request
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<FetchFailure>,
}

impl From<&PortfolioError> for ErrorPayload {
    fn from(err: &PortfolioError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            dropped: err.dropped().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_analytics::AnalysisError;

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(Some(1.234)), "1.23");
        assert_eq!(num(None), "n/a");
        assert_eq!(pct(Some(17.5)), "17.50%");
    }

    #[test]
    fn test_holdings_table() {
        let rendered = holdings_table(&[Holding::new("600519", 10, 1500.0)]).to_string();
        assert!(rendered.contains("600519"));
        assert!(rendered.contains("CNY"));
        assert!(rendered.contains("15000.00"));
    }

    #[test]
    fn test_error_payload() {
        let err = PortfolioError::PartialFetchFailure {
            dropped: vec![FetchFailure {
                symbol: "MSFT".to_string(),
                reason: "down".to_string(),
            }],
            source: Box::new(AnalysisError::NoOverlap.into()),
        };
        let json = serde_json::to_value(ErrorPayload::from(&err)).unwrap();
        assert_eq!(json["kind"], "partial_fetch_failure");
        assert_eq!(json["dropped"][0]["symbol"], "MSFT");

        let err = PortfolioError::from(AnalysisError::EmptyInput);
        let json = serde_json::to_value(ErrorPayload::from(&err)).unwrap();
        assert_eq!(json["kind"], "empty_input");
        assert!(json.get("dropped").is_none());
    }
}
