//! Series alignment onto a shared date index
//!
//! Per-symbol histories arrive with different lengths and trading calendars.
//! [`align`] builds one close-price column per symbol over the union of their
//! dates, forward-fills gaps from the most recent prior close, and drops the
//! leading rows in which some symbol had not started trading yet. Every row of
//! the resulting [`AlignedMatrix`] is complete.
//!
//! This differs from a plain inner join: a date on which only one symbol is
//! missing (a local holiday, an illiquid day, a provider hiccup) is kept with
//! that symbol's previous close instead of being discarded for the whole
//! portfolio.
//!
//! Two histories whose observed ranges do not intersect at all (one ends
//! before the other begins) are reported as [`AnalysisError::NoOverlap`]
//! rather than stitched together by carrying a stale close forward.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::model::PriceSeries;

/// Close prices of several symbols over one shared, ascending date index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedMatrix {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl AlignedMatrix {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of date rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Close-price column for `symbol`
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    /// `(symbol, column)` pairs in symbol order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}

/// Align per-symbol histories into a complete close-price matrix.
///
/// Column order follows input order; a repeated symbol keeps its first series.
/// Bars whose close is not a positive finite number are treated as missing.
pub fn align<'a, I>(series: I) -> Result<AlignedMatrix>
where
    I: IntoIterator<Item = &'a PriceSeries>,
{
    let mut seen = HashSet::new();
    let mut observed: Vec<(String, Vec<(NaiveDate, f64)>)> = Vec::new();

    for s in series {
        if !seen.insert(s.symbol().to_string()) {
            warn!(symbol = s.symbol(), "Duplicate series ignored during alignment");
            continue;
        }
        let points: Vec<(NaiveDate, f64)> = s
            .bars()
            .iter()
            .filter(|b| b.is_usable())
            .map(|b| (b.date, b.close))
            .collect();
        observed.push((s.symbol().to_string(), points));
    }

    if observed.iter().all(|(_, points)| points.is_empty()) {
        return Err(AnalysisError::EmptyInput);
    }
    if let Some((symbol, _)) = observed.iter().find(|(_, points)| points.is_empty()) {
        debug!(%symbol, "Symbol has no usable closes, nothing can overlap");
        return Err(AnalysisError::NoOverlap);
    }

    let latest_start = observed
        .iter()
        .filter_map(|(_, p)| p.first().map(|(d, _)| *d))
        .max()
        .ok_or(AnalysisError::EmptyInput)?;
    let earliest_end = observed
        .iter()
        .filter_map(|(_, p)| p.last().map(|(d, _)| *d))
        .min()
        .ok_or(AnalysisError::EmptyInput)?;
    if latest_start > earliest_end {
        debug!(%latest_start, %earliest_end, "Observed ranges are disjoint");
        return Err(AnalysisError::NoOverlap);
    }

    let dates: Vec<NaiveDate> = observed
        .iter()
        .flat_map(|(_, p)| p.iter().map(|(d, _)| *d))
        .filter(|d| *d >= latest_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut symbols = Vec::with_capacity(observed.len());
    let mut columns = Vec::with_capacity(observed.len());
    for (symbol, points) in observed {
        columns.push(forward_fill(&points, &dates));
        symbols.push(symbol);
    }

    debug!(
        symbols = symbols.len(),
        rows = dates.len(),
        start = %latest_start,
        "Aligned price matrix"
    );

    Ok(AlignedMatrix {
        dates,
        symbols,
        columns,
    })
}

/// Value at each date of `index` taken from the latest point on or before it.
///
/// Every date in `index` must be on or after the first point.
fn forward_fill(points: &[(NaiveDate, f64)], index: &[NaiveDate]) -> Vec<f64> {
    let mut out = Vec::with_capacity(index.len());
    let mut cursor = 0;
    let mut last = f64::NAN;
    for date in index {
        while cursor < points.len() && points[cursor].0 <= *date {
            last = points[cursor].1;
            cursor += 1;
        }
        out.push(last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PriceBar;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(symbol: &str, points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::new(
            symbol,
            points.iter().map(|&(d, c)| PriceBar::flat(day(d), c)).collect(),
        )
    }

    #[test]
    fn test_forward_fills_interior_gaps() {
        let a = series("AAPL", &[(1, 10.0), (2, 11.0), (3, 12.0), (6, 13.0)]);
        let b = series("600519", &[(1, 100.0), (3, 95.0), (6, 105.0)]);

        let matrix = align([&a, &b]).unwrap();
        assert_eq!(matrix.dates(), &[day(1), day(2), day(3), day(6)]);
        assert_eq!(matrix.column("600519").unwrap(), &[100.0, 100.0, 95.0, 105.0]);
        assert_eq!(matrix.column("AAPL").unwrap(), &[10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_drops_leading_rows_before_late_listing() {
        let old = series("OLD", &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let new = series("NEW", &[(3, 30.0), (4, 40.0)]);

        let matrix = align([&old, &new]).unwrap();
        assert_eq!(matrix.dates(), &[day(3), day(4)]);
        assert_eq!(matrix.column("OLD").unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn test_trailing_gap_is_filled() {
        let a = series("A", &[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let b = series("B", &[(1, 5.0), (2, 6.0)]);

        let matrix = align([&a, &b]).unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.column("B").unwrap(), &[5.0, 6.0, 6.0]);
    }

    #[test]
    fn test_columns_share_the_date_index() {
        let a = series("A", &[(1, 1.0), (4, 2.0), (9, 3.0)]);
        let b = series("B", &[(2, 5.0), (3, 6.0), (8, 7.0)]);
        let c = series("C", &[(2, 9.0), (5, 8.0), (9, 7.0)]);

        let matrix = align([&a, &b, &c]).unwrap();
        for (_, column) in matrix.columns() {
            assert_eq!(column.len(), matrix.len());
            assert!(column.iter().all(|v| v.is_finite() && *v > 0.0));
        }
        assert_eq!(matrix.symbols(), &["A", "B", "C"]);
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let a = series("A", &[(1, 1.0), (2, 2.0)]);
        let b = series("B", &[(5, 5.0), (6, 6.0)]);
        assert_eq!(align([&a, &b]), Err(AnalysisError::NoOverlap));
    }

    #[test]
    fn test_symbol_without_usable_closes_does_not_overlap() {
        let a = series("A", &[(1, 1.0), (2, 2.0)]);
        let b = series("B", &[(1, 0.0), (2, -1.0)]);
        assert_eq!(align([&a, &b]), Err(AnalysisError::NoOverlap));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(align(std::iter::empty()), Err(AnalysisError::EmptyInput));
        let empty = series("A", &[]);
        assert_eq!(align([&empty]), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn test_unusable_closes_are_filled_over() {
        let a = series("A", &[(1, 10.0), (2, f64::NAN), (3, 12.0)]);
        let b = series("B", &[(1, 1.0), (2, 1.0), (3, 1.0)]);

        let matrix = align([&a, &b]).unwrap();
        assert_eq!(matrix.column("A").unwrap(), &[10.0, 10.0, 12.0]);
    }

    #[test]
    fn test_alignment_is_idempotent() {
        let a = series("A", &[(1, 1.0), (3, 2.0), (4, 3.0)]);
        let b = series("B", &[(2, 5.0), (3, 6.0), (4, 7.0)]);
        assert_eq!(align([&a, &b]).unwrap(), align([&a, &b]).unwrap());
    }

    #[test]
    fn test_duplicate_symbol_keeps_first() {
        let a = series("A", &[(1, 1.0), (2, 2.0)]);
        let dup = series("A", &[(1, 100.0), (2, 200.0)]);
        let matrix = align([&a, &dup]).unwrap();
        assert_eq!(matrix.symbols().len(), 1);
        assert_eq!(matrix.column("A").unwrap(), &[1.0, 2.0]);
    }
}
