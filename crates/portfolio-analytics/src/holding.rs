//! Portfolio holdings and input validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::{Market, classify_market};

/// Rejected holding input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoldingError {
    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid quantity '{0}': expected a non-negative whole number")]
    InvalidQuantity(String),

    #[error("Invalid cost basis '{0}': expected a non-negative number")]
    InvalidCost(String),
}

/// A position held in one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: u64,
    pub cost_basis: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, shares: u64, cost_basis: f64) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            cost_basis,
        }
    }

    /// Validate raw user input into a holding.
    ///
    /// Quantities like `"100.0"` are accepted; fractional, negative or
    /// unparseable quantities are rejected rather than coerced to zero.
    pub fn parse(symbol: &str, quantity: &str, cost: &str) -> Result<Self, HoldingError> {
        let symbol = normalize_symbol(symbol)?;

        let raw = quantity.trim();
        let shares = match raw.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| HoldingError::InvalidQuantity(quantity.to_string()))?;
                if !value.is_finite()
                    || value < 0.0
                    || value.fract() != 0.0
                    || value > u64::MAX as f64
                {
                    return Err(HoldingError::InvalidQuantity(quantity.to_string()));
                }
                value as u64
            }
        };

        let cost_basis: f64 = cost
            .trim()
            .parse()
            .map_err(|_| HoldingError::InvalidCost(cost.to_string()))?;
        if !cost_basis.is_finite() || cost_basis < 0.0 {
            return Err(HoldingError::InvalidCost(cost.to_string()));
        }

        Ok(Self {
            symbol,
            shares,
            cost_basis,
        })
    }

    pub fn market(&self) -> Market {
        classify_market(&self.symbol)
    }

    /// Total cost of the position in its own currency
    pub fn cost_value(&self) -> f64 {
        self.cost_basis * self.shares as f64
    }
}

/// Trim and upper-case a symbol
pub fn normalize_symbol(symbol: &str) -> Result<String, HoldingError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(HoldingError::EmptySymbol);
    }
    Ok(symbol.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_input() {
        let holding = Holding::parse(" aapl ", "100.0", "150.25").unwrap();
        assert_eq!(holding.symbol, "AAPL");
        assert_eq!(holding.shares, 100);
        assert_eq!(holding.cost_basis, 150.25);
        assert_eq!(holding.market(), Market::Foreign);
    }

    #[test]
    fn test_parse_rejects_bad_quantities() {
        for bad in ["1.5", "-1", "abc", "", "NaN", "inf"] {
            assert_eq!(
                Holding::parse("AAPL", bad, "10"),
                Err(HoldingError::InvalidQuantity(bad.to_string())),
                "quantity {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_cost_and_symbol() {
        assert!(matches!(
            Holding::parse("AAPL", "10", "-3"),
            Err(HoldingError::InvalidCost(_))
        ));
        assert!(matches!(
            Holding::parse("AAPL", "10", "free"),
            Err(HoldingError::InvalidCost(_))
        ));
        assert_eq!(Holding::parse("  ", "10", "1"), Err(HoldingError::EmptySymbol));
    }

    #[test]
    fn test_zero_cost_allowed() {
        let holding = Holding::parse("600519", "5", "0").unwrap();
        assert_eq!(holding.cost_value(), 0.0);
        assert_eq!(holding.market(), Market::Domestic);
    }
}
