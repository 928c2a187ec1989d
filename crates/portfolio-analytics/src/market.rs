//! Market and currency classification of symbols

use serde::{Deserialize, Serialize};
use std::fmt;

/// Market a symbol trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Purely numeric exchange codes (e.g. `600519`)
    Domestic,
    /// Everything else (e.g. `AAPL`)
    Foreign,
}

/// Currency bucket a holding is valued in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cny,
    Usd,
}

impl Market {
    pub fn currency(self) -> Currency {
        match self {
            Self::Domestic => Currency::Cny,
            Self::Foreign => Currency::Usd,
        }
    }
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Cny => "CNY",
            Self::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify a symbol by its shape: digits only means domestic.
///
/// Exchange-suffixed tickers such as `600519.SS` contain a non-digit and are
/// therefore classified as foreign.
pub fn classify_market(symbol: &str) -> Market {
    let symbol = symbol.trim();
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
        Market::Domestic
    } else {
        Market::Foreign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_symbols_are_domestic() {
        assert_eq!(classify_market("600519"), Market::Domestic);
        assert_eq!(classify_market("000001"), Market::Domestic);
        assert_eq!(classify_market(" 300750 "), Market::Domestic);
    }

    #[test]
    fn test_other_symbols_are_foreign() {
        assert_eq!(classify_market("AAPL"), Market::Foreign);
        assert_eq!(classify_market("BRK.B"), Market::Foreign);
        assert_eq!(classify_market("600519.SS"), Market::Foreign);
        assert_eq!(classify_market(""), Market::Foreign);
    }

    #[test]
    fn test_currency_mapping() {
        assert_eq!(Market::Domestic.currency(), Currency::Cny);
        assert_eq!(Market::Foreign.currency(), Currency::Usd);
        assert_eq!(Currency::Usd.to_string(), "USD");
    }
}
