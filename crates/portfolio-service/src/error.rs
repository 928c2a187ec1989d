//! Error types for portfolio service operations

use portfolio_analytics::{AnalysisError, HoldingError};
use serde::Serialize;
use thiserror::Error;

/// A symbol excluded from an analysis because its history could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub symbol: String,
    pub reason: String,
}

/// Portfolio service errors
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// Alignment or analytics failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Some histories could not be fetched and the remainder could not be analysed
    #[error("{source} (dropped: {})", symbols(.dropped))]
    PartialFetchFailure {
        dropped: Vec<FetchFailure>,
        source: Box<PortfolioError>,
    },

    /// Rejected user input
    #[error("Validation error: {0}")]
    Validation(#[from] HoldingError),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// A collaborator call exceeded its deadline
    #[error("Timed out after {seconds}s fetching {symbol}")]
    Timeout { symbol: String, seconds: u64 },

    /// Holdings persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Text generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Flat classification of [`PortfolioError`] for request boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    NoOverlap,
    InsufficientData,
    PartialFetchFailure,
    Validation,
    Unavailable,
    Storage,
    Generation,
    Config,
    Internal,
}

fn symbols(dropped: &[FetchFailure]) -> String {
    dropped
        .iter()
        .map(|f| f.symbol.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PortfolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Analysis(AnalysisError::EmptyInput) => ErrorKind::EmptyInput,
            Self::Analysis(AnalysisError::NoOverlap) => ErrorKind::NoOverlap,
            Self::Analysis(AnalysisError::InsufficientData { .. }) => ErrorKind::InsufficientData,
            Self::PartialFetchFailure { .. } => ErrorKind::PartialFetchFailure,
            Self::Validation(_) => ErrorKind::Validation,
            Self::DataUnavailable { .. } | Self::YahooFinanceError(_) | Self::Timeout { .. } => {
                ErrorKind::Unavailable
            }
            Self::Storage(_) | Self::Io(_) => ErrorKind::Storage,
            Self::Generation(_) => ErrorKind::Generation,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::JsonError(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// Symbols dropped before the failure, if any
    pub fn dropped(&self) -> &[FetchFailure] {
        match self {
            Self::PartialFetchFailure { dropped, .. } => dropped,
            _ => &[],
        }
    }

    /// The analysis failure behind this error, looking through partial fetch failures
    pub fn analysis_error(&self) -> Option<&AnalysisError> {
        match self {
            Self::Analysis(e) => Some(e),
            Self::PartialFetchFailure { source, .. } => source.analysis_error(),
            _ => None,
        }
    }
}

/// Result type alias for portfolio operations
pub type Result<T> = std::result::Result<T, PortfolioError>;

impl From<portfolio_utils::EnvError> for PortfolioError {
    fn from(err: portfolio_utils::EnvError) -> Self {
        PortfolioError::ConfigError(err.to_string())
    }
}

/// Convert anyhow::Error to PortfolioError
impl From<anyhow::Error> for PortfolioError {
    fn from(err: anyhow::Error) -> Self {
        PortfolioError::Other(err.to_string())
    }
}
