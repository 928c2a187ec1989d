//! Error types for alignment and analytics

use thiserror::Error;

/// Result type alias for analytics operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures of the alignment and analytics pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// No symbol produced any usable price data
    #[error("No price data available for any symbol")]
    EmptyInput,

    /// Symbols have data but share no common date range
    #[error("Price histories share no overlapping date range")]
    NoOverlap,

    /// Overlap exists but holds too few return observations
    #[error("Insufficient data: {observations} return observations, at least {required} required")]
    InsufficientData { observations: usize, required: usize },
}
