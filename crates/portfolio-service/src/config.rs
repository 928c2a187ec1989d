//! Configuration for portfolio operations

use crate::error::{PortfolioError, Result};
use portfolio_analytics::{AnalyticsParams, Period};
use portfolio_utils::env_parse;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for portfolio analysis and consolidation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Annual risk-free rate for the Sharpe ratio
    pub risk_free_rate: f64,

    /// Trading days per year; daily bars annualise with this, weekly and
    /// monthly bars with 52 and 12
    pub trading_days_per_year: u32,

    /// Domestic currency units per reporting-currency unit
    pub fx_rate: f64,

    /// Calendar-day history window at daily granularity; widened for
    /// weekly (x1.25) and monthly (x5) bars
    pub history_days: u32,

    /// Bar granularity of the analysed history
    pub period: Period,

    /// Fewest daily returns accepted by the analytics engine
    pub min_return_observations: usize,

    /// Window fetched to derive the latest quote
    pub quote_lookback_days: u32,

    /// Per-attempt deadline for one history fetch
    pub request_timeout: Duration,

    /// Maximum number of attempts for a history fetch
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Rate limit applied to the market data provider
    pub requests_per_minute: u32,

    /// Lifetime of cached company summaries
    pub summary_cache_ttl: Duration,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            trading_days_per_year: 252,
            fx_rate: 7.1,
            history_days: 400,
            period: Period::Daily,
            min_return_observations: 10,
            quote_lookback_days: 5,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            requests_per_minute: 120,
            summary_cache_ttl: Duration::from_secs(24 * 3600), // 1 day
        }
    }
}

impl PortfolioConfig {
    /// Create a new configuration builder
    pub fn builder() -> PortfolioConfigBuilder {
        PortfolioConfigBuilder::default()
    }

    /// Overlay values from `PORTFOLIO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Parameters handed to the analytics engine, annualized per `period` bar
    pub fn analytics_params(&self) -> AnalyticsParams {
        AnalyticsParams {
            risk_free_rate: self.risk_free_rate,
            trading_days_per_year: self.period.periods_per_year(self.trading_days_per_year),
            min_return_observations: self.min_return_observations,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.fx_rate.is_finite() || self.fx_rate <= 0.0 {
            return Err(PortfolioError::ConfigError(
                "fx_rate must be a positive number".to_string(),
            ));
        }

        if !self.risk_free_rate.is_finite() {
            return Err(PortfolioError::ConfigError(
                "risk_free_rate must be finite".to_string(),
            ));
        }

        if self.trading_days_per_year == 0 {
            return Err(PortfolioError::ConfigError(
                "trading_days_per_year must be greater than 0".to_string(),
            ));
        }

        if self.history_days == 0 || self.quote_lookback_days == 0 {
            return Err(PortfolioError::ConfigError(
                "history windows must be greater than 0".to_string(),
            ));
        }

        if self.min_return_observations < 2 {
            return Err(PortfolioError::ConfigError(
                "min_return_observations must be at least 2".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(PortfolioError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.requests_per_minute == 0 {
            return Err(PortfolioError::ConfigError(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.saturating_pow(attempt)
    }
}

/// Builder for PortfolioConfig
#[derive(Debug, Default)]
pub struct PortfolioConfigBuilder {
    risk_free_rate: Option<f64>,
    trading_days_per_year: Option<u32>,
    fx_rate: Option<f64>,
    history_days: Option<u32>,
    period: Option<Period>,
    min_return_observations: Option<usize>,
    quote_lookback_days: Option<u32>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    requests_per_minute: Option<u32>,
    summary_cache_ttl: Option<Duration>,
}

impl PortfolioConfigBuilder {
    /// Set the annual risk-free rate
    pub fn risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = Some(rate);
        self
    }

    /// Set the annualisation period count
    pub fn trading_days_per_year(mut self, days: u32) -> Self {
        self.trading_days_per_year = Some(days);
        self
    }

    /// Set the fixed exchange rate
    pub fn fx_rate(mut self, rate: f64) -> Self {
        self.fx_rate = Some(rate);
        self
    }

    /// Set the history window
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the bar granularity
    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Set the minimum number of return observations
    pub fn min_return_observations(mut self, count: usize) -> Self {
        self.min_return_observations = Some(count);
        self
    }

    /// Set the quote lookback window
    pub fn quote_lookback_days(mut self, days: u32) -> Self {
        self.quote_lookback_days = Some(days);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set the provider rate limit
    pub fn requests_per_minute(mut self, limit: u32) -> Self {
        self.requests_per_minute = Some(limit);
        self
    }

    /// Set summary cache lifetime
    pub fn summary_cache_ttl(mut self, duration: Duration) -> Self {
        self.summary_cache_ttl = Some(duration);
        self
    }

    /// Load overrides from `PORTFOLIO_*` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(v) = env_parse("PORTFOLIO_RISK_FREE_RATE")? {
            self.risk_free_rate = Some(v);
        }
        if let Some(v) = env_parse("PORTFOLIO_TRADING_DAYS")? {
            self.trading_days_per_year = Some(v);
        }
        if let Some(v) = env_parse("PORTFOLIO_FX_RATE")? {
            self.fx_rate = Some(v);
        }
        if let Some(v) = env_parse("PORTFOLIO_HISTORY_DAYS")? {
            self.history_days = Some(v);
        }
        if let Some(v) = env_parse("PORTFOLIO_PERIOD")? {
            self.period = Some(v);
        }
        if let Some(secs) = env_parse("PORTFOLIO_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(v) = env_parse("PORTFOLIO_MAX_RETRIES")? {
            self.max_retries = Some(v);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<PortfolioConfig> {
        let defaults = PortfolioConfig::default();

        let config = PortfolioConfig {
            risk_free_rate: self.risk_free_rate.unwrap_or(defaults.risk_free_rate),
            trading_days_per_year: self
                .trading_days_per_year
                .unwrap_or(defaults.trading_days_per_year),
            fx_rate: self.fx_rate.unwrap_or(defaults.fx_rate),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            period: self.period.unwrap_or(defaults.period),
            min_return_observations: self
                .min_return_observations
                .unwrap_or(defaults.min_return_observations),
            quote_lookback_days: self.quote_lookback_days.unwrap_or(defaults.quote_lookback_days),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            requests_per_minute: self.requests_per_minute.unwrap_or(defaults.requests_per_minute),
            summary_cache_ttl: self.summary_cache_ttl.unwrap_or(defaults.summary_cache_ttl),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortfolioConfig::default();
        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.trading_days_per_year, 252);
        assert_eq!(config.fx_rate, 7.1);
        assert_eq!(config.history_days, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PortfolioConfig::builder()
            .fx_rate(7.2)
            .period(Period::Weekly)
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.fx_rate, 7.2);
        assert_eq!(config.period, Period::Weekly);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation_rejects_bad_fx_rate() {
        for rate in [0.0, -7.1, f64::NAN] {
            let config = PortfolioConfig {
                fx_rate: rate,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_validation_rejects_zero_windows() {
        assert!(PortfolioConfig::builder().trading_days_per_year(0).build().is_err());
        assert!(PortfolioConfig::builder().history_days(0).build().is_err());
        assert!(PortfolioConfig::builder().min_return_observations(1).build().is_err());
    }

    #[test]
    fn test_analytics_params() {
        let params = PortfolioConfig::builder()
            .risk_free_rate(0.05)
            .build()
            .unwrap()
            .analytics_params();
        assert_eq!(params.risk_free_rate, 0.05);
        assert_eq!(params.trading_days_per_year, 252);
        assert_eq!(params.min_return_observations, 10);
    }

    #[test]
    fn test_analytics_params_follow_period() {
        for (period, expected) in [(Period::Weekly, 52), (Period::Monthly, 12)] {
            let params = PortfolioConfig::builder()
                .period(period)
                .build()
                .unwrap()
                .analytics_params();
            assert_eq!(params.trading_days_per_year, expected);
        }
    }

    #[test]
    fn test_retry_backoff() {
        let config = PortfolioConfig::default();
        assert_eq!(config.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(config.retry_backoff(2), Duration::from_secs(4));
    }
}
