//! One-sentence company summaries with a timed cache
//!
//! The text generator is an injected capability; only successful, non-empty
//! summaries are cached so a transient failure is retried on the next request.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use portfolio_analytics::{Market, classify_market, normalize_symbol};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::PortfolioConfig;
use crate::error::{PortfolioError, Result};
use crate::providers::HistoryProvider;

/// Free-text generation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text answering `prompt`, optionally grounded by `context`
    async fn generate_text(&self, prompt: &str, context: &str) -> Result<String>;
}

/// Storage for generated summaries
#[async_trait]
pub trait SummaryCache: Send + Sync {
    async fn get(&self, symbol: &str) -> Option<String>;
    async fn put(&self, symbol: &str, summary: String);
}

/// Summary cache whose entries expire after a fixed lifespan
#[derive(Clone)]
pub struct TimedSummaryCache {
    cache: Arc<RwLock<TimedCache<String, String>>>,
}

impl TimedSummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Cache living for the configured summary lifetime
    pub fn from_config(config: &PortfolioConfig) -> Self {
        Self::new(config.summary_cache_ttl)
    }

    /// Number of entries, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SummaryCache for TimedSummaryCache {
    async fn get(&self, symbol: &str) -> Option<String> {
        // TimedCache evicts on read, so even lookups need the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(symbol).cloned()
    }

    async fn put(&self, symbol: &str, summary: String) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(symbol.to_string(), summary);
    }
}

/// Company summaries backed by a cache, a name lookup and a text generator
pub struct SummaryService {
    generator: Arc<dyn TextGenerator>,
    names: Arc<dyn HistoryProvider>,
    cache: Arc<dyn SummaryCache>,
}

impl SummaryService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        names: Arc<dyn HistoryProvider>,
        cache: Arc<dyn SummaryCache>,
    ) -> Self {
        Self {
            generator,
            names,
            cache,
        }
    }

    /// Summary of the business behind `symbol`
    pub async fn company_summary(&self, symbol: &str) -> Result<String> {
        let symbol = normalize_symbol(symbol)?;

        if let Some(summary) = self.cache.get(&symbol).await {
            debug!(%symbol, "Summary cache hit");
            return Ok(summary);
        }
        debug!(%symbol, "Summary cache miss");

        let subject = self.subject(&symbol).await;
        let prompt = summary_prompt(&subject);

        let summary = self
            .generator
            .generate_text(&prompt, "")
            .await
            .map_err(|e| match e {
                PortfolioError::Generation(_) => e,
                other => PortfolioError::Generation(other.to_string()),
            })?;

        let summary = summary.trim().to_string();
        if summary.is_empty() {
            warn!(%symbol, "Text generator returned an empty summary");
            return Err(PortfolioError::Generation(format!(
                "Empty summary generated for {symbol}"
            )));
        }

        self.cache.put(&symbol, summary.clone()).await;
        info!(%symbol, "Generated company summary");
        Ok(summary)
    }

    /// Symbol as presented to the generator; domestic codes carry the company name
    async fn subject(&self, symbol: &str) -> String {
        if classify_market(symbol) != Market::Domestic {
            return symbol.to_string();
        }
        let name = self.names.display_name(symbol).await;
        if name.is_empty() || name == symbol {
            symbol.to_string()
        } else {
            format!("{symbol} (company name: {name})")
        }
    }
}

fn summary_prompt(subject: &str) -> String {
    format!(
        "In one concise sentence, summarize the main business and industry position \
         of the company with ticker {subject}. Go straight to the point."
    )
}
