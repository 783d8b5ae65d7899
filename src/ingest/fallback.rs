//! # Fallback Fetcher
//! Walks an ordered list of fallible strategies (direct, then optional proxy)
//! and ends with the infallible synthetic stage. Every stage attempt first
//! passes the shared admission controller.

use metrics::counter;
use tracing::{info, warn};

use crate::config::BriefingConfig;
use crate::ingest::admission::AdmissionController;
use crate::ingest::headlines::{clean_html, headline_set};
use crate::ingest::providers::{DirectFetch, ProxyFetch, SyntheticStage};
use crate::ingest::types::{FetchAttemptResult, FetchStage, FetchStrategy};
use crate::llm::DynTextGenerator;

pub struct FallbackFetcher {
    strategies: Vec<Box<dyn FetchStrategy>>,
    synthetic: SyntheticStage,
}

impl FallbackFetcher {
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>, synthetic: SyntheticStage) -> Self {
        Self {
            strategies,
            synthetic,
        }
    }

    /// Direct fetch, then the proxy when it is enabled and configured, then synthetic.
    pub fn from_config(cfg: &BriefingConfig, generator: DynTextGenerator) -> anyhow::Result<Self> {
        let mut strategies: Vec<Box<dyn FetchStrategy>> =
            vec![Box::new(DirectFetch::new(cfg.fetch.direct_timeout_secs)?)];
        match ProxyFetch::from_config(cfg)? {
            Some(proxy) => strategies.push(Box::new(proxy)),
            None => info!("proxy stage skipped (disabled or not configured)"),
        }
        Ok(Self::new(strategies, SyntheticStage::new(generator)))
    }

    /// Stages that will be tried, in order.
    pub fn stages(&self) -> Vec<FetchStage> {
        self.strategies
            .iter()
            .map(|s| s.stage())
            .chain(std::iter::once(FetchStage::Synthetic))
            .collect()
    }

    /// Fail-open: always returns text with at least one headline for the topic.
    /// A body without headlines counts as a failed stage.
    pub async fn fetch(
        &self,
        admission: &AdmissionController,
        topic: &str,
        url: &str,
    ) -> FetchAttemptResult {
        for strategy in &self.strategies {
            let stage = strategy.stage();
            admission.acquire().await;
            match strategy.attempt(url).await {
                Ok(text) if has_headlines(&text) => {
                    counter!("fetch_stage_total", "stage" => stage.as_str()).increment(1);
                    info!(%topic, stage = stage.as_str(), bytes = text.len(), "fetch stage succeeded");
                    return FetchAttemptResult {
                        topic: topic.to_string(),
                        stage,
                        raw_text: text,
                        success: true,
                    };
                }
                Ok(text) => {
                    warn!(
                        %topic,
                        stage = stage.as_str(),
                        bytes = text.len(),
                        "fetch stage returned no readable headlines"
                    );
                }
                Err(e) => {
                    warn!(%topic, stage = stage.as_str(), error = %e, "fetch stage failed");
                }
            }
        }

        admission.acquire().await;
        let content = self.synthetic.produce(url).await;
        counter!("fetch_stage_total", "stage" => FetchStage::Synthetic.as_str()).increment(1);
        info!(%topic, generated = content.generated, "synthetic stage used");
        FetchAttemptResult {
            topic: topic.to_string(),
            stage: FetchStage::Synthetic,
            raw_text: content.text,
            success: content.generated,
        }
    }
}

/// Markup that yields at least one headline once cleaned.
pub(crate) fn has_headlines(markup: &str) -> bool {
    !headline_set(&clean_html(markup)).is_empty()
}
