// src/ingest/types.rs
use anyhow::Result;
use serde::Serialize;

/// Which link of the fallback chain produced a topic's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStage {
    Direct,
    Proxy,
    Synthetic,
}

impl FetchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStage::Direct => "direct",
            FetchStage::Proxy => "proxy",
            FetchStage::Synthetic => "synthetic",
        }
    }
}

/// Outcome of one fallback-chain walk for one topic. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FetchAttemptResult {
    pub topic: String,
    pub stage: FetchStage,
    pub raw_text: String,
    /// False only when the synthetic stage had to fall back to its static stub.
    pub success: bool,
}

/// A fallible acquisition strategy (direct GET, proxy unlocker, ...).
#[async_trait::async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Fetch raw page text for `url`. Any error means "try the next link".
    async fn attempt(&self, url: &str) -> Result<String>;
    fn stage(&self) -> FetchStage;
}
