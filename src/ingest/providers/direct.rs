use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::ingest::types::{FetchStage, FetchStrategy};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Plain GET with a browser-like user agent and a bounded timeout.
pub struct DirectFetch {
    client: Client,
}

impl DirectFetch {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for DirectFetch {
    async fn attempt(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("direct fetch get()")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("direct fetch failed with status: {status}"));
        }
        resp.text().await.context("direct fetch .text()")
    }

    fn stage(&self) -> FetchStage {
        FetchStage::Direct
    }
}
