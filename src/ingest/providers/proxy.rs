use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::BriefingConfig;
use crate::ingest::types::{FetchStage, FetchStrategy};

/// Web-unlocking proxy: POSTs the target URL and gets raw page text back.
pub struct ProxyFetch {
    client: Client,
    endpoint: String,
    api_key: String,
    zone: String,
}

#[derive(Serialize)]
struct UnlockRequest<'a> {
    zone: &'a str,
    url: &'a str,
    format: &'a str,
}

impl ProxyFetch {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        zone: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            zone: zone.into(),
        })
    }

    /// `None` when the proxy is disabled or missing credentials/zone.
    pub fn from_config(cfg: &BriefingConfig) -> Result<Option<Self>> {
        if !cfg.proxy_usable() {
            return Ok(None);
        }
        let (Some(key), Some(zone)) = (cfg.proxy.api_key.as_deref(), cfg.proxy.zone.as_deref())
        else {
            return Ok(None);
        };
        // Unlocking is slower than a direct GET; give it a few extra seconds.
        let timeout = cfg.fetch.direct_timeout_secs.saturating_add(20);
        Self::new(cfg.proxy.endpoint.clone(), key, zone, timeout).map(Some)
    }
}

#[async_trait]
impl FetchStrategy for ProxyFetch {
    async fn attempt(&self, url: &str) -> Result<String> {
        let body = UnlockRequest {
            zone: &self.zone,
            url,
            format: "raw",
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("proxy post")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("proxy fetch failed with status: {status}"));
        }
        resp.text().await.context("proxy .text()")
    }

    fn stage(&self) -> FetchStage {
        FetchStage::Proxy
    }
}
