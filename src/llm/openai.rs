use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatMessage, GenerationRequest, TextGenerator};

/// Remote generator speaking the OpenAI chat-completions dialect (Groq, OpenAI, Ollama...).
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-briefing/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("text generation API key is not configured");
        }

        let body = Req {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let t0 = std::time::Instant::now();
        let resp = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("text generation request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "text generation non-2xx");
            anyhow::bail!("text generation API error {status}: {text}");
        }

        let parsed: Resp = resp
            .json()
            .await
            .context("failed to parse text generation response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("text generation response has no choices")?;

        debug!(
            model = %self.model,
            chars = content.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "text generation ok"
        );
        Ok(content.trim().to_string())
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}
