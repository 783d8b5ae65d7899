//! Text-generation seam: a narrow chat-completion contract shared by the
//! summarizer, social generator, broadcast composer and synthetic fetch stage.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BriefingConfig;

pub mod mock;
pub mod openai;

pub use mock::MockGenerator;
pub use openai::OpenAiCompatClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One generation call. The model identifier comes from the client.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens,
        }
    }

    /// Concatenated content of all user messages (handy for mocks and logs).
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Core trait for text-generation providers (remote or mock).
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the request; failures carry the service's message.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynTextGenerator = Arc<dyn TextGenerator>;

/// Factory: build a generator according to config and environment.
///
/// * If `BRIEFING_TEST_MODE=mock`, returns a deterministic mock generator.
/// * Else builds the OpenAI-compatible remote client.
pub fn build_text_generator(cfg: &BriefingConfig) -> Result<DynTextGenerator> {
    if test_mode_mock() {
        info!("text generation in mock mode");
        return Ok(Arc::new(MockGenerator::default()));
    }

    // Safe diagnostics: only model + key length
    info!(
        model = %cfg.llm.model,
        key_len = cfg.llm.api_key.len(),
        "text generation client configured"
    );
    let client = OpenAiCompatClient::new(
        cfg.llm.base_url.clone(),
        cfg.llm.api_key.clone(),
        cfg.llm.model.clone(),
        cfg.llm.timeout_secs,
    )?;
    Ok(Arc::new(client))
}

pub(crate) fn test_mode_mock() -> bool {
    std::env::var("BRIEFING_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
}
