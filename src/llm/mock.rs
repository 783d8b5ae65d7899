use anyhow::Result;

use super::{GenerationRequest, TextGenerator};

/// Deterministic generator for tests/local runs: echoes a bounded slice of the
/// user prompt so callers can see which content reached the model.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    pub prefix: String,
    pub max_echo_chars: usize,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self {
            prefix: "Mock narration".to_string(),
            max_echo_chars: 2_000,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let echoed: String = request
            .user_text()
            .chars()
            .take(self.max_echo_chars)
            .collect();
        Ok(format!("{}: {}", self.prefix, echoed))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
