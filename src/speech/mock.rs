use anyhow::Result;

use super::SpeechEngine;

/// Deterministic engine for tests/local runs: an ID3 header followed by the text bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSpeech;

#[async_trait::async_trait]
impl SpeechEngine for MockSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let mut out = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
        out.extend_from_slice(language.as_bytes());
        out.push(b':');
        out.extend_from_slice(text.as_bytes());
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
