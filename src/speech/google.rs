use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use tracing::debug;

use super::SpeechEngine;

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
/// The endpoint rejects longer inputs.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Google Translate speech endpoint (the free engine behind gTTS).
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::ingest::providers::direct::BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            endpoint: TTS_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl SpeechEngine for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(anyhow!("no speakable text"));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx_s = idx.to_string();
            let len_s = chunk.chars().count().to_string();
            let resp = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", language),
                    ("client", "tw-ob"),
                    ("total", total.as_str()),
                    ("idx", idx_s.as_str()),
                    ("textlen", len_s.as_str()),
                ])
                .send()
                .await
                .context("tts request failed")?
                .error_for_status()
                .context("tts non-2xx")?;
            let bytes = resp.bytes().await.context("tts .bytes()")?;
            debug!(idx, bytes = bytes.len(), "tts chunk received");
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "google-translate-tts"
    }
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// sentence ends, then word boundaries. Over-long words are hard-split.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    let flush = |current: &mut String, current_len: &mut usize, chunks: &mut Vec<String>| {
        let t = current.trim();
        if !t.is_empty() {
            chunks.push(t.to_string());
        }
        current.clear();
        *current_len = 0;
    };

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            flush(&mut current, &mut current_len, &mut chunks);
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current_len == 0 { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            flush(&mut current, &mut current_len, &mut chunks);
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;

        // Close the chunk at a sentence end once it has some body.
        if word.ends_with(['.', '!', '?']) && current_len >= max_chars / 2 {
            flush(&mut current, &mut current_len, &mut chunks);
        }
    }
    flush(&mut current, &mut current_len, &mut chunks);
    chunks
}
