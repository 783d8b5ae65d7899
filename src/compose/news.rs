// News summarizer
use anyhow::{Context, Result};

use crate::llm::{ChatMessage, DynTextGenerator, GenerationRequest};

const NEWS_TEMPERATURE: f32 = 0.4;
const NEWS_MAX_TOKENS: u32 = 800;

/// Turns one topic's headlines into a short, speakable news paragraph.
#[derive(Clone)]
pub struct NewsSummarizer {
    generator: DynTextGenerator,
}

impl NewsSummarizer {
    pub fn new(generator: DynTextGenerator) -> Self {
        Self { generator }
    }

    /// Service failures propagate; callers decide whether they are fatal.
    pub async fn summarize(&self, headlines: &str) -> Result<String> {
        let headlines = headlines.trim();
        if headlines.is_empty() {
            anyhow::bail!("no headlines to summarize");
        }

        let req = GenerationRequest::new(
            vec![ChatMessage::user(summary_prompt(headlines))],
            NEWS_TEMPERATURE,
            NEWS_MAX_TOKENS,
        );
        let text = self
            .generator
            .generate(req)
            .await
            .context("news summary generation failed")?;
        if text.trim().is_empty() {
            anyhow::bail!("news summary generation returned empty text");
        }
        Ok(text)
    }
}

pub(crate) fn summary_prompt(headlines: &str) -> String {
    format!(
        "You are my personal news editor. Summarize these headlines into a TV news script for me, \
         focus on important headlines and remember that this text will be converted to audio.\n\
         So no extra stuff other than text which the newscaster should read, no special symbols \
         or extra information in between and no preamble please.\n\
         {headlines}\n\
         News Script:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_headlines_before_script_marker() {
        let p = summary_prompt("H1\nH2");
        let at_headlines = p.find("H1\nH2").unwrap();
        let at_marker = p.find("News Script:").unwrap();
        assert!(at_headlines < at_marker);
        assert!(p.contains("no preamble"));
    }
}
