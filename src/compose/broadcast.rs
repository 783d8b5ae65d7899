//! # Broadcast Composer
//! Join point of the pipeline: merges per-topic news and social text into one
//! speech-safe script through a single structured generation call.
//!
//! Topics with neither news nor social content are dropped before the request
//! is built, so they contribute nothing to the script.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::llm::{ChatMessage, DynTextGenerator, GenerationRequest};

pub const NO_CONTENT_SCRIPT: &str = "No content available for broadcast news generation.";
pub const TOPIC_SEPARATOR: &str = "\n\n--- NEW TOPIC ---\n\n";

pub const NEWS_LEAD_IN: &str = "According to official reports...";
pub const SOCIAL_LEAD_IN: &str = "Online discussions and social media reveal...";
pub const SOCIAL_TRANSITION: &str = "Meanwhile, online discussions...";

const COMPOSE_TEMPERATURE: f32 = 0.4;
const COMPOSE_MAX_TOKENS: u32 = 4000;

const SYSTEM_PROMPT: &str = "You are broadcast_news_writer, a professional virtual news reporter. \
Generate natural, TTS-ready news reports using the available sources.

For each topic, STRUCTURE BASED ON AVAILABLE DATA:
1. If only news exists: open with \"According to official reports...\" followed by the summary.
2. If only social media exists: open with \"Online discussions and social media reveal...\" followed by the summary.
3. If both exist: present the news first, then the social media reactions, using a transition like \"Meanwhile, online discussions...\".

Formatting rules:
- ALWAYS start directly with the content, NO INTRODUCTIONS.
- Keep audio length 60-120 seconds per topic.
- Incorporate 1-2 short quotes from social media when available.
- Maintain a neutral tone but highlight key sentiments.
- End with a single closing line that starts with \"To wrap up this segment...\".

Write in full paragraphs optimized for speech synthesis. Avoid markdown, lists, headings and special symbols.";

/// Which sources a topic has, which decides its structuring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicCoverage {
    NewsOnly,
    SocialOnly,
    Both,
}

impl TopicCoverage {
    fn lead_in(&self) -> String {
        match self {
            TopicCoverage::NewsOnly => format!("Open with \"{NEWS_LEAD_IN}\""),
            TopicCoverage::SocialOnly => format!("Open with \"{SOCIAL_LEAD_IN}\""),
            TopicCoverage::Both => format!(
                "Present the official news first, then the social reactions introduced with \"{SOCIAL_TRANSITION}\""
            ),
        }
    }
}

/// One topic's context block as sent to the composer.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicBlock {
    pub topic: String,
    pub coverage: TopicCoverage,
    pub text: String,
}

fn non_empty<'a>(map: &'a HashMap<String, String>, topic: &str) -> Option<&'a str> {
    map.get(topic)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Context blocks in topic order; topics without any content are skipped.
pub fn plan_blocks(
    topics: &[String],
    news: &HashMap<String, String>,
    social: &HashMap<String, String>,
) -> Vec<TopicBlock> {
    let mut blocks = Vec::with_capacity(topics.len());
    for topic in topics {
        let news_text = non_empty(news, topic);
        let social_text = non_empty(social, topic);

        let coverage = match (news_text, social_text) {
            (Some(_), Some(_)) => TopicCoverage::Both,
            (Some(_), None) => TopicCoverage::NewsOnly,
            (None, Some(_)) => TopicCoverage::SocialOnly,
            (None, None) => {
                debug!(%topic, "topic has no content; omitted from broadcast");
                continue;
            }
        };

        let mut text = format!("Topic: {topic}\nStructure: {}", coverage.lead_in());
        if let Some(n) = news_text {
            text.push_str("\nOfficial news content:\n");
            text.push_str(n);
        }
        if let Some(s) = social_text {
            text.push_str("\nSocial media discussions:\n");
            text.push_str(s);
        }

        blocks.push(TopicBlock {
            topic: topic.clone(),
            coverage,
            text,
        });
    }
    blocks
}

/// `None` when there is nothing to compose.
pub fn build_user_prompt(blocks: &[TopicBlock]) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }
    let joined = blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(TOPIC_SEPARATOR);
    Some(format!(
        "Create broadcast segments for these topics using available sources:\n\n{joined}"
    ))
}

#[derive(Clone)]
pub struct BroadcastComposer {
    generator: DynTextGenerator,
}

impl BroadcastComposer {
    pub fn new(generator: DynTextGenerator) -> Self {
        Self { generator }
    }

    /// Compose the full script. Service failures are returned to the caller.
    pub async fn compose(
        &self,
        topics: &[String],
        news: &HashMap<String, String>,
        social: &HashMap<String, String>,
    ) -> Result<String> {
        let blocks = plan_blocks(topics, news, social);
        let Some(user_prompt) = build_user_prompt(&blocks) else {
            info!(topics = topics.len(), "no topic has content; skipping composition");
            return Ok(NO_CONTENT_SCRIPT.to_string());
        };

        info!(
            topics = topics.len(),
            kept = blocks.len(),
            "composing broadcast script"
        );
        let req = GenerationRequest::new(
            vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(user_prompt),
            ],
            COMPOSE_TEMPERATURE,
            COMPOSE_MAX_TOKENS,
        );
        let script = self
            .generator
            .generate(req)
            .await
            .context("broadcast composition failed")?;
        if script.trim().is_empty() {
            anyhow::bail!("broadcast composition returned empty text");
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn topics(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_topics_are_dropped() {
        let news = map(&[("A", "news a"), ("B", "   ")]);
        let social = map(&[("A", ""), ("C", "")]);
        let blocks = plan_blocks(&topics(&["A", "B", "C"]), &news, &social);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].topic, "A");
        assert_eq!(blocks[0].coverage, TopicCoverage::NewsOnly);
    }

    #[test]
    fn both_present_orders_news_before_social() {
        let news = map(&[("AI", "NEWS-TEXT")]);
        let social = map(&[("AI", "SOCIAL-TEXT")]);
        let blocks = plan_blocks(&topics(&["AI"]), &news, &social);
        assert_eq!(blocks[0].coverage, TopicCoverage::Both);
        let t = &blocks[0].text;
        assert!(t.find("NEWS-TEXT").unwrap() < t.find("SOCIAL-TEXT").unwrap());
        assert!(t.contains(SOCIAL_TRANSITION));
    }

    #[test]
    fn social_only_uses_social_lead_in() {
        let blocks = plan_blocks(&topics(&["X"]), &map(&[]), &map(&[("X", "chatter")]));
        assert_eq!(blocks[0].coverage, TopicCoverage::SocialOnly);
        assert!(blocks[0].text.contains(SOCIAL_LEAD_IN));
        assert!(!blocks[0].text.contains("Official news content"));
    }

    #[test]
    fn prompt_keeps_topic_order_and_separator() {
        let news = map(&[("B", "b"), ("A", "a")]);
        let blocks = plan_blocks(&topics(&["B", "A"]), &news, &map(&[]));
        let prompt = build_user_prompt(&blocks).unwrap();
        assert!(prompt.find("Topic: B").unwrap() < prompt.find("Topic: A").unwrap());
        assert_eq!(prompt.matches(TOPIC_SEPARATOR).count(), 1);
    }

    #[test]
    fn no_blocks_no_prompt() {
        assert!(build_user_prompt(&[]).is_none());
    }
}
