// Social commentary generator (simulated discussion analysis, fail-soft)
use tracing::warn;

use crate::llm::{ChatMessage, DynTextGenerator, GenerationRequest};

const SOCIAL_TEMPERATURE: f32 = 0.7;
const SOCIAL_MAX_TOKENS: u32 = 1200;

#[derive(Clone)]
pub struct SocialCommentator {
    generator: DynTextGenerator,
}

impl SocialCommentator {
    pub fn new(generator: DynTextGenerator) -> Self {
        Self { generator }
    }

    /// Never fails: a service error yields a topic-specific fallback line.
    pub async fn commentary(&self, topic: &str) -> String {
        let req = GenerationRequest::new(
            vec![ChatMessage::user(social_prompt(topic))],
            SOCIAL_TEMPERATURE,
            SOCIAL_MAX_TOKENS,
        );
        match self.generator.generate(req).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(%topic, "social commentary came back empty; using fallback");
                fallback_commentary(topic)
            }
            Err(e) => {
                warn!(%topic, error = %e, "social commentary failed; using fallback");
                fallback_commentary(topic)
            }
        }
    }
}

pub fn fallback_commentary(topic: &str) -> String {
    format!(
        "Online discussion about {topic} could not be analyzed at this time, \
         so no social media reaction is available for this segment."
    )
}

pub(crate) fn social_prompt(topic: &str) -> String {
    format!(
        "You are a social media analysis expert. Analyze recent discussions about '{topic}' \
         across social platforms like Reddit, Twitter, and forums.\n\
         Provide a comprehensive summary including:\n\
         - Main discussion points and trending conversations\n\
         - Key opinions and debates around this topic\n\
         - Overall sentiment (positive/neutral/negative)\n\
         - Common themes and reactions from online communities\n\
         - 2-3 representative quotes from typical social media comments (no usernames)\n\
         - Any emerging trends or viral aspects\n\
         Format as a natural analysis that captures authentic social media discussion patterns.\n\
         Make it engaging and informative for news reporting."
    )
}
