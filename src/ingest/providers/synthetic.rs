//! Terminal link of the fallback chain: asks the text generator to fabricate
//! headline-style HTML for the topic, and falls back to a static stub when even
//! that fails. Never returns an error and never returns text without headlines.

use tracing::warn;

use crate::ingest::fallback::has_headlines;
use crate::ingest::search_url::topic_from_url;
use crate::llm::{ChatMessage, DynTextGenerator, GenerationRequest};

const SYNTHETIC_TEMPERATURE: f32 = 0.7;
const SYNTHETIC_MAX_TOKENS: u32 = 600;

pub struct SyntheticStage {
    generator: DynTextGenerator,
}

/// What the synthetic stage produced, and whether the generator was involved.
#[derive(Debug, Clone)]
pub struct SyntheticContent {
    pub text: String,
    pub generated: bool,
}

impl SyntheticStage {
    pub fn new(generator: DynTextGenerator) -> Self {
        Self { generator }
    }

    pub async fn produce(&self, url: &str) -> SyntheticContent {
        let topic = topic_from_url(url).unwrap_or_else(|| "today's news".to_string());

        let prompt = format!(
            "Write plausible current news headlines about '{topic}' as simple HTML.\n\
             Produce 5 to 8 items. Each item is a <p> element holding one headline, \
             followed by a <p>More</p> element.\n\
             Output only the HTML body content, no commentary."
        );
        let req = GenerationRequest::new(
            vec![ChatMessage::user(prompt)],
            SYNTHETIC_TEMPERATURE,
            SYNTHETIC_MAX_TOKENS,
        );

        match self.generator.generate(req).await {
            Ok(text) if has_headlines(&text) => SyntheticContent {
                text,
                generated: true,
            },
            Ok(_) => {
                warn!(%topic, "synthetic generation returned no headlines; using static stub");
                SyntheticContent {
                    text: static_stub(&topic),
                    generated: false,
                }
            }
            Err(e) => {
                warn!(%topic, error = %e, "synthetic generation failed; using static stub");
                SyntheticContent {
                    text: static_stub(&topic),
                    generated: false,
                }
            }
        }
    }
}

/// Fixed HTML used when nothing else worked.
pub fn static_stub(topic: &str) -> String {
    let topic = html_escape::encode_text(topic);
    format!(
        "<html><body>\n\
         <h1>Latest updates on {topic}</h1>\n\
         <p>Breaking: Latest updates on your requested topic</p>\n\
         <p>Global news and updates from around the world</p>\n\
         <p>Technology advances in artificial intelligence</p>\n\
         <p>Weather forecast: Sunny skies expected</p>\n\
         </body></html>"
    )
}
