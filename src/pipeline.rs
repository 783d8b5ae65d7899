//! # Pipeline Orchestrator
//! Turns a topic list into one narrated audio briefing:
//!
//! - news branch: per topic, search URL -> fallback fetch -> headline
//!   extraction -> summary, each topic unit retried with backoff and followed
//!   by a cooldown;
//! - social branch: per topic commentary, fail-soft;
//! - the two branches run concurrently and join at the broadcast composer;
//! - the script is synthesized to MP3 and read back as the artifact.
//!
//! A topic whose news unit still fails after retries is isolated: it becomes a
//! [`NewsOutcome::Failed`] entry and the run continues. Only composition and
//! speech failures abort the request.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::compose::{BroadcastComposer, NewsSummarizer, SocialCommentator};
use crate::config::BriefingConfig;
use crate::error::PipelineError;
use crate::ingest::{
    build_search_url, clean_html, extract_headlines, AdmissionController, FallbackFetcher,
    FetchStage, RetryPolicy,
};
use crate::llm::{build_text_generator, DynTextGenerator};
use crate::speech::{build_speech_engine, AudioArtifact, AudioSynthesizer};

/// Which branches of the pipeline run for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceType {
    News,
    Social,
    #[default]
    Both,
}

impl SourceType {
    pub fn includes_news(self) -> bool {
        matches!(self, SourceType::News | SourceType::Both)
    }

    pub fn includes_social(self) -> bool {
        matches!(self, SourceType::Social | SourceType::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::News => "news",
            SourceType::Social => "social",
            SourceType::Both => "both",
        }
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(SourceType::News),
            "social" | "reddit" => Ok(SourceType::Social),
            "both" | "" => Ok(SourceType::Both),
            other => Err(format!(
                "unknown source_type '{other}' (expected news, social or both)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Result of one topic's news unit after retries.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsOutcome {
    Summary(String),
    Failed(String),
}

impl NewsOutcome {
    /// Text recorded for the topic; failures become an `Error: ...` placeholder.
    pub fn placeholder(&self) -> String {
        match self {
            NewsOutcome::Summary(s) => s.clone(),
            NewsOutcome::Failed(msg) => format!("Error: {msg}"),
        }
    }

    /// Summary text usable by the composer.
    pub fn usable(&self) -> Option<&str> {
        match self {
            NewsOutcome::Summary(s) => Some(s.as_str()),
            NewsOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicNews {
    pub topic: String,
    /// Stage that supplied the content of the last attempt, if any got that far.
    pub stage: Option<FetchStage>,
    pub outcome: NewsOutcome,
}

/// Everything produced before speech synthesis.
#[derive(Debug, Clone)]
pub struct BriefingScript {
    pub topics: Vec<String>,
    pub news: Vec<TopicNews>,
    pub social: HashMap<String, String>,
    pub script: String,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    /// Pause after each topic unit, success or failure.
    pub cooldown: Duration,
    /// Topics processed concurrently per branch.
    pub max_concurrency: usize,
    pub language: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            cooldown: Duration::from_secs(1),
            max_concurrency: 4,
            language: "en".to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(cfg: &BriefingConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(&cfg.fetch),
            cooldown: Duration::from_millis(cfg.fetch.cooldown_ms),
            max_concurrency: cfg.fetch.max_concurrency.max(1),
            language: cfg.audio.language.clone(),
        }
    }
}

/// Trim, drop blanks, and remove duplicates keeping the first occurrence.
pub fn normalize_topics(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

pub struct BriefingPipeline {
    admission: Arc<AdmissionController>,
    fetcher: FallbackFetcher,
    summarizer: NewsSummarizer,
    social: SocialCommentator,
    composer: BroadcastComposer,
    audio: AudioSynthesizer,
    settings: PipelineSettings,
}

impl BriefingPipeline {
    pub fn new(
        admission: Arc<AdmissionController>,
        fetcher: FallbackFetcher,
        generator: DynTextGenerator,
        audio: AudioSynthesizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            admission,
            fetcher,
            summarizer: NewsSummarizer::new(generator.clone()),
            social: SocialCommentator::new(generator.clone()),
            composer: BroadcastComposer::new(generator),
            audio,
            settings,
        }
    }

    /// Wire real (or mock, under `BRIEFING_TEST_MODE=mock`) services from config.
    /// The admission controller is passed in so every request shares one window.
    pub fn from_config(cfg: &BriefingConfig, admission: Arc<AdmissionController>) -> Result<Self> {
        let generator = build_text_generator(cfg)?;
        let fetcher = FallbackFetcher::from_config(cfg, generator.clone())?;
        let audio = AudioSynthesizer::new(build_speech_engine()?, &cfg.audio.output_dir);
        info!(
            stages = ?fetcher.stages(),
            generator = generator.name(),
            rate_per_sec = admission.limit(),
            "briefing pipeline ready"
        );
        Ok(Self::new(
            admission,
            fetcher,
            generator,
            audio,
            PipelineSettings::from_config(cfg),
        ))
    }

    pub fn summarizer(&self) -> &NewsSummarizer {
        &self.summarizer
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// One attempt of a topic's news unit.
    async fn news_unit(&self, topic: &str) -> Result<(FetchStage, String)> {
        let url = build_search_url(topic);
        let fetched = self.fetcher.fetch(&self.admission, topic, &url).await;
        let cleaned = clean_html(&fetched.raw_text);
        let headlines = extract_headlines(&cleaned);
        let summary = self.summarizer.summarize(&headlines).await?;
        Ok((fetched.stage, summary))
    }

    /// News branch. Output order follows `topics`.
    pub async fn gather_news(&self, topics: &[String]) -> Vec<TopicNews> {
        let this = self;
        stream::iter(topics.to_vec())
            .map(move |topic: String| async move {
                let unit_topic = topic.as_str();
                let result = this
                    .settings
                    .retry
                    .run(move |_| this.news_unit(unit_topic))
                    .await;
                if !this.settings.cooldown.is_zero() {
                    tokio::time::sleep(this.settings.cooldown).await;
                }
                match result {
                    Ok((stage, summary)) => TopicNews {
                        topic,
                        stage: Some(stage),
                        outcome: NewsOutcome::Summary(summary),
                    },
                    Err(e) => {
                        let message = format!("{e:#}");
                        counter!("topic_unit_failures_total").increment(1);
                        warn!(%topic, error = %message, "news unit failed after retries");
                        TopicNews {
                            topic,
                            stage: None,
                            outcome: NewsOutcome::Failed(message),
                        }
                    }
                }
            })
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await
    }

    /// Social branch. Never fails; unavailable commentary is replaced by a fixed line.
    pub async fn gather_social(&self, topics: &[String]) -> HashMap<String, String> {
        let this = self;
        stream::iter(topics.to_vec())
            .map(move |topic: String| async move {
                let commentary = this.social.commentary(&topic).await;
                (topic, commentary)
            })
            .buffered(self.settings.max_concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Both branches concurrently, then the composer.
    pub async fn compose_script(
        &self,
        topics: &[String],
        source: SourceType,
    ) -> std::result::Result<BriefingScript, PipelineError> {
        if topics.is_empty() {
            return Err(PipelineError::NoTopics);
        }

        let news_branch = async {
            if source.includes_news() {
                self.gather_news(topics).await
            } else {
                Vec::new()
            }
        };
        let social_branch = async {
            if source.includes_social() {
                self.gather_social(topics).await
            } else {
                HashMap::new()
            }
        };
        let (news, social) = tokio::join!(news_branch, social_branch);

        let news_text: HashMap<String, String> = news
            .iter()
            .filter_map(|n| n.outcome.usable().map(|s| (n.topic.clone(), s.to_string())))
            .collect();
        let failed = news.len() - news_text.len();
        info!(
            topics = topics.len(),
            news_ok = news_text.len(),
            news_failed = failed,
            social = social.len(),
            "branches joined"
        );

        let script = self
            .composer
            .compose(topics, &news_text, &social)
            .await
            .map_err(PipelineError::Compose)?;

        Ok(BriefingScript {
            topics: topics.to_vec(),
            news,
            social,
            script,
        })
    }

    /// Full request: normalize topics, compose, synthesize, and read the file back.
    pub async fn run(
        &self,
        raw_topics: &[String],
        source: SourceType,
    ) -> std::result::Result<AudioArtifact, PipelineError> {
        let started = Instant::now();
        counter!("briefing_requests_total", "source" => source.as_str()).increment(1);

        let topics = normalize_topics(raw_topics);
        info!(topics = ?topics, source = source.as_str(), "briefing requested");

        let result = async {
            let briefing = self.compose_script(&topics, source).await?;
            let path = self
                .audio
                .synthesize(&briefing.script, &self.settings.language)
                .await
                .map_err(PipelineError::Speech)?;
            AudioArtifact::read_from(&path)
                .await
                .map_err(PipelineError::Artifact)
        }
        .await;

        let elapsed_ms = started.elapsed().as_millis() as f64;
        histogram!("briefing_duration_ms").record(elapsed_ms);
        match &result {
            Ok(artifact) => info!(
                bytes = artifact.bytes.len(),
                path = %artifact.path.display(),
                elapsed_ms,
                "briefing ready"
            ),
            Err(e) => {
                counter!("briefing_failures_total", "kind" => e.kind()).increment(1);
                warn!(error = %e, elapsed_ms, "briefing failed");
            }
        }
        result
    }
}
