// src/config/briefing.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "config/briefing.toml";
pub const ENV_CONFIG_PATH: &str = "BRIEFING_CONFIG_PATH";

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_PROXY_ENDPOINT: &str = "https://api.brightdata.com/request";

fn default_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    30
}
fn default_rate_per_sec() -> u32 {
    5
}
fn default_direct_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_min_ms() -> u64 {
    2_000
}
fn default_backoff_max_ms() -> u64 {
    10_000
}
fn default_cooldown_ms() -> u64 {
    1_000
}
fn default_proxy_endpoint() -> String {
    DEFAULT_PROXY_ENDPOINT.to_string()
}
fn default_audio_dir() -> String {
    "audio".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_max_concurrency() -> usize {
    4
}

/// Text-generation service settings (OpenAI-compatible chat endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from GROQ_API_KEY.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: default_api_key(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Fetch chain, admission control and retry knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Admissions allowed per rolling second, shared by every topic.
    #[serde(default = "default_rate_per_sec")]
    pub rate_per_sec: u32,
    #[serde(default = "default_direct_timeout_secs")]
    pub direct_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_min_ms")]
    pub backoff_min_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Politeness delay after each per-topic unit.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Topic units allowed in flight at once within a request.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            rate_per_sec: default_rate_per_sec(),
            direct_timeout_secs: default_direct_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_min_ms: default_backoff_min_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            cooldown_ms: default_cooldown_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Optional web-unlocking proxy. Only used when enabled AND both credentials and zone exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_proxy_endpoint(),
            api_key: None,
            zone: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSection {
    #[serde(default = "default_audio_dir")]
    pub output_dir: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            output_dir: default_audio_dir(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingConfig {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub proxy: ProxySection,
    #[serde(default)]
    pub audio: AudioSection,
}

impl BriefingConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading briefing config from {}", path.display()))?;
        let cfg: BriefingConfig =
            toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $BRIEFING_CONFIG_PATH (must exist)
    /// 2) config/briefing.toml
    /// 3) built-in defaults
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                if !Path::new(&p).exists() {
                    anyhow::bail!("{ENV_CONFIG_PATH} points to non-existent path");
                }
                Self::load_from_file(&p)?
            }
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        cfg.apply_env();
        cfg.sanitize();
        Ok(cfg)
    }

    /// Overlay environment variables on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(v) = env::var("LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if self.llm.api_key.trim().eq_ignore_ascii_case("env") {
            self.llm.api_key = env::var("GROQ_API_KEY").unwrap_or_default();
        }

        if let Ok(v) = env::var("BRIGHTDATA_API_KEY") {
            self.proxy.api_key = Some(v);
        }
        if let Ok(v) = env::var("WEB_UNLOCKER_ZONE") {
            self.proxy.zone = Some(v);
        }
        if let Ok(v) = env::var("PROXY_ENABLED") {
            self.proxy.enabled = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }

        if let Some(n) = env::var("RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            self.fetch.rate_per_sec = n;
        }

        if let Ok(v) = env::var("AUDIO_OUTPUT_DIR") {
            self.audio.output_dir = v;
        }
        if let Ok(v) = env::var("TTS_LANGUAGE") {
            self.audio.language = v;
        }
    }

    /// Clamp values into workable ranges.
    pub fn sanitize(&mut self) {
        self.fetch.rate_per_sec = self.fetch.rate_per_sec.max(1);
        self.fetch.direct_timeout_secs = self.fetch.direct_timeout_secs.clamp(1, 60);
        self.fetch.max_attempts = self.fetch.max_attempts.max(1);
        self.fetch.max_concurrency = self.fetch.max_concurrency.max(1);
        if self.fetch.backoff_min_ms > self.fetch.backoff_max_ms {
            // swap to keep a valid interval
            std::mem::swap(&mut self.fetch.backoff_min_ms, &mut self.fetch.backoff_max_ms);
        }
        self.llm.timeout_secs = self.llm.timeout_secs.clamp(1, 120);

        let lang = self.audio.language.trim().to_ascii_lowercase();
        self.audio.language = if lang.is_empty() {
            default_language()
        } else {
            lang
        };
        if self.audio.output_dir.trim().is_empty() {
            self.audio.output_dir = default_audio_dir();
        }
    }

    /// Proxy stage is only entered when switched on and fully configured.
    pub fn proxy_usable(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.proxy.enabled && filled(&self.proxy.api_key) && filled(&self.proxy.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: BriefingConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(cfg.fetch.rate_per_sec, 5);
        assert_eq!(cfg.fetch.max_attempts, 3);
        assert_eq!(cfg.fetch.backoff_min_ms, 2_000);
        assert_eq!(cfg.fetch.backoff_max_ms, 10_000);
        assert_eq!(cfg.audio.output_dir, "audio");
        assert!(!cfg.proxy.enabled);
    }

    #[test]
    fn sanitize_clamps_and_swaps() {
        let mut cfg: BriefingConfig = toml::from_str(
            r#"
            [fetch]
            rate_per_sec = 0
            direct_timeout_secs = 900
            backoff_min_ms = 9000
            backoff_max_ms = 1000

            [audio]
            language = "  EN "
            "#,
        )
        .unwrap();
        cfg.sanitize();
        assert_eq!(cfg.fetch.rate_per_sec, 1);
        assert_eq!(cfg.fetch.direct_timeout_secs, 60);
        assert_eq!(cfg.fetch.backoff_min_ms, 1000);
        assert_eq!(cfg.fetch.backoff_max_ms, 9000);
        assert_eq!(cfg.audio.language, "en");
    }

    #[test]
    fn proxy_requires_flag_key_and_zone() {
        let mut cfg = BriefingConfig::default();
        assert!(!cfg.proxy_usable());

        cfg.proxy.enabled = true;
        cfg.proxy.api_key = Some("k".into());
        assert!(!cfg.proxy_usable(), "zone missing");

        cfg.proxy.zone = Some("unlocker".into());
        assert!(cfg.proxy_usable());

        cfg.proxy.enabled = false;
        assert!(!cfg.proxy_usable(), "disabled by config");
    }
}
