//! Audio synthesis: a text-to-speech engine seam plus the synthesizer that
//! writes timestamped MP3 files into the output directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub mod google;
pub mod mock;

pub use google::GoogleTranslateTts;
pub use mock::MockSpeech;

pub const AUDIO_MIME: &str = "audio/mpeg";
pub const DOWNLOAD_FILENAME: &str = "news_summary.mp3";

/// Abstracts the TTS provider. Returns compressed speech audio (MP3).
#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
    fn name(&self) -> &'static str;
}

pub type DynSpeechEngine = Arc<dyn SpeechEngine>;

/// Build the engine: `BRIEFING_TEST_MODE=mock` gives the silent mock.
pub fn build_speech_engine() -> Result<DynSpeechEngine> {
    if crate::llm::test_mode_mock() {
        return Ok(Arc::new(MockSpeech));
    }
    Ok(Arc::new(GoogleTranslateTts::new()?))
}

/// Finished audio handed to the caller; the pipeline keeps no reference.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: String,
    /// Where the synthesizer wrote the file.
    pub path: PathBuf,
}

impl AudioArtifact {
    pub async fn read_from(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading audio file {}", path.display()))?;
        if bytes.is_empty() {
            anyhow::bail!("audio file {} is empty", path.display());
        }
        Ok(Self {
            bytes,
            mime: AUDIO_MIME,
            filename: DOWNLOAD_FILENAME.to_string(),
            path: path.to_path_buf(),
        })
    }
}

pub struct AudioSynthesizer {
    engine: DynSpeechEngine,
    output_dir: PathBuf,
}

impl AudioSynthesizer {
    pub fn new(engine: DynSpeechEngine, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
        }
    }

    /// Single engine call, no retry. Returns the path of the freshly written file.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf> {
        if text.trim().is_empty() {
            anyhow::bail!("nothing to synthesize: script is empty");
        }
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating audio dir {}", self.output_dir.display()))?;

        let audio = self
            .engine
            .synthesize(text, language)
            .await
            .with_context(|| format!("{} speech synthesis failed", self.engine.name()))?;
        if audio.is_empty() {
            anyhow::bail!("{} returned no audio", self.engine.name());
        }

        let path = self.write_fresh(&audio).await?;
        info!(path = %path.display(), bytes = audio.len(), "audio written");
        Ok(path)
    }

    /// Writes `tts_<timestamp>.mp3`, adding a numeric suffix while the name is taken.
    /// Files are created exclusively so concurrent requests never share a path.
    async fn write_fresh(&self, audio: &[u8]) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
        let mut path = self.output_dir.join(format!("tts_{stamp}.mp3"));
        let mut n = 1u32;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(audio)
                        .await
                        .with_context(|| format!("writing audio file {}", path.display()))?;
                    file.flush()
                        .await
                        .with_context(|| format!("flushing audio file {}", path.display()))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    path = self.output_dir.join(format!("tts_{stamp}_{n}.mp3"));
                    n += 1;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("creating audio file {}", path.display()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_writes_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let synth = AudioSynthesizer::new(Arc::new(MockSpeech), dir.path().join("audio"));

        let scripts: Vec<String> = (0..20).map(|i| format!("script number {i}")).collect();
        let paths = futures::future::join_all(scripts.iter().map(|s| synth.synthesize(s, "en")))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let unique: std::collections::HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), scripts.len());
        for (script, path) in scripts.iter().zip(&paths) {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.ends_with(format!("en:{script}").as_bytes()), "{}", path.display());
        }
    }

    #[tokio::test]
    async fn empty_script_is_rejected_before_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let synth = AudioSynthesizer::new(Arc::new(MockSpeech), dir.path());
        let err = synth.synthesize("   ", "en").await.unwrap_err();
        assert!(err.to_string().contains("script is empty"));
    }
}
