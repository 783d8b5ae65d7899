// src/error.rs
use thiserror::Error;

/// Request-level failures. Each variant carries the underlying service message.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no usable topics supplied")]
    NoTopics,

    #[error("{0:#}")]
    Compose(anyhow::Error),

    #[error("{0:#}")]
    Speech(anyhow::Error),

    #[error("audio file could not be generated or found: {0:#}")]
    Artifact(anyhow::Error),
}

impl PipelineError {
    /// HTTP status the request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::NoTopics => 400,
            PipelineError::Compose(_) | PipelineError::Speech(_) | PipelineError::Artifact(_) => {
                500
            }
        }
    }

    /// Short stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NoTopics => "no_topics",
            PipelineError::Compose(_) => "compose",
            PipelineError::Speech(_) => "speech",
            PipelineError::Artifact(_) => "artifact",
        }
    }
}
