//! Transcript Article - turn a video's caption track into a written article
//!
//! The library splits a transcript into bounded, overlapping chunks, sends each
//! chunk through two text-generation stages (dialogue structuring, then article
//! writing) with pacing between calls, and reassembles the outputs in order.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{CaptionEntry, Transcript, VideoMetadata, VideoSource};
pub use generate::{ChatClient, GenerationError, TextGenerator};
pub use output::{ArticleRecord, OutputStore};
pub use pipeline::{ArticlePipeline, ArticleWorkflow, PipelineOutput, Stage, StageConfig};

/// Result type used throughout the library
pub type Result<T, E = ArticleError> = std::result::Result<T, E>;

/// Error types specific to the article pipeline
#[derive(thiserror::Error, Debug)]
pub enum ArticleError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid video locator: {0}")]
    InvalidLocator(String),

    #[error("Source unavailable while {operation}")]
    SourceUnavailable {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No transcript available for video {video_id}")]
    NoTranscriptAvailable { video_id: String },

    #[error("Transform call failed in {stage} stage at chunk {ordinal}/{total}")]
    TransformCallFailure {
        stage: Stage,
        ordinal: usize,
        total: usize,
        #[source]
        source: GenerationError,
    },

    #[error("Pipeline run exceeded its deadline of {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error("Failed to persist artifacts: {0}")]
    Persistence(String),
}

impl ArticleError {
    pub(crate) fn source_unavailable(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ArticleError::SourceUnavailable {
            operation: operation.into(),
            source: source.into(),
        }
    }
}
