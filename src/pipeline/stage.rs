use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use super::chunker::{self, Chunker};
use super::{prompt, reassemble};
use crate::generate::{Pacer, TextGenerator};
use crate::{ArticleError, Result};

/// A named transformation applied chunk by chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Raw subtitles to speaker-separated dialogue
    DialogueStructuring,
    /// Dialogue to article prose
    ArticleGeneration,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::DialogueStructuring, Stage::ArticleGeneration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::DialogueStructuring => "dialogue_structuring",
            Stage::ArticleGeneration => "article_generation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage plus its chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageConfig {
    pub stage: Stage,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl StageConfig {
    pub fn new(stage: Stage, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            stage,
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunker().map(|_| ())
    }

    fn chunker(&self) -> Result<Chunker> {
        Chunker::new(self.chunk_size, self.chunk_overlap).map_err(|e| match e {
            ArticleError::Configuration(msg) => {
                ArticleError::Configuration(format!("{} stage: {}", self.stage, msg))
            }
            other => other,
        })
    }
}

/// Runs one stage: chunk, transform each chunk in order with pacing, join.
pub struct StageRunner<'a> {
    generator: &'a dyn TextGenerator,
    pacer: &'a dyn Pacer,
    progress: &'a ProgressBar,
}

impl<'a> StageRunner<'a> {
    pub fn new(generator: &'a dyn TextGenerator, pacer: &'a dyn Pacer, progress: &'a ProgressBar) -> Self {
        Self {
            generator,
            pacer,
            progress,
        }
    }

    /// Transform `input` through `config.stage`.
    ///
    /// Empty input returns an empty string without calling the generator. The
    /// first failed call aborts the stage and no partial output is returned.
    pub async fn run_stage(&self, input: &str, config: &StageConfig) -> Result<String> {
        let stage = config.stage;
        let chunker = config.chunker()?;

        let chunks = chunker.chunks(input);
        if chunks.is_empty() {
            tracing::info!("{} stage: empty input, nothing to transform", stage);
            return Ok(String::new());
        }

        let total = chunks.len();
        tracing::info!("{} stage: processing {} chunks", stage, total);

        let mut outputs = Vec::with_capacity(total);
        for chunk in &chunks {
            if chunk.ordinal > 1 {
                self.progress
                    .set_message(format!("{}: pausing before chunk {}/{}", stage, chunk.ordinal, total));
                self.pacer.wait().await;
            }

            self.progress
                .set_message(format!("{}: chunk {}/{}", stage, chunk.ordinal, total));
            tracing::info!(
                "{} stage: chunk {}/{} ({} chars, template {})",
                stage,
                chunk.ordinal,
                total,
                chunk.text.chars().count(),
                prompt::Position::of(chunk.ordinal, total)
            );

            let request = prompt::build(stage, &chunk.text, chunk.ordinal, total);
            let output = self.generator.generate(&request).await.map_err(|source| {
                tracing::error!("{} stage failed at chunk {}/{}: {}", stage, chunk.ordinal, total, source);
                ArticleError::TransformCallFailure {
                    stage,
                    ordinal: chunk.ordinal,
                    total,
                    source,
                }
            })?;
            outputs.push(output);
        }

        Ok(reassemble::join(&outputs))
    }
}
