use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, PipelineConfig};
use crate::extractors::youtube::YoutubeSource;
use crate::extractors::VideoSource;
use crate::generate::{ChatClient, Pacer, RandomPacer, TextGenerator};
use crate::output::{ArticleRecord, OutputStore, PersistedPaths};
use crate::utils::extract_video_id;
use crate::{ArticleError, Result};

pub mod chunker;
pub mod prompt;
pub mod reassemble;
pub mod stage;

pub use stage::{Stage, StageConfig, StageRunner};

/// Texts produced by one run of both stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub structured_transcript: String,
    pub article: String,
}

/// Dialogue structuring followed by article generation
pub struct ArticlePipeline {
    generator: Arc<dyn TextGenerator>,
    pacer: Arc<dyn Pacer>,
    config: PipelineConfig,
    deadline: Option<Duration>,
    progress: ProgressBar,
}

impl ArticlePipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, pacer: Arc<dyn Pacer>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let deadline = config.run_deadline_secs.map(Duration::from_secs);

        Ok(Self {
            generator,
            pacer,
            config,
            deadline,
            progress: ProgressBar::hidden(),
        })
    }

    /// Bound the whole run; in-flight requests and pauses are dropped when it expires
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run both stages over `raw_transcript`
    pub async fn run(&self, raw_transcript: &str) -> Result<PipelineOutput> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_stages(raw_transcript))
                .await
                .map_err(|_| ArticleError::DeadlineExceeded(deadline))?,
            None => self.run_stages(raw_transcript).await,
        }
    }

    async fn run_stages(&self, raw_transcript: &str) -> Result<PipelineOutput> {
        let runner = StageRunner::new(self.generator.as_ref(), self.pacer.as_ref(), &self.progress);

        let structured_transcript = runner
            .run_stage(raw_transcript, &self.config.stage_config(Stage::DialogueStructuring))
            .await?;

        // Stage 2 starts after a pause only when both stages call the service
        if !raw_transcript.is_empty() && !structured_transcript.is_empty() {
            self.progress.set_message("pausing before article generation");
            self.pacer.wait().await;
        }

        let article = runner
            .run_stage(&structured_transcript, &self.config.stage_config(Stage::ArticleGeneration))
            .await?;

        Ok(PipelineOutput {
            structured_transcript,
            article,
        })
    }
}

/// Result of [`ArticleWorkflow::create_article`]
#[derive(Debug, Clone)]
pub struct ArticleRun {
    pub record: ArticleRecord,
    pub paths: PersistedPaths,
}

/// Locator to stored article: captions, metadata, both stages, persistence
pub struct ArticleWorkflow {
    source: Box<dyn VideoSource>,
    pipeline: ArticlePipeline,
    store: OutputStore,
    progress: ProgressBar,
}

impl ArticleWorkflow {
    pub fn new(source: Box<dyn VideoSource>, pipeline: ArticlePipeline, store: OutputStore) -> Self {
        Self {
            source,
            pipeline,
            store,
            progress: ProgressBar::hidden(),
        }
    }

    /// Wire the YouTube source, the chat client and random pacing from configuration
    pub fn from_config(config: &Config, api_key: &str, quiet: bool) -> Result<Self> {
        config.validate()?;

        let source = YoutubeSource::new(&config.captions)?;
        let generator = ChatClient::new(&config.generation, api_key)?;
        let pacer = RandomPacer::from_config(&config.pacing)?;

        let progress = if quiet {
            ProgressBar::hidden()
        } else {
            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            progress.enable_steady_tick(Duration::from_millis(120));
            progress
        };

        let pipeline = ArticlePipeline::new(Arc::new(generator), Arc::new(pacer), config.pipeline.clone())?
            .with_progress(progress.clone());

        let mut workflow = Self::new(Box::new(source), pipeline, OutputStore::new(&config.output));
        workflow.progress = progress;
        Ok(workflow)
    }

    /// Build and store the article for one video locator
    pub async fn create_article(&self, locator: &str) -> Result<ArticleRun> {
        let result = self.run(locator).await;
        match &result {
            Ok(_) => self.progress.finish_with_message("Article complete"),
            Err(_) => self.progress.abandon_with_message("Article generation failed"),
        }
        result
    }

    async fn run(&self, locator: &str) -> Result<ArticleRun> {
        let video_id = extract_video_id(locator)?;
        tracing::info!("Creating article for video {} via {}", video_id, self.source.platform_name());

        self.progress.set_message("Looking up video metadata...");
        let metadata = self.source.metadata(locator).await?;

        self.progress.set_message("Downloading captions...");
        let transcript = self.source.transcript(locator).await?;
        tracing::info!("Fetched {} caption entries", transcript.len());

        let raw_subtitles = transcript.to_srt();
        let output = self.pipeline.run(&raw_subtitles).await?;

        self.progress.set_message("Saving article...");
        let record = ArticleRecord::new(
            locator,
            metadata,
            raw_subtitles,
            output.structured_transcript,
            output.article,
        );
        let paths = self.store.persist(&record).await?;

        Ok(ArticleRun { record, paths })
    }
}
