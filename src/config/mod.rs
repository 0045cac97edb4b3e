use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pipeline::{Stage, StageConfig};
use crate::ArticleError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote text-generation service
    pub generation: GenerationConfig,

    /// Delay between consecutive generation requests
    pub pacing: PacingConfig,

    /// Chunking per stage and run limits
    pub pipeline: PipelineConfig,

    /// Caption track selection
    pub captions: CaptionConfig,

    /// Where artifacts are written
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat completions endpoint
    pub endpoint: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request deadline in seconds
    pub timeout_secs: u64,

    /// API key; GROQ_API_KEY takes precedence when set
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Lower bound of the random delay in seconds
    pub min_secs: f64,

    /// Upper bound of the random delay in seconds
    pub max_secs: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters carried over from the end of the previous chunk
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunking for the dialogue structuring stage
    pub dialogue: ChunkingConfig,

    /// Chunking for the article generation stage
    pub article: ChunkingConfig,

    /// Overall deadline for both stages, in seconds
    pub run_deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,

    /// yt-dlp executable
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the generated files
    pub dir: PathBuf,

    /// Markdown article file name
    pub article_file: String,

    /// JSON record file name
    pub record_file: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 5.0,
            max_secs: 10.0,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dialogue: ChunkingConfig {
                chunk_size: 12000,
                chunk_overlap: 500,
            },
            article: ChunkingConfig {
                chunk_size: 10000,
                chunk_overlap: 500,
            },
            run_deadline_secs: None,
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            article_file: "article.md".to_string(),
            record_file: "output.json".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ArticleError::Configuration("generation.endpoint must be set".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ArticleError::Configuration("generation.model must be set".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ArticleError::Configuration(format!(
                "generation.temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ArticleError::Configuration(
                "generation.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl PacingConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let finite = self.min_secs.is_finite() && self.max_secs.is_finite();
        if !finite || self.min_secs < 0.0 || self.min_secs > self.max_secs {
            return Err(ArticleError::Configuration(format!(
                "pacing interval [{}, {}] is invalid",
                self.min_secs, self.max_secs
            )));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Chunking parameters for a stage
    pub fn stage_config(&self, stage: Stage) -> StageConfig {
        let chunking = match stage {
            Stage::DialogueStructuring => self.dialogue,
            Stage::ArticleGeneration => self.article,
        };
        StageConfig {
            stage,
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        for stage in Stage::ALL {
            self.stage_config(stage).validate()?;
        }
        if self.run_deadline_secs == Some(0) {
            return Err(ArticleError::Configuration(
                "pipeline.run_deadline_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-article").join("config.yaml"))
    }

    /// Validate every section
    pub fn validate(&self) -> crate::Result<()> {
        self.generation.validate()?;
        self.pacing.validate()?;
        self.pipeline.validate()?;

        if self.captions.languages.is_empty() {
            return Err(ArticleError::Configuration(
                "captions.languages must list at least one language".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the generation API key, preferring the explicitly passed value
    pub fn api_key(&self, explicit: Option<&str>) -> crate::Result<String> {
        explicit
            .filter(|key| !key.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.generation.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ArticleError::Configuration(
                    "No API key configured. Set GROQ_API_KEY or generation.api_key in the config file".to_string(),
                )
            })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Endpoint: {}", self.generation.endpoint);
        println!("  Model: {}", self.generation.model);
        println!("  Temperature: {}", self.generation.temperature);
        println!("  Request Timeout: {}s", self.generation.timeout_secs);
        println!(
            "  API Key: {}",
            if self.generation.api_key.is_some() { "set" } else { "not set (using GROQ_API_KEY)" }
        );
        println!("  Pacing: {}s - {}s", self.pacing.min_secs, self.pacing.max_secs);
        println!(
            "  Dialogue Chunks: {} chars, {} overlap",
            self.pipeline.dialogue.chunk_size, self.pipeline.dialogue.chunk_overlap
        );
        println!(
            "  Article Chunks: {} chars, {} overlap",
            self.pipeline.article.chunk_size, self.pipeline.article.chunk_overlap
        );
        if let Some(deadline) = self.pipeline.run_deadline_secs {
            println!("  Run Deadline: {}s", deadline);
        }
        println!("  Caption Languages: {}", self.captions.languages.join(", "));
        println!("  Output Directory: {}", self.output.dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_below_size() {
        let mut config = Config::default();
        config.pipeline.article.chunk_overlap = config.pipeline.article.chunk_size;
        assert!(matches!(config.validate(), Err(ArticleError::Configuration(_))));
    }

    #[test]
    fn test_inverted_pacing_is_invalid() {
        let mut config = Config::default();
        config.pacing = PacingConfig {
            min_secs: 10.0,
            max_secs: 5.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stage_config_selection() {
        let pipeline = PipelineConfig::default();
        let dialogue = pipeline.stage_config(Stage::DialogueStructuring);
        assert_eq!(dialogue.chunk_size, 12000);
        let article = pipeline.stage_config(Stage::ArticleGeneration);
        assert_eq!(article.chunk_size, 10000);
        assert_eq!(article.stage, Stage::ArticleGeneration);
    }

    #[test]
    fn test_api_key_resolution() {
        let mut config = Config::default();
        assert!(config.api_key(None).is_err());
        assert!(config.api_key(Some("")).is_err());

        config.generation.api_key = Some("from-file".to_string());
        assert_eq!(config.api_key(None).unwrap(), "from-file");
        assert_eq!(config.api_key(Some("from-env")).unwrap(), "from-env");
    }

    #[test]
    fn test_load_from_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "pacing:\n  min_secs: 1.0\n  max_secs: 2.0\npipeline:\n  article:\n    chunk_size: 4000\n    chunk_overlap: 200\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pacing.max_secs, 2.0);
        assert_eq!(config.pipeline.article.chunk_size, 4000);
        assert_eq!(config.pipeline.dialogue.chunk_size, 12000);
        assert_eq!(config.generation.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_load_from_rejects_invalid_chunking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "pipeline:\n  dialogue:\n    chunk_size: 100\n    chunk_overlap: 100\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.captions.languages = vec!["de".to_string(), "en".to_string()];

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.captions.languages, vec!["de", "en"]);
    }
}
