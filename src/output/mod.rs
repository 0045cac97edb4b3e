use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::OutputConfig;
use crate::extractors::VideoMetadata;
use crate::{ArticleError, Result};

/// Version tag written into every record
pub const RECORD_VERSION: &str = "1.0.0";

/// Complete result of one run, handed to storage in one piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub video_url: String,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub raw_subtitles: String,
    pub structured_transcript: String,
    pub article: String,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub run_id: Uuid,
    pub video_id: String,
    pub processing_timestamp: DateTime<Utc>,
    pub version: String,
}

impl ArticleRecord {
    pub fn new(
        video_url: &str,
        video: VideoMetadata,
        raw_subtitles: String,
        structured_transcript: String,
        article: String,
    ) -> Self {
        Self {
            video_url: video_url.to_string(),
            title: video.title,
            thumbnail: video.thumbnail,
            raw_subtitles,
            structured_transcript,
            article,
            metadata: RecordMetadata {
                run_id: Uuid::new_v4(),
                video_id: video.video_id,
                processing_timestamp: Utc::now(),
                version: RECORD_VERSION.to_string(),
            },
        }
    }

    /// Article as Markdown, headed by the title and thumbnail when known
    pub fn to_markdown(&self) -> String {
        let mut markdown = String::new();

        if let Some(title) = &self.title {
            markdown.push_str(&format!("# {}\n\n", title));
        }
        if let Some(thumbnail) = &self.thumbnail {
            let alt = self.title.as_deref().unwrap_or("Video thumbnail");
            markdown.push_str(&format!("![{}]({})\n\n", alt, thumbnail));
        }

        markdown.push_str(self.article.trim_end());
        markdown.push('\n');
        markdown
    }
}

/// Paths written by [`OutputStore::persist`]
#[derive(Debug, Clone)]
pub struct PersistedPaths {
    pub article: PathBuf,
    pub record: PathBuf,
}

/// Writes the article and the run record to a directory
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
    article_file: String,
    record_file: String,
}

impl OutputStore {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            article_file: config.article_file.clone(),
            record_file: config.record_file.clone(),
        }
    }

    /// Write both artifacts
    pub async fn persist(&self, record: &ArticleRecord) -> Result<PersistedPaths> {
        fs_err::create_dir_all(&self.dir).map_err(persistence_error)?;

        let article = self.dir.join(&self.article_file);
        save_as_markdown(record, &article)?;

        let record_path = self.dir.join(&self.record_file);
        save_as_json(record, &record_path)?;

        Ok(PersistedPaths {
            article,
            record: record_path,
        })
    }
}

/// Save the article as a Markdown file
pub fn save_as_markdown(record: &ArticleRecord, path: &Path) -> Result<()> {
    fs_err::write(path, record.to_markdown()).map_err(persistence_error)?;
    tracing::info!("Article saved to {}", path.display());
    Ok(())
}

/// Save the full record as pretty-printed JSON
pub fn save_as_json(record: &ArticleRecord, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(record).map_err(persistence_error)?;
    fs_err::write(path, content).map_err(persistence_error)?;
    tracing::info!("Record saved to {}", path.display());
    Ok(())
}

fn persistence_error(error: impl ToString) -> ArticleError {
    ArticleError::Persistence(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(title: Option<&str>) -> ArticleRecord {
        ArticleRecord::new(
            "https://youtu.be/dQw4w9WgXcQ",
            VideoMetadata {
                video_id: "dQw4w9WgXcQ".to_string(),
                title: title.map(str::to_string),
                thumbnail: title.map(|_| "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg".to_string()),
            },
            "1\n00:00:00,000 --> 00:00:01,000\nHi\n\n".to_string(),
            "Host: Hi".to_string(),
            "The host said hi.\n".to_string(),
        )
    }

    #[test]
    fn test_markdown_with_metadata() {
        let markdown = sample_record(Some("An Interview")).to_markdown();
        assert!(markdown.starts_with("# An Interview\n\n![An Interview](https://i.ytimg.com/"));
        assert!(markdown.ends_with("The host said hi.\n"));
    }

    #[test]
    fn test_markdown_without_metadata() {
        assert_eq!(sample_record(None).to_markdown(), "The host said hi.\n");
    }

    #[tokio::test]
    async fn test_persist_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            dir: dir.path().join("out"),
            ..Default::default()
        };
        let record = sample_record(Some("An Interview"));

        let paths = OutputStore::new(&config).persist(&record).await.unwrap();

        let markdown = fs_err::read_to_string(&paths.article).unwrap();
        assert!(markdown.contains("The host said hi."));

        let json: serde_json::Value =
            serde_json::from_str(&fs_err::read_to_string(&paths.record).unwrap()).unwrap();
        assert_eq!(json["video_url"], "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(json["structured_transcript"], "Host: Hi");
        assert_eq!(json["metadata"]["version"], RECORD_VERSION);
        assert_eq!(json["metadata"]["video_id"], "dQw4w9WgXcQ");
        assert!(json["metadata"]["processing_timestamp"].is_string());
    }
}
