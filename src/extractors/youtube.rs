use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;

use super::{parse_json3, AvailableTracks, Transcript, VideoMetadata, VideoSource};
use crate::config::CaptionConfig;
use crate::utils::extract_video_id;
use crate::{ArticleError, Result};

/// Fields read from `yt-dlp --dump-json`
#[derive(Debug, Clone, Deserialize)]
struct VideoInfo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(flatten)]
    tracks: AvailableTracks,
}

/// YouTube captions and metadata through yt-dlp
pub struct YoutubeSource {
    yt_dlp_path: String,
    languages: Vec<String>,
    client: reqwest::Client,
    /// Last video looked up, so captions and metadata share one yt-dlp call
    cache: Mutex<Option<VideoInfo>>,
}

impl YoutubeSource {
    pub fn new(config: &CaptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ArticleError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            languages: config.languages.clone(),
            client,
            cache: Mutex::new(None),
        })
    }

    /// Get video information using yt-dlp, reusing the previous lookup for the same video
    async fn video_info(&self, locator: &str) -> Result<VideoInfo> {
        let video_id = extract_video_id(locator)?;

        let mut cache = self.cache.lock().await;
        if let Some(info) = cache.as_ref().filter(|info| info.id == video_id) {
            return Ok(info.clone());
        }

        tracing::debug!("Extracting video info for: {}", video_id);
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", &url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ArticleError::source_unavailable(format!("running {}", self.yt_dlp_path), e))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ArticleError::source_unavailable(
                "looking up video information",
                format!("yt-dlp failed: {}", error.trim()),
            ));
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| ArticleError::source_unavailable("parsing yt-dlp output", e))?;

        *cache = Some(info.clone());
        Ok(info)
    }

    /// Download a caption track body
    async fn download_track(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArticleError::source_unavailable("downloading caption track", e))?;

        if !response.status().is_success() {
            return Err(ArticleError::source_unavailable(
                "downloading caption track",
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ArticleError::source_unavailable("reading caption track", e))
    }
}

#[async_trait]
impl VideoSource for YoutubeSource {
    async fn transcript(&self, locator: &str) -> Result<Transcript> {
        let info = self.video_info(locator).await?;

        let track = info
            .tracks
            .select(&self.languages)
            .ok_or_else(|| ArticleError::NoTranscriptAvailable {
                video_id: info.id.clone(),
            })?;

        tracing::info!(
            "Using {} captions ({}) for video {}",
            track.variant.as_str(),
            track.language,
            info.id
        );

        let body = self.download_track(&track.url).await?;
        let transcript = parse_json3(&body)?;

        if transcript.is_empty() {
            tracing::warn!("Caption track for video {} has no entries", info.id);
        }

        Ok(transcript)
    }

    async fn metadata(&self, locator: &str) -> Result<VideoMetadata> {
        let info = self.video_info(locator).await?;

        Ok(VideoMetadata {
            video_id: info.id,
            title: info.title.filter(|title| !title.trim().is_empty()),
            thumbnail: info.thumbnail,
        })
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_name() {
        let source = YoutubeSource::new(&CaptionConfig::default()).unwrap();
        assert_eq!(source.platform_name(), "YouTube");
    }

    #[test]
    fn test_video_info_from_dump() {
        let dump = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "An Interview",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "duration": 212,
            "language": "en",
            "subtitles": {},
            "automatic_captions": {
                "en-orig": [{"ext": "json3", "url": "https://captions/en-orig", "name": "English (Original)"}]
            }
        }"#;

        let info: VideoInfo = serde_json::from_str(dump).unwrap();
        assert_eq!(info.title.as_deref(), Some("An Interview"));

        let track = info.tracks.select(&["en".to_string()]).unwrap();
        assert_eq!(track.variant, super::super::CaptionVariant::Generated);
        assert_eq!(track.url, "https://captions/en-orig");
    }

    #[tokio::test]
    async fn test_missing_yt_dlp_is_source_unavailable() {
        let config = CaptionConfig {
            yt_dlp_path: "/nonexistent/yt-dlp-binary".to_string(),
            ..Default::default()
        };
        let source = YoutubeSource::new(&config).unwrap();

        let result = source.transcript("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(ArticleError::SourceUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_invalid_locator_is_rejected() {
        let source = YoutubeSource::new(&CaptionConfig::default()).unwrap();
        let result = source.metadata("not a video").await;
        assert!(matches!(result, Err(ArticleError::InvalidLocator(_))));
    }
}
