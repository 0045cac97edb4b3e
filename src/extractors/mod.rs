use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod youtube;

use crate::utils::format_srt_timestamp;
use crate::{ArticleError, Result};

/// One timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Caption text
    pub text: String,
}

impl CaptionEntry {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Caption entries ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<CaptionEntry>,
}

impl Transcript {
    /// Build a transcript, ordering entries by start time. Negative times are clamped to zero.
    pub fn new(mut entries: Vec<CaptionEntry>) -> Self {
        for entry in &mut entries {
            entry.start = entry.start.max(0.0);
            entry.duration = entry.duration.max(0.0);
        }
        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { entries }
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SRT rendering: numbered blocks separated by blank lines
    pub fn to_srt(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    format_srt_timestamp(entry.start),
                    format_srt_timestamp(entry.end()),
                    entry.text
                )
            })
            .collect()
    }
}

/// Display fields passed through to the final output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

/// How a caption track was produced, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionVariant {
    /// Uploaded by the channel
    Manual,
    /// Speech recognition in the requested language
    Generated,
    /// Another language, machine translated
    Translated,
}

impl CaptionVariant {
    pub const PRIORITY: [CaptionVariant; 3] = [
        CaptionVariant::Manual,
        CaptionVariant::Generated,
        CaptionVariant::Translated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionVariant::Manual => "manual",
            CaptionVariant::Generated => "generated",
            CaptionVariant::Translated => "translated",
        }
    }
}

/// One downloadable rendition of a caption track
#[derive(Debug, Clone, Deserialize)]
pub struct TrackFormat {
    pub ext: String,
    pub url: String,
}

/// Caption tracks keyed by language code, as listed by yt-dlp
pub type TrackMap = BTreeMap<String, Vec<TrackFormat>>;

/// The caption track chosen for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub variant: CaptionVariant,
    pub language: String,
    pub url: String,
}

/// Format requested from the caption server
pub const TRACK_FORMAT: &str = "json3";

/// Tracks available for a video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableTracks {
    #[serde(default)]
    pub subtitles: TrackMap,
    #[serde(default)]
    pub automatic_captions: TrackMap,
    /// Spoken language reported by the platform
    #[serde(default)]
    pub language: Option<String>,
}

impl AvailableTracks {
    /// Try each variant in priority order; the first that matches wins
    pub fn select(&self, languages: &[String]) -> Option<CaptionTrack> {
        CaptionVariant::PRIORITY
            .iter()
            .find_map(|variant| self.locate(*variant, languages))
    }

    /// Find a track of one variant for the preferred languages
    pub fn locate(&self, variant: CaptionVariant, languages: &[String]) -> Option<CaptionTrack> {
        match variant {
            CaptionVariant::Manual => languages.iter().find_map(|lang| {
                find_language(&self.subtitles, lang).map(|(key, url)| CaptionTrack {
                    variant,
                    language: key,
                    url,
                })
            }),
            CaptionVariant::Generated => languages.iter().find_map(|lang| {
                let original = format!("{}-orig", lang);
                let url = json3_url(&self.automatic_captions, &original).or_else(|| {
                    let spoken = self.language.as_deref().is_some_and(|spoken| same_language(spoken, lang));
                    spoken.then(|| json3_url(&self.automatic_captions, lang)).flatten()
                })?;
                Some(CaptionTrack {
                    variant,
                    language: lang.clone(),
                    url,
                })
            }),
            CaptionVariant::Translated => languages.iter().find_map(|lang| {
                let from_manual = self
                    .subtitles
                    .iter()
                    .filter(|(key, _)| !same_language(key, lang))
                    .find_map(|(_, formats)| pick_format(formats))
                    .map(|url| format!("{}&tlang={}", url, urlencoding::encode(lang)));
                let url = from_manual.or_else(|| json3_url(&self.automatic_captions, lang))?;
                Some(CaptionTrack {
                    variant,
                    language: lang.clone(),
                    url,
                })
            }),
        }
    }
}

fn same_language(code: &str, lang: &str) -> bool {
    code == lang || code.split('-').next() == Some(lang)
}

fn pick_format(formats: &[TrackFormat]) -> Option<String> {
    formats
        .iter()
        .find(|format| format.ext == TRACK_FORMAT)
        .map(|format| format.url.clone())
}

fn json3_url(tracks: &TrackMap, key: &str) -> Option<String> {
    tracks.get(key).and_then(|formats| pick_format(formats))
}

/// Exact language key first, then regional variants such as `en-US`
fn find_language(tracks: &TrackMap, lang: &str) -> Option<(String, String)> {
    if let Some(url) = json3_url(tracks, lang) {
        return Some((lang.to_string(), url));
    }
    tracks
        .iter()
        .filter(|(key, _)| !key.ends_with("-orig") && same_language(key, lang))
        .find_map(|(key, formats)| pick_format(formats).map(|url| (key.clone(), url)))
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` caption document into a transcript
pub fn parse_json3(body: &str) -> Result<Transcript> {
    let document: Json3Document = serde_json::from_str(body)
        .map_err(|e| ArticleError::source_unavailable("parsing caption track", e))?;

    let entries = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(CaptionEntry {
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
                text,
            })
        })
        .collect();

    Ok(Transcript::new(entries))
}

/// Caption and metadata collaborator for a video locator
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch the caption transcript, or fail with `NoTranscriptAvailable`
    async fn transcript(&self, locator: &str) -> Result<Transcript>;

    /// Fetch display metadata; missing fields are left empty
    async fn metadata(&self, locator: &str) -> Result<VideoMetadata>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}
