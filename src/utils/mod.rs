use url::Url;

use crate::{ArticleError, Result};

/// Parse a URL, accepting only HTTP and HTTPS
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|_| ArticleError::InvalidLocator(format!("Invalid URL format: {}", url)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ArticleError::InvalidLocator(
            "URL must use HTTP or HTTPS protocol".to_string(),
        ));
    }

    Ok(parsed)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the YouTube video id from a URL or a bare id
pub fn extract_video_id(locator: &str) -> Result<String> {
    let locator = locator.trim();
    if is_video_id(locator) {
        return Ok(locator.to_string());
    }

    let invalid = || ArticleError::InvalidLocator(format!("Could not extract video ID from: {}", locator));

    let parsed = parse_http_url(locator)?;
    let host = parsed.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut segments = parsed.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let candidate = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed" | "shorts" | "v" | "live") => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    };

    candidate.filter(|id| is_video_id(id)).ok_or_else(invalid)
}

/// Convert seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for caption lookup", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_format_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_srt_timestamp(59.999), "00:00:59,999");
        assert_eq!(format_srt_timestamp(3725.042), "01:02:05,042");
    }

    #[test]
    fn test_extract_video_id() {
        let expected = "dQw4w9WgXcQ";
        for locator in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://youtu.be/dQw4w9WgXcQ?feature=shared",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(locator).unwrap(), expected, "{}", locator);
        }
    }

    #[test]
    fn test_extract_video_id_rejects_other_urls() {
        assert!(extract_video_id("https://vimeo.com/123456").is_err());
        assert!(extract_video_id("https://www.youtube.com/feed/trending").is_err());
        assert!(extract_video_id("https://youtu.be/short").is_err());
        assert!(extract_video_id("").is_err());
    }

    #[test]
    fn test_parse_http_url() {
        let parsed = parse_http_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(parsed.host_str(), Some("www.youtube.com"));
        assert!(parse_http_url("http://example.com").is_ok());
        assert!(matches!(parse_http_url("ftp://example.com"), Err(ArticleError::InvalidLocator(_))));
        assert!(matches!(parse_http_url("not-a-url"), Err(ArticleError::InvalidLocator(_))));
    }

    #[test]
    fn test_extract_video_id_rejects_non_http_scheme() {
        assert!(matches!(
            extract_video_id("ftp://youtu.be/dQw4w9WgXcQ"),
            Err(ArticleError::InvalidLocator(_))
        ));
    }
}
