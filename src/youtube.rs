//! YouTube Data API v3 client.
//!
//! Covers the three calls the pipeline needs: resolving a channel's uploads
//! playlist, paging through that playlist, and looking up a single video's
//! duration. API error payloads surface as typed errors so the scanner can
//! treat a failed duration lookup as fatal for that video only.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::ChannelVideo;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Error)]
pub enum YouTubeError {
    /// The video's length could not be determined (missing video, live
    /// premiere with no duration yet, or an unparseable duration string).
    #[error("video duration unavailable for {url}")]
    DurationUnavailable { url: String },

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("YouTube API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("YouTube API transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Video-length lookup, split out as a trait so the scanner can be driven
/// with synthetic durations in tests.
#[async_trait]
pub trait DurationSource: Send + Sync {
    async fn duration_secs(&self, video_url: &str) -> Result<u64, YouTubeError>;
}

pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Resolve the channel's auto-generated uploads playlist.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, YouTubeError> {
        let resp: ChannelListResponse = self
            .client
            .get(format!("{}/channels", API_BASE))
            .query(&[
                ("key", self.api_key.as_str()),
                ("id", channel_id),
                ("part", "contentDetails"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = resp.error {
            return Err(YouTubeError::Api {
                code: error.code,
                message: error.message,
            });
        }

        resp.items
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| YouTubeError::ChannelNotFound(channel_id.to_string()))
    }

    /// Page through the uploads playlist until no continuation token remains.
    pub async fn list_uploads(&self, playlist_id: &str) -> Result<Vec<ChannelVideo>, YouTubeError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/playlistItems", API_BASE))
                .query(&[
                    ("key", self.api_key.as_str()),
                    ("playlistId", playlist_id),
                    ("part", "snippet"),
                    ("maxResults", "50"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp: PlaylistItemsResponse = request.send().await?.json().await?;

            if let Some(error) = resp.error {
                return Err(YouTubeError::Api {
                    code: error.code,
                    message: error.message,
                });
            }

            for item in resp.items {
                // Deleted/private entries come back without a video id
                let Some(video_id) = item.snippet.resource_id.video_id else {
                    continue;
                };
                videos.push(ChannelVideo {
                    url: format!("https://www.youtube.com/watch?v={}", video_id),
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                });
            }

            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(videos)
    }

    /// Total video length in seconds via `videos.list part=contentDetails`.
    pub async fn video_duration_secs(&self, url: &str) -> Result<u64, YouTubeError> {
        let video_id = extract_video_id(url).ok_or_else(|| YouTubeError::DurationUnavailable {
            url: url.to_string(),
        })?;

        let resp: VideoListResponse = self
            .client
            .get(format!("{}/videos", API_BASE))
            .query(&[
                ("key", self.api_key.as_str()),
                ("id", video_id.as_str()),
                ("part", "contentDetails"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = resp.error {
            return Err(YouTubeError::Api {
                code: error.code,
                message: error.message,
            });
        }

        resp.items
            .into_iter()
            .next()
            .and_then(|item| parse_iso8601_duration(&item.content_details.duration))
            .ok_or_else(|| YouTubeError::DurationUnavailable {
                url: url.to_string(),
            })
    }
}

#[async_trait]
impl DurationSource for YouTubeClient {
    async fn duration_secs(&self, video_url: &str) -> Result<u64, YouTubeError> {
        self.video_duration_secs(video_url).await
    }
}

/// Pull the video id out of a `watch?v=` or `youtu.be/` URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some(pos) = url.find("v=") {
        let start = pos + 2;
        let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
        if end > start {
            return Some(url[start..end].to_string());
        }
    }
    if let Some(pos) = url.find("youtu.be/") {
        let start = pos + 9;
        let end = url[start..].find('?').map(|i| start + i).unwrap_or(url.len());
        if end > start {
            return Some(url[start..end].to_string());
        }
    }
    None
}

/// Parse the API's `PT#H#M#S` duration form into seconds.
///
/// Durations without a time component (`P0D`, returned for premieres that
/// have not run yet) are rejected — there is nothing to scan.
fn parse_iso8601_duration(s: &str) -> Option<u64> {
    let rest = s.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        total += match ch {
            'H' => value * 3600,
            'M' => value * 60,
            'S' => value,
            _ => return None,
        };
    }

    // Trailing digits without a unit designator
    if !digits.is_empty() {
        return None;
    }
    Some(total)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
    published_at: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    content_details: VideoContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT15M33S"), Some(933));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(7200));
    }

    #[test]
    fn parse_rejects_non_time_durations() {
        assert_eq!(parse_iso8601_duration("P0D"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("PT10"), None);
        assert_eq!(parse_iso8601_duration("PT3X"), None);
    }

    #[test]
    fn extract_id_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123&t=42"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn extract_id_from_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123?t=10"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn extract_id_missing() {
        assert_eq!(extract_video_id("https://example.com/nothing"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
    }
}
