//! Core data models used throughout Replay Heat.
//!
//! These types represent the videos, chat events, and scan results that flow
//! through the ingestion and scanning pipeline.

/// Video entry returned by the channel lister before storage.
#[derive(Debug, Clone)]
pub struct ChannelVideo {
    pub url: String,
    pub title: String,
    pub published_at: String,
}

/// Row in the `videos` table.
#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub top10: Option<String>,
    pub max_message_count: Option<i64>,
    pub checked: bool,
}

impl VideoRecord {
    /// A row counts as scanned once a result (real or sentinel) is attached.
    pub fn scanned(&self) -> bool {
        self.top10.is_some()
    }
}

/// One replayed live-chat message. Ephemeral — exists only while a single
/// video is being scanned, never persisted individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Offset from the start of the video, in whole seconds.
    pub time_offset_secs: u64,
    pub text: String,
}

/// Scan result for one video: the formatted start-times of the busiest
/// buckets plus the single maximum bucket count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotMoments {
    pub top_times: Vec<String>,
    pub max_count: u64,
}

impl HotMoments {
    /// Sentinel stored for videos that never had a chat replay.
    pub const NO_REPLAY: &'static str = "No chat replay";

    pub fn no_replay() -> Self {
        Self {
            top_times: vec![Self::NO_REPLAY.to_string()],
            max_count: 0,
        }
    }

    pub fn is_no_replay(&self) -> bool {
        self.max_count == 0
            && self.top_times.len() == 1
            && self.top_times[0] == Self::NO_REPLAY
    }

    /// Comma-joined form stored in the `top10` column.
    pub fn top10_column(&self) -> String {
        self.top_times.join(",")
    }
}
