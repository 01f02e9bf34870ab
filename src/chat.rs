//! Live-chat replay access.
//!
//! [`ChatSource`] is the seam between the scanner and the chat transport:
//! the production implementation pages YouTube's InnerTube replay endpoint,
//! tests drive the scanner with synthetic streams. A video that never had a
//! chat replay is a distinguished, expected condition
//! ([`ChatError::NoChatReplay`]), not a generic fault.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::ChatEvent;

const INNERTUBE_CLIENT_VERSION: &str = "2.20240731.00.00";

#[derive(Debug, Error)]
pub enum ChatError {
    /// The video has no stored chat replay (uploads that never streamed
    /// live, or replays the channel has disabled). Recovered per video.
    #[error("no chat replay available")]
    NoChatReplay,

    #[error("chat transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected chat payload: {0}")]
    Parse(String),
}

/// Replay reader for one video.
#[async_trait]
pub trait ChatSource: Send + Sync {
    /// Full replay over `[0, duration_secs]`, events in non-decreasing
    /// time order.
    async fn replay(
        &self,
        video_url: &str,
        duration_secs: u64,
    ) -> Result<Vec<ChatEvent>, ChatError>;
}

/// Replay reader backed by YouTube's web-internal (InnerTube) API.
///
/// The watch page embeds the InnerTube key and, for videos with a replay, a
/// live-chat continuation token; `get_live_chat_replay` is then paged until
/// the continuation chain ends or the requested window is exhausted.
pub struct InnerTubeChat {
    client: reqwest::Client,
}

impl InnerTubeChat {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for InnerTubeChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatSource for InnerTubeChat {
    async fn replay(
        &self,
        video_url: &str,
        duration_secs: u64,
    ) -> Result<Vec<ChatEvent>, ChatError> {
        let html = self
            .client
            .get(video_url)
            .header("Accept-Language", "en-US,en")
            .send()
            .await?
            .text()
            .await?;

        let api_key = find_marked_string(&html, "\"INNERTUBE_API_KEY\":\"")
            .ok_or_else(|| ChatError::Parse("INNERTUBE_API_KEY not found in watch page".into()))?;
        let mut continuation = replay_continuation(&html).ok_or(ChatError::NoChatReplay)?;

        let mut events = Vec::new();
        loop {
            let body = serde_json::json!({
                "context": {
                    "client": {
                        "clientName": "WEB",
                        "clientVersion": INNERTUBE_CLIENT_VERSION,
                    }
                },
                "continuation": continuation,
            });

            let page: Value = self
                .client
                .post(format!(
                    "https://www.youtube.com/youtubei/v1/live_chat/get_live_chat_replay?key={}",
                    api_key
                ))
                .json(&body)
                .send()
                .await?
                .json()
                .await?;

            // A page without continuation contents marks the end of the replay
            let Some(live_chat) = page.pointer("/continuationContents/liveChatContinuation")
            else {
                break;
            };

            let mut past_window = false;
            if let Some(actions) = live_chat.pointer("/actions").and_then(Value::as_array) {
                for action in actions {
                    let Some(event) = chat_event_from_action(action) else {
                        continue;
                    };
                    if event.time_offset_secs > duration_secs {
                        past_window = true;
                        break;
                    }
                    events.push(event);
                }
            }
            if past_window {
                break;
            }

            match next_continuation(live_chat) {
                Some(next) => continuation = next,
                None => break,
            }
        }

        Ok(events)
    }
}

/// Read the string following `marker` up to the next `"` quote.
fn find_marked_string(html: &str, marker: &str) -> Option<String> {
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    if end == start {
        return None;
    }
    Some(html[start..end].to_string())
}

/// The replay continuation token embedded in the watch page, if the video
/// has a chat replay at all.
fn replay_continuation(html: &str) -> Option<String> {
    let renderer = html.find("\"liveChatRenderer\"")?;
    find_marked_string(&html[renderer..], "\"continuation\":\"")
}

fn next_continuation(live_chat: &Value) -> Option<String> {
    live_chat
        .pointer("/continuations/0/liveChatReplayContinuationData/continuation")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Pull the time offset and message text out of one raw replay action.
///
/// Returns `None` for actions that are not plain text messages (tickers,
/// membership events, placeholder items) or that are missing either field.
/// The millisecond offset is rounded to the nearest whole second and
/// clamped at zero — replays can carry pre-stream messages with negative
/// offsets.
fn chat_event_from_action(action: &Value) -> Option<ChatEvent> {
    let replay = action.pointer("/replayChatItemAction")?;
    let offset_msec: i64 = replay
        .pointer("/videoOffsetTimeMsec")?
        .as_str()?
        .parse()
        .ok()?;

    let renderer = replay.pointer(
        "/actions/0/addChatItemAction/item/liveChatTextMessageRenderer",
    )?;
    let runs = renderer.pointer("/message/runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|run| run.pointer("/text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return None;
    }

    let time_offset_secs = (offset_msec.max(0) as u64 + 500) / 1000;
    Some(ChatEvent {
        time_offset_secs,
        text,
    })
}
