//! Per-video chat scan.
//!
//! Walks a row-offset window of stored videos strictly sequentially: for
//! each video, look up its length, drain its chat replay, bucket the
//! keyword-matching timestamps, and write the hot moments back onto the
//! row. There is no cross-video state; re-running a window simply
//! overwrites the result columns.

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::chat::{ChatError, ChatSource, InnerTubeChat};
use crate::config::Config;
use crate::db;
use crate::histogram::{build_histogram, format_duration, top_k, KeywordFilter};
use crate::migrate;
use crate::models::HotMoments;
use crate::youtube::{DurationSource, YouTubeClient};

/// Failures that abort one video's scan. The batch keeps going either way.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The video's length could not be determined, so no replay window can
    /// be requested.
    #[error("video length unavailable: {0}")]
    LengthUnavailable(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Scan one video: duration → replay → keyword filter → histogram → top-k.
///
/// A missing chat replay is an expected condition and comes back as the
/// [`HotMoments::no_replay`] sentinel rather than an error; everything else
/// that goes wrong aborts this video only.
pub async fn process_video(
    video_url: &str,
    durations: &dyn DurationSource,
    chat: &dyn ChatSource,
    filter: &KeywordFilter,
    interval_secs: u64,
    k: usize,
) -> Result<HotMoments, ScanError> {
    let duration_secs = durations
        .duration_secs(video_url)
        .await
        .map_err(|e| ScanError::LengthUnavailable(e.to_string()))?;

    let events = match chat.replay(video_url, duration_secs).await {
        Ok(events) => events,
        Err(ChatError::NoChatReplay) => return Ok(HotMoments::no_replay()),
        Err(e) => return Err(e.into()),
    };

    let offsets: Vec<u64> = events
        .iter()
        .filter(|event| filter.matches(&event.text))
        .map(|event| event.time_offset_secs)
        .collect();

    let histogram = build_histogram(&offsets, interval_secs);
    let (times, _counts) = top_k(&histogram, k, interval_secs);
    let top_times = times.into_iter().map(format_duration).collect();
    let max_count = histogram.iter().copied().max().unwrap_or(0);

    Ok(HotMoments {
        top_times,
        max_count,
    })
}

/// Persist one video's result. Overwrites any previous scan of the row and
/// resets the manual review flag.
pub async fn save_hot_moments(
    pool: &SqlitePool,
    video_id: i64,
    moments: &HotMoments,
) -> Result<()> {
    sqlx::query("UPDATE videos SET top10 = ?, max_message_count = ?, checked = 0 WHERE id = ?")
        .bind(moments.top10_column())
        .bind(moments.max_count as i64)
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Scan the `LIMIT (end-start) OFFSET start` row window. The two indices
/// let large channels be sharded across invocations.
pub async fn run_scan(config: &Config, start: i64, end: i64) -> Result<()> {
    if start < 0 || end <= start {
        anyhow::bail!(
            "invalid scan range {}..{}: end must be greater than start",
            start,
            end
        );
    }

    let youtube = YouTubeClient::new(config.api_key()?);
    let chat = InnerTubeChat::new();
    let filter = KeywordFilter::new(config.keyword_list());

    let pool = db::connect(config).await?;
    migrate::ensure_current(&pool).await?;

    let rows = sqlx::query("SELECT id, url FROM videos ORDER BY id ASC LIMIT ? OFFSET ?")
        .bind(end - start)
        .bind(start)
        .fetch_all(&pool)
        .await?;

    let mut scanned = 0u64;
    let mut no_replay = 0u64;
    let mut failed = 0u64;

    for row in &rows {
        let id: i64 = row.get("id");
        let url: String = row.get("url");

        match process_video(
            &url,
            &youtube,
            &chat,
            &filter,
            config.scan.interval_secs,
            config.scan.top_k,
        )
        .await
        {
            Ok(moments) => {
                let sentinel = moments.is_no_replay();
                save_hot_moments(&pool, id, &moments).await?;
                if sentinel {
                    no_replay += 1;
                    println!("video {}: no chat replay", id);
                } else {
                    scanned += 1;
                    println!(
                        "video {}: max {} messages/bucket, hot at {}",
                        id,
                        moments.max_count,
                        moments.top_times.join(", ")
                    );
                }
            }
            Err(e) => {
                // Fatal for this video only; the rest of the window continues
                failed += 1;
                eprintln!("video {} ({}) failed: {}", id, url, e);
            }
        }
    }

    println!("scan {}..{}", start, end);
    println!("  selected:  {} videos", rows.len());
    println!("  scanned:   {}", scanned);
    println!("  no replay: {}", no_replay);
    println!("  failed:    {}", failed);
    println!("ok");

    pool.close().await;
    Ok(())
}
