//! Terminal histogram rendering.
//!
//! `heat plot <id>` recomputes one stored video's full histogram from its
//! chat replay (only the top-k summary is persisted) and renders it as a
//! bar chart, one line per bucket, with the hot buckets marked.

use anyhow::{bail, Result};
use sqlx::Row;

use crate::chat::{ChatError, ChatSource, InnerTubeChat};
use crate::config::Config;
use crate::db;
use crate::histogram::{build_histogram, top_k, KeywordFilter};
use crate::migrate;
use crate::youtube::YouTubeClient;

pub async fn run_plot(config: &Config, id: i64, width: usize) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::ensure_current(&pool).await?;

    let row = sqlx::query("SELECT url, title FROM videos WHERE id = ?")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    pool.close().await;

    let row = match row {
        Some(row) => row,
        None => bail!("video not found: {}", id),
    };
    let url: String = row.get("url");
    let title: Option<String> = row.get("title");

    let youtube = YouTubeClient::new(config.api_key()?);
    let chat = InnerTubeChat::new();
    let filter = KeywordFilter::new(config.keyword_list());

    let duration_secs = youtube.video_duration_secs(&url).await?;
    let events = match chat.replay(&url, duration_secs).await {
        Err(ChatError::NoChatReplay) => bail!("no chat replay available for video {}", id),
        other => other?,
    };

    let offsets: Vec<u64> = events
        .iter()
        .filter(|event| filter.matches(&event.text))
        .map(|event| event.time_offset_secs)
        .collect();

    let histogram = build_histogram(&offsets, config.scan.interval_secs);
    let (hot_times, _) = top_k(&histogram, config.scan.top_k, config.scan.interval_secs);

    println!(
        "video {} — {}",
        id,
        title.as_deref().unwrap_or("(untitled)")
    );
    println!(
        "{} matching messages in {} buckets of {}s",
        offsets.len(),
        histogram.len(),
        config.scan.interval_secs
    );
    println!();
    print!(
        "{}",
        render_histogram(&histogram, config.scan.interval_secs, width, &hot_times)
    );

    Ok(())
}

/// One line per bucket: clock time, bar scaled to the max bucket, count.
/// Hot buckets with a nonzero count get a trailing `*`.
pub fn render_histogram(histogram: &[u64], interval_secs: u64, width: usize, hot: &[u64]) -> String {
    let width = width.max(1);
    let max = histogram.iter().copied().max().unwrap_or(0).max(1);

    let mut out = String::new();
    for (i, &count) in histogram.iter().enumerate() {
        let start = i as u64 * interval_secs;
        let bar_len = ((count as u128 * width as u128) / max as u128) as usize;
        let marker = if count > 0 && hot.contains(&start) {
            " *"
        } else {
            ""
        };
        out.push_str(&format!(
            "{:>9} |{:<width$}| {}{}\n",
            clock(start),
            "█".repeat(bar_len),
            count,
            marker,
            width = width
        ));
    }
    out
}

fn clock(total_secs: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}
