//! Channel ingestion.
//!
//! Pages the channel's uploads playlist through the Data API and inserts one
//! row per video. Duplicate URLs are skipped up front with
//! `ON CONFLICT DO NOTHING` — re-running sync after new uploads only adds
//! the new rows.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::youtube::YouTubeClient;

pub async fn run_sync(config: &Config) -> Result<()> {
    let client = YouTubeClient::new(config.api_key()?);

    let pool = db::connect(config).await?;
    migrate::ensure_current(&pool).await?;

    println!(
        "Fetching uploads for channel {}",
        config.youtube.channel_id
    );
    let playlist_id = client
        .uploads_playlist_id(&config.youtube.channel_id)
        .await?;
    let videos = client.list_uploads(&playlist_id).await?;

    let mut inserted = 0u64;
    for video in &videos {
        let result = sqlx::query(
            r#"
            INSERT INTO videos (url, title, published_at) VALUES (?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&video.url)
        .bind(&video.title)
        .bind(&video.published_at)
        .execute(&pool)
        .await?;
        inserted += result.rows_affected();
    }

    println!("sync {}", config.youtube.channel_id);
    println!("  fetched:  {} videos", videos.len());
    println!("  inserted: {}", inserted);
    println!("  skipped:  {} (already stored)", videos.len() as u64 - inserted);
    println!("ok");

    pool.close().await;
    Ok(())
}
