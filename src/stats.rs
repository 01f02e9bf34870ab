//! Database statistics and health overview.
//!
//! Quick summary of what's stored and scanned: row counts, sentinel counts,
//! and the videos with the busiest buckets. Used by `heat stats` to give
//! confidence that sync and scan runs are doing what they should.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::HotMoments;

pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::ensure_current(&pool).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
        .fetch_one(&pool)
        .await?;

    let scanned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE top10 IS NOT NULL")
        .fetch_one(&pool)
        .await?;

    let no_replay: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE top10 = ?")
        .bind(HotMoments::NO_REPLAY)
        .fetch_one(&pool)
        .await?;

    let checked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE checked != 0")
        .fetch_one(&pool)
        .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Replay Heat — Database Stats");
    println!("============================");
    println!();
    println!("  Database:   {}", config.db.path.display());
    println!("  Size:       {}", format_bytes(db_size));
    println!();
    println!("  Videos:     {}", total);
    println!(
        "  Scanned:    {} / {} ({}%)",
        scanned,
        total,
        if total > 0 { (scanned * 100) / total } else { 0 }
    );
    println!("  No replay:  {}", no_replay);
    println!("  Reviewed:   {}", checked);

    let hottest = sqlx::query(
        r#"
        SELECT id, title, max_message_count FROM videos
        WHERE max_message_count IS NOT NULL AND top10 != ?
        ORDER BY max_message_count DESC, id ASC
        LIMIT 5
        "#,
    )
    .bind(HotMoments::NO_REPLAY)
    .fetch_all(&pool)
    .await?;

    if !hottest.is_empty() {
        println!();
        println!("  Hottest videos:");
        println!("  {:<6} {:>6}   {}", "ID", "MAX", "TITLE");
        println!("  {}", "-".repeat(60));
        for row in &hottest {
            let title: Option<String> = row.get("title");
            println!(
                "  {:<6} {:>6}   {}",
                row.get::<i64, _>("id"),
                row.get::<i64, _>("max_message_count"),
                title.as_deref().unwrap_or("(untitled)")
            );
        }
    }

    println!();

    pool.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
