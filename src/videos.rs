//! Stored-video listing.
//!
//! Prints the rows `heat sync` ingested along with whatever scan results
//! are attached, so a window for the next `heat scan` run can be picked by
//! eye.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::VideoRecord;

pub async fn run_videos(config: &Config, unscanned: bool, limit: Option<i64>) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::ensure_current(&pool).await?;

    let mut sql = String::from(
        "SELECT id, url, title, published_at, top10, max_message_count, checked FROM videos",
    );
    if unscanned {
        sql.push_str(" WHERE top10 IS NULL");
    }
    sql.push_str(" ORDER BY id ASC");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit.max(0)));
    }

    let rows = sqlx::query(&sql).fetch_all(&pool).await?;
    let records: Vec<VideoRecord> = rows
        .iter()
        .map(|row| VideoRecord {
            id: row.get("id"),
            url: row.get("url"),
            title: row.get("title"),
            published_at: row.get("published_at"),
            top10: row.get("top10"),
            max_message_count: row.get("max_message_count"),
            checked: row.get::<i64, _>("checked") != 0,
        })
        .collect();

    println!(
        "{:<6} {:<8} {:>6} {:<12} {:<40} {}",
        "ID", "SCANNED", "MAX", "PUBLISHED", "TITLE", "URL"
    );
    println!("{}", "-".repeat(110));
    for record in &records {
        let max_display = match record.max_message_count {
            Some(count) => count.to_string(),
            None => "-".to_string(),
        };
        println!(
            "{:<6} {:<8} {:>6} {:<12} {:<40} {}",
            record.id,
            if record.scanned() { "yes" } else { "no" },
            max_display,
            published_date(record.published_at.as_deref()),
            truncate_chars(record.title.as_deref().unwrap_or("(untitled)"), 38),
            record.url
        );
    }
    println!();
    println!("{} video(s)", records.len());

    pool.close().await;
    Ok(())
}

/// `published_at` is stored as the API's RFC 3339 string; show just the date.
fn published_date(published_at: Option<&str>) -> String {
    published_at
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate on character boundaries; titles are routinely multibyte.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_date_from_rfc3339() {
        assert_eq!(
            published_date(Some("2025-01-15T12:30:00Z")),
            "2025-01-15"
        );
        assert_eq!(published_date(Some("not a date")), "-");
        assert_eq!(published_date(None), "-");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 38), "short");
        let long = "あ".repeat(50);
        let truncated = truncate_chars(&long, 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.ends_with('…'));
    }
}
