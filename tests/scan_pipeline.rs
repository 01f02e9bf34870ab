//! End-to-end scan pipeline tests driven through the trait seams.
//!
//! Synthetic chat streams and duration lookups stand in for the network so
//! the full flow — replay → filter → histogram → top-k → persistence — runs
//! against a real temporary SQLite database.

use async_trait::async_trait;
use sqlx::Row;
use std::path::Path;
use tempfile::TempDir;

use replay_heat::chat::{ChatError, ChatSource};
use replay_heat::config::{load_config, Config};
use replay_heat::histogram::KeywordFilter;
use replay_heat::models::{ChatEvent, HotMoments};
use replay_heat::scan::{process_video, save_hot_moments, ScanError};
use replay_heat::youtube::{DurationSource, YouTubeError};
use replay_heat::{db, migrate};

struct FakeDurations {
    secs: Option<u64>,
}

#[async_trait]
impl DurationSource for FakeDurations {
    async fn duration_secs(&self, video_url: &str) -> Result<u64, YouTubeError> {
        self.secs.ok_or_else(|| YouTubeError::DurationUnavailable {
            url: video_url.to_string(),
        })
    }
}

/// `events: None` simulates a video without a chat replay.
struct FakeChat {
    events: Option<Vec<ChatEvent>>,
}

#[async_trait]
impl ChatSource for FakeChat {
    async fn replay(
        &self,
        _video_url: &str,
        duration_secs: u64,
    ) -> Result<Vec<ChatEvent>, ChatError> {
        match &self.events {
            Some(events) => Ok(events
                .iter()
                .filter(|e| e.time_offset_secs <= duration_secs)
                .cloned()
                .collect()),
            None => Err(ChatError::NoChatReplay),
        }
    }
}

fn event(time_offset_secs: u64, text: &str) -> ChatEvent {
    ChatEvent {
        time_offset_secs,
        text: text.to_string(),
    }
}

fn write_config(root: &Path) -> Config {
    let config_path = root.join("heat.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"[db]
path = "{}/data/heat.sqlite"

[youtube]
api_key = "test-key"
channel_id = "UCtest"

[scan]
keywords = "ping"
interval_secs = 20
top_k = 10
"#,
            root.display()
        ),
    )
    .unwrap();
    load_config(&config_path).unwrap()
}

const URL: &str = "https://www.youtube.com/watch?v=test0001";

#[tokio::test]
async fn synthetic_stream_yields_expected_hot_moments() {
    // Matching messages at 1, 25, 26, 100, 101 with interval 20 give the
    // histogram [1, 2, 0, 0, 0, 2]; both count-2 buckets rank ahead of the
    // count-1 bucket at second 0.
    let chat = FakeChat {
        events: Some(vec![
            event(1, "ping"),
            event(25, "ping again"),
            event(26, "a ping!"),
            event(40, "unrelated"),
            event(100, "ping"),
            event(101, "pingping"),
        ]),
    };
    let durations = FakeDurations { secs: Some(200) };
    let filter = KeywordFilter::new(vec!["ping".to_string()]);

    let moments = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();

    assert_eq!(moments.max_count, 2);
    // six buckets in total, fewer than k=10, so all are listed
    assert_eq!(moments.top_times.len(), 6);
    assert_eq!(
        &moments.top_times[..3],
        &["0時間0分20秒", "0時間1分40秒", "0時間0分0秒"]
    );
}

#[tokio::test]
async fn no_matching_messages_degenerates_to_single_bucket() {
    let chat = FakeChat {
        events: Some(vec![event(10, "nothing"), event(50, "relevant here")]),
    };
    let durations = FakeDurations { secs: Some(100) };
    let filter = KeywordFilter::new(vec!["ping".to_string()]);

    let moments = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();

    assert_eq!(moments.max_count, 0);
    assert_eq!(moments.top_times, vec!["0時間0分0秒"]);
    assert!(!moments.is_no_replay());
}

#[tokio::test]
async fn missing_replay_yields_sentinel() {
    let chat = FakeChat { events: None };
    let durations = FakeDurations { secs: Some(100) };
    let filter = KeywordFilter::new(vec!["ping".to_string()]);

    let moments = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();

    assert_eq!(moments, HotMoments::no_replay());
    assert!(moments.is_no_replay());
    assert_eq!(moments.top10_column(), "No chat replay");
}

#[tokio::test]
async fn duration_failure_is_fatal_for_that_video_only() {
    let chat = FakeChat {
        events: Some(vec![event(5, "ping")]),
    };
    let filter = KeywordFilter::new(vec!["ping".to_string()]);

    // First video: duration lookup fails, scan aborts for it
    let broken = FakeDurations { secs: None };
    let err = process_video(URL, &broken, &chat, &filter, 20, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::LengthUnavailable(_)));

    // Next video in the batch proceeds normally
    let working = FakeDurations { secs: Some(60) };
    let moments = process_video(URL, &working, &chat, &filter, 20, 10)
        .await
        .unwrap();
    assert_eq!(moments.max_count, 1);
}

#[tokio::test]
async fn rescan_is_idempotent_and_overwrites_row() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    migrate::run_migrations(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    sqlx::query("INSERT INTO videos (url, title, published_at) VALUES (?, ?, ?)")
        .bind(URL)
        .bind("test stream")
        .bind("2025-01-01T00:00:00Z")
        .execute(&pool)
        .await
        .unwrap();
    let id: i64 = sqlx::query_scalar("SELECT id FROM videos WHERE url = ?")
        .bind(URL)
        .fetch_one(&pool)
        .await
        .unwrap();

    let chat = FakeChat {
        events: Some(vec![event(1, "ping"), event(25, "ping"), event(26, "ping")]),
    };
    let durations = FakeDurations { secs: Some(60) };
    let filter = KeywordFilter::new(config.keyword_list());

    let first = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();
    save_hot_moments(&pool, id, &first).await.unwrap();

    let second = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();
    save_hot_moments(&pool, id, &second).await.unwrap();

    // Identical input, identical result both times
    assert_eq!(first, second);

    let row = sqlx::query("SELECT top10, max_message_count, checked FROM videos WHERE id = ?")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(
        row.get::<String, _>("top10"),
        "0時間0分20秒,0時間0分0秒"
    );
    assert_eq!(row.get::<i64, _>("max_message_count"), 2);
    assert_eq!(row.get::<i64, _>("checked"), 0);

    pool.close().await;
}

#[tokio::test]
async fn sentinel_is_persisted() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    migrate::run_migrations(&config).await.unwrap();

    let pool = db::connect(&config).await.unwrap();
    sqlx::query("INSERT INTO videos (url) VALUES (?)")
        .bind(URL)
        .execute(&pool)
        .await
        .unwrap();

    save_hot_moments(&pool, 1, &HotMoments::no_replay())
        .await
        .unwrap();

    let row = sqlx::query("SELECT top10, max_message_count FROM videos WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("top10"), "No chat replay");
    assert_eq!(row.get::<i64, _>("max_message_count"), 0);

    pool.close().await;
}

#[tokio::test]
async fn replay_window_is_bounded_by_duration() {
    // Events past the reported duration never reach the histogram
    let chat = FakeChat {
        events: Some(vec![event(5, "ping"), event(500, "ping")]),
    };
    let durations = FakeDurations { secs: Some(60) };
    let filter = KeywordFilter::new(vec!["ping".to_string()]);

    let moments = process_video(URL, &durations, &chat, &filter, 20, 10)
        .await
        .unwrap();
    assert_eq!(moments.max_count, 1);
    assert_eq!(moments.top_times.len(), 1);
}
