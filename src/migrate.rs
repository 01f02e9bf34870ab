//! Versioned schema migrations.
//!
//! The schema is tracked with SQLite's `user_version` pragma and advanced
//! one version at a time by `heat init`. Other commands refuse to touch an
//! out-of-date database via [`ensure_current`] instead of migrating
//! implicitly.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Ordered migration steps; entry `i` brings the schema to version `i + 1`.
const MIGRATIONS: &[&[&str]] = &[
    // v1: video rows ingested from the channel's upload list
    &[r#"
        CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL UNIQUE,
            title TEXT,
            published_at TEXT,
            retrieved_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#],
    // v2: scan results attached per video
    &[
        "ALTER TABLE videos ADD COLUMN top10 TEXT",
        "ALTER TABLE videos ADD COLUMN max_message_count INTEGER",
        "ALTER TABLE videos ADD COLUMN checked INTEGER NOT NULL DEFAULT 0",
    ],
];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;

    let mut version = current_version(&pool).await?;
    for (i, statements) in MIGRATIONS.iter().enumerate() {
        let target = i as i64 + 1;
        if version >= target {
            continue;
        }
        for statement in statements.iter() {
            sqlx::query(statement).execute(&pool).await?;
        }
        // PRAGMA does not accept bind parameters
        sqlx::query(&format!("PRAGMA user_version = {}", target))
            .execute(&pool)
            .await?;
        version = target;
    }

    pool.close().await;
    Ok(())
}

/// Fail fast when the schema is behind the binary.
pub async fn ensure_current(pool: &SqlitePool) -> Result<()> {
    let version = current_version(pool).await?;
    if version < SCHEMA_VERSION {
        anyhow::bail!(
            "database schema is at version {} but version {} is required; run `heat init` first",
            version,
            SCHEMA_VERSION
        );
    }
    Ok(())
}

async fn current_version(pool: &SqlitePool) -> Result<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}
