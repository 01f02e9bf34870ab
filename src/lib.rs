//! # Replay Heat
//!
//! Find the hottest moments of a channel's stream archive from its
//! live-chat replays.
//!
//! Replay Heat ingests a YouTube channel's upload list into a local SQLite
//! store, then scans each video's live-chat replay: messages matching a
//! configured keyword list are bucketed into fixed-width time intervals and
//! the ten busiest buckets are written back onto the video row as its "hot"
//! timestamps.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │ YouTube Data │──▶│   videos     │◀──│ Live-chat │
//! │ API (sync)   │   │   (SQLite)   │   │ replay    │
//! └──────────────┘   └──────┬───────┘   │ (scan)    │
//!                           │           └───────────┘
//!                           ▼
//!                  top10 / max_message_count
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! heat init             # create database
//! heat sync             # fetch the channel's upload list
//! heat scan 0 50        # scan the first 50 stored videos
//! heat videos           # list rows and results
//! heat plot 3           # terminal histogram for one video
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`histogram`] | Time-bucket histogram and hot-moment selection |
//! | [`youtube`] | YouTube Data API v3 client |
//! | [`chat`] | Live-chat replay access |
//! | [`sync`] | Channel ingestion |
//! | [`scan`] | Per-video chat scan |
//! | [`plot`] | Terminal histogram rendering |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chat;
pub mod config;
pub mod db;
pub mod histogram;
pub mod migrate;
pub mod models;
pub mod plot;
pub mod scan;
pub mod stats;
pub mod sync;
pub mod videos;
pub mod youtube;
