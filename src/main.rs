//! # Replay Heat CLI (`heat`)
//!
//! The `heat` binary is the interface for Replay Heat. It provides commands
//! for database initialization, channel ingestion, chat-replay scanning,
//! and inspecting results.
//!
//! ## Usage
//!
//! ```bash
//! heat --config ./config/heat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `heat init` | Create the SQLite database and run schema migrations |
//! | `heat sync` | Fetch the channel's upload list and store new rows |
//! | `heat scan <start> <end>` | Scan a row window of stored videos for hot moments |
//! | `heat videos` | List stored rows and their scan results |
//! | `heat plot <id>` | Render one video's chat histogram as a terminal bar chart |
//! | `heat stats` | Database summary |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! heat init --config ./config/heat.toml
//!
//! # Ingest the configured channel's uploads
//! heat sync
//!
//! # Scan the first hundred stored videos; shard the rest across runs
//! heat scan 0 100
//! heat scan 100 200
//!
//! # Inspect what's left
//! heat videos --unscanned
//!
//! # Look at one video's full histogram
//! heat plot 17 --width 80
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use replay_heat::{config, migrate, plot, scan, stats, sync, videos};

/// Replay Heat — find the hottest moments of a channel's stream archive
/// from its live-chat replays.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/heat.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "heat",
    about = "Replay Heat — find the hottest moments of a channel's stream archive from its live-chat replays",
    version,
    long_about = "Replay Heat ingests a YouTube channel's upload list into a local SQLite store, \
    then scans each video's live-chat replay: keyword-matching messages are bucketed into \
    fixed-width time intervals and the busiest buckets are recorded as the video's hot timestamps."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/heat.toml`. Database, channel, and scan
    /// settings are read from this file; the API key may instead come from
    /// the `YOUTUBE_API_KEY` environment variable.
    #[arg(long, global = true, default_value = "./config/heat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and runs the versioned schema
    /// migrations. This command is idempotent — running it multiple times
    /// is safe.
    Init,

    /// Fetch the channel's upload list and store new rows.
    ///
    /// Pages the channel's uploads playlist through the YouTube Data API
    /// and inserts `{url, title, published_at}` rows. Already-stored URLs
    /// are skipped.
    Sync,

    /// Scan a row window of stored videos for hot moments.
    ///
    /// Selects rows with `LIMIT (end-start) OFFSET start` and processes
    /// them one at a time: chat replay → keyword filter → histogram →
    /// top-k. Results overwrite any previous scan of the same rows, so
    /// re-running a window is safe.
    Scan {
        /// Row offset to start at (inclusive).
        start: i64,

        /// Row offset to stop before (exclusive).
        end: i64,
    },

    /// List stored videos and their scan results.
    Videos {
        /// Only show rows that have not been scanned yet.
        #[arg(long)]
        unscanned: bool,

        /// Maximum number of rows to list.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Render one video's chat histogram as a terminal bar chart.
    ///
    /// Recomputes the full histogram from the chat replay (only the top-k
    /// summary is persisted) and marks the hot buckets.
    Plot {
        /// Video row id.
        id: i64,

        /// Bar width in characters for the busiest bucket.
        #[arg(long, default_value_t = 60)]
        width: usize,
    },

    /// Database summary: totals, scan coverage, hottest videos.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync => {
            sync::run_sync(&cfg).await?;
        }
        Commands::Scan { start, end } => {
            scan::run_scan(&cfg, start, end).await?;
        }
        Commands::Videos { unscanned, limit } => {
            videos::run_videos(&cfg, unscanned, limit).await?;
        }
        Commands::Plot { id, width } => {
            plot::run_plot(&cfg, id, width).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
