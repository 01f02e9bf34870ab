use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub youtube: YouTubeConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YouTubeConfig {
    /// Data API v3 key. The `YOUTUBE_API_KEY` environment variable takes
    /// precedence, so the key can be kept out of the config file entirely.
    #[serde(default)]
    pub api_key: Option<String>,
    pub channel_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Comma-separated keyword list; messages containing any keyword as a
    /// literal, case-sensitive substring are counted.
    pub keywords: String,

    /// Bucket width in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Number of hot moments recorded per video.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_interval_secs() -> u64 {
    20
}
fn default_top_k() -> usize {
    10
}

impl Config {
    /// Resolve the API key: environment variable wins over the config file.
    ///
    /// Only commands that reach the network need a key, so resolution is
    /// deferred to the call site instead of failing at load time.
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
        match &self.youtube.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => anyhow::bail!(
                "No YouTube API key: set YOUTUBE_API_KEY or [youtube].api_key in the config file"
            ),
        }
    }

    /// Split the configured keyword string once; empty segments are dropped.
    pub fn keyword_list(&self) -> Vec<String> {
        self.scan
            .keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.youtube.channel_id.trim().is_empty() {
        anyhow::bail!("youtube.channel_id must not be empty");
    }

    if config.keyword_list().is_empty() {
        anyhow::bail!("scan.keywords must contain at least one keyword");
    }

    if config.scan.interval_secs == 0 {
        anyhow::bail!("scan.interval_secs must be > 0");
    }

    if config.scan.top_k == 0 {
        anyhow::bail!("scan.top_k must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        Ok(config)
    }

    const BASE: &str = r#"
[db]
path = "data/heat.sqlite"

[youtube]
channel_id = "UCtest"

[scan]
keywords = "草, www ,,here"
"#;

    #[test]
    fn keyword_list_splits_and_trims() {
        let config = parse(BASE).unwrap();
        assert_eq!(config.keyword_list(), vec!["草", "www", "here"]);
    }

    #[test]
    fn scan_defaults_applied() {
        let config = parse(BASE).unwrap();
        assert_eq!(config.scan.interval_secs, 20);
        assert_eq!(config.scan.top_k, 10);
    }

    #[test]
    fn empty_keywords_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("heat.toml");
        std::fs::write(&path, BASE.replace("\"草, www ,,here\"", "\" , \"")).unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("heat.toml");
        std::fs::write(&path, format!("{}interval_secs = 0\n", BASE)).unwrap();
        assert!(load_config(&path).is_err());
    }
}
