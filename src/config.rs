use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Static HTML over plain HTTP.
    Http,
    /// Headless Chromium (requires the `chrome` feature).
    Chrome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub backend: BackendKind,
    pub user_agent: String,
    pub viewport: Viewport,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub max_books: usize,
    pub navigation_timeout_secs: u64,
    pub settle_delay_secs: u64,
    pub overlay_settle_secs: u64,
    pub pacing_delay_secs: u64,
    pub browser: BrowserConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("book_list.csv"),
            output_path: PathBuf::from("book_daily.csv"),
            max_books: 5,
            navigation_timeout_secs: 60,
            settle_delay_secs: 4,
            overlay_settle_secs: 1,
            pacing_delay_secs: 3,
            browser: BrowserConfig::default(),
        }
    }
}

/// Delays and timeouts an extractor applies around a page visit.
#[derive(Debug, Clone, Copy)]
pub struct PageTiming {
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub overlay_settle: Duration,
}

impl AppConfig {
    pub fn page_timing(&self) -> PageTiming {
        PageTiming {
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            overlay_settle: Duration::from_secs(self.overlay_settle_secs),
        }
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_secs(self.pacing_delay_secs)
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Loads `path` if it exists; a missing file yields the defaults unless
/// `required` is set.
pub fn load_or_default(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    if !required && !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path)
}
