// Core structs: Record, Source, BookRequest, and the error enums
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::utils::format_timestamp;

/// The shop a record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    Amazon,
    Flipkart,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "Amazon",
            Source::Flipkart => "Flipkart",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped observation of one book on one site.
///
/// Field order matches the output columns; optional fields serialize to
/// empty cells when nothing was found.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    #[serde(rename = "book_id")]
    pub id: u64,
    pub isbn: Option<String>,
    #[serde(rename = "book_name")]
    pub title: String,
    pub author: Option<String>,
    pub source: Source,
    pub price: Option<u64>,
    #[serde(rename = "scrape_ts", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub url: String,
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

/// One usable input row. At least one of the links is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRequest {
    pub title: String,
    pub amazon_url: Option<String>,
    pub flipkart_url: Option<String>,
}

impl BookRequest {
    /// Links to visit, Amazon first.
    pub fn targets(&self) -> Vec<(Source, &str)> {
        let mut targets = Vec::with_capacity(2);
        if let Some(url) = self.amazon_url.as_deref() {
            targets.push((Source::Amazon, url));
        }
        if let Some(url) = self.flipkart_url.as_deref() {
            targets.push((Source::Flipkart, url));
        }
        targets
    }
}

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid selector `{0}`")]
    Selector(String),
    #[error("page has not been navigated")]
    NotNavigated,
    /// Raised by the rendered backend only.
    #[cfg_attr(not(any(feature = "chrome", test)), allow(dead_code))]
    #[error("driver error: {0}")]
    Driver(String),
    #[error("browser launch failed: {0}")]
    Launch(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read input: {0}")]
    Read(#[from] csv::Error),
    #[error("missing required column `{column}` (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },
    #[error("input must have at least one of: flipkart_link, amazon_link")]
    NoLinkColumns,
    #[error("no books to scrape")]
    NoUsableRows,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("corrupt dataset: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
