mod assembly;
mod browser;
mod config;
mod driver;
mod extractor;
mod input;
mod model;
mod normalizer;
mod storage;
mod utils;

use clap::Parser;
use config::{AppConfig, BackendKind, load_or_default};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Scrapes book price, author and ISBN from Amazon India and Flipkart links.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Unattended mode: warnings only, no console summary.
    #[arg(long)]
    auto: bool,

    /// JSON config file. A missing file is only an error when given explicitly.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV with book_name and flipkart_link / amazon_link columns.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output CSV the new records are appended to.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Maximum number of input rows to read.
    #[arg(long)]
    max_books: Option<usize>,

    /// Browser backend.
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,
}

impl Cli {
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(input) = &self.input {
            cfg.input_path = input.clone();
        }
        if let Some(output) = &self.output {
            cfg.output_path = output.clone();
        }
        if let Some(max_books) = self.max_books {
            cfg.max_books = max_books;
        }
        if let Some(backend) = self.backend {
            cfg.browser.backend = backend;
        }
    }
}

fn init_logging(auto: bool) {
    let default_level = if auto { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.auto);

    // Load configuration from file
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = match load_or_default(&config_path, cli.config.is_some()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    let report = match driver::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!("Run aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !cli.auto {
        match report.saved {
            Some(saved) => {
                println!(
                    "\nSaved {} new records to {}",
                    saved.added,
                    config.output_path.display()
                );
                println!("Total records in {}: {}", config.output_path.display(), saved.total);
            }
            None => println!("\nNo results to save."),
        }
    }
    info!(
        "Done: {} books, {} records",
        report.books.len(),
        report.records.len()
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "book-price-scraper",
            "--auto",
            "--input",
            "in.csv",
            "--max-books",
            "2",
            "--backend",
            "chrome",
        ]);
        let mut cfg = AppConfig::default();
        cli.apply(&mut cfg);

        assert!(cli.auto);
        assert_eq!(cfg.input_path, PathBuf::from("in.csv"));
        assert_eq!(cfg.output_path, PathBuf::from("book_daily.csv"));
        assert_eq!(cfg.max_books, 2);
        assert_eq!(cfg.browser.backend, BackendKind::Chrome);
    }
}
