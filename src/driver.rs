// Batch driver: input list -> site visits -> output dataset
use crate::assembly::{IdSequence, placeholder_record};
use crate::browser::{self, Browser};
use crate::config::{AppConfig, PageTiming};
use crate::extractor::{self, Extractor};
use crate::input::read_books;
use crate::model::{BookRequest, Record, RunError, Source};
use crate::storage::{CsvStore, SaveSummary};
use crate::utils::truncate;

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub books: Vec<BookRequest>,
    pub records: Vec<Record>,
    pub saved: Option<SaveSummary>,
}

/// Visits every link of every book once, in order, and returns one record
/// per visit.
pub struct BatchDriver {
    extractors: Vec<Box<dyn Extractor>>,
    pacing: Duration,
}

impl BatchDriver {
    pub fn new(timing: PageTiming, pacing: Duration) -> Self {
        Self {
            extractors: vec![
                extractor::for_source(Source::Amazon, timing),
                extractor::for_source(Source::Flipkart, timing),
            ],
            pacing,
        }
    }

    fn extractor(&self, source: Source) -> Option<&dyn Extractor> {
        self.extractors
            .iter()
            .find(|e| e.source() == source)
            .map(|e| &**e)
    }

    pub async fn scrape_books(
        &self,
        browser: &dyn Browser,
        books: &[BookRequest],
        ids: &mut IdSequence,
    ) -> Vec<Record> {
        let mut records = Vec::new();
        for book in books {
            info!("=== Scraping: {} ===", book.title);
            for (source, url) in book.targets() {
                let id = match ids.next_id() {
                    Ok(id) => id,
                    Err(e) => {
                        warn!("Stopping batch: {}", e);
                        return records;
                    }
                };
                let record = self.scrape_one(browser, source, &book.title, id, url).await;
                info!(
                    "{}: Price={:?}, Author={:?}",
                    source, record.price, record.author
                );
                records.push(record);
                sleep(self.pacing).await;
            }
        }
        records
    }

    async fn scrape_one(
        &self,
        browser: &dyn Browser,
        source: Source,
        title: &str,
        id: u64,
        url: &str,
    ) -> Record {
        let Some(extractor) = self.extractor(source) else {
            warn!("No extractor for {}", source);
            return placeholder_record(id, title, source, url);
        };
        let mut page = match browser.new_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("{} error: {}", source, truncate(&e.to_string(), 50));
                return placeholder_record(id, title, source, url);
            }
        };

        let record = extractor.extract(page.as_mut(), title, id, url).await;

        if let Err(e) = page.close() {
            debug!("Page close failed: {}", e);
        }
        record
    }
}

/// Runs one batch: read input, scrape, append to the output dataset.
///
/// Input problems abort before the browser starts. Individual site visits
/// never abort the run.
pub async fn run(config: &AppConfig) -> Result<RunReport, RunError> {
    let books = read_books(&config.input_path, config.max_books)?;
    log_plan(&books);

    info!("Starting browser...");
    let browser = browser::launch(&config.browser)?;
    let report = run_with(config, books, browser.as_ref()).await;

    if let Err(e) = browser.close() {
        debug!("Browser close failed: {}", e);
    }
    report
}

/// Scrapes `books` with an already running browser and saves the results.
pub async fn run_with(
    config: &AppConfig,
    books: Vec<BookRequest>,
    browser: &dyn Browser,
) -> Result<RunReport, RunError> {
    let store = CsvStore::new(&config.output_path);
    let first = store.next_id()?;
    let mut ids = IdSequence::starting_at(first);
    info!("Appending to {} from id {}", store.path().display(), first);

    let driver = BatchDriver::new(config.page_timing(), config.pacing_delay());
    let records = driver.scrape_books(browser, &books, &mut ids).await;

    finish(&store, books, records)
}

fn log_plan(books: &[BookRequest]) {
    info!("Books to scrape: {}", books.len());
    for book in books {
        let sources: Vec<&str> = book
            .targets()
            .into_iter()
            .map(|(source, _)| source.as_str())
            .collect();
        info!("  - {} ({})", book.title, sources.join(", "));
    }
}

fn finish(
    store: &CsvStore,
    books: Vec<BookRequest>,
    records: Vec<Record>,
) -> Result<RunReport, RunError> {
    if records.is_empty() {
        info!("No results to save.");
        return Ok(RunReport {
            books,
            records,
            saved: None,
        });
    }

    let saved = store.append(&records)?;
    Ok(RunReport {
        books,
        records,
        saved: Some(saved),
    })
}
