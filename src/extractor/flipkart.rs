// Flipkart product pages
use crate::assembly::placeholder_record;
use crate::browser::Page;
use crate::config::PageTiming;
use crate::extractor::{Extractor, first_price, isbn_from_document, isbn_from_rows, open, settle};
use crate::model::{BrowserError, Record, Source};
use crate::normalizer::{extract_author_from_title, extract_isbn};
use crate::utils::{now_local, truncate};

use tokio::time::sleep;
use tracing::{debug, warn};

const OVERLAY_CLOSE: &str = "button._2KpZ6l._2doB4z, span._30XB9F";

const AUTHOR_ROWS: &str = "div._3k-BhJ div, table._14cfVK tr, div.row div";

const TITLE: &str = "h1 span, span.B_NuCI, h1.yhB1nd";

const PRICE_SELECTORS: &[&str] = &[
    "div.hZ3P6w",
    "div.Nx9bqj",
    "div.CEmiEU div.Nx9bqj",
    "div._30jeq3",
];

const ISBN_ROWS: &str = "div._3k-BhJ div, table._14cfVK tr, div.row";

pub struct FlipkartExtractor {
    timing: PageTiming,
}

impl FlipkartExtractor {
    pub fn new(timing: PageTiming) -> Self {
        Self { timing }
    }

    /// Closes the login overlay if one is showing.
    async fn dismiss_overlay(&self, page: &dyn Page) {
        match page.click(OVERLAY_CLOSE).await {
            Ok(true) => sleep(self.timing.overlay_settle).await,
            Ok(false) => debug!("No Flipkart overlay"),
            Err(e) => debug!("Overlay dismissal failed: {}", e),
        }
    }
}

/// Value of an `Author: <name>` specification row, first line only.
fn author_from_row(row: &str) -> Option<String> {
    if !row.contains("Author") {
        return None;
    }
    let value = row.split(':').nth(1)?.trim();
    let author = value.lines().next().unwrap_or_default().trim();
    (author.chars().count() > 1).then(|| author.to_string())
}

/// Specification rows, then the product title annotation.
async fn lookup_author(page: &dyn Page) -> Result<Option<String>, BrowserError> {
    let rows = page.query_all_text(AUTHOR_ROWS).await?;
    if let Some(author) = rows.iter().find_map(|row| author_from_row(row)) {
        return Ok(Some(author));
    }
    Ok(page
        .query_text(TITLE)
        .await?
        .and_then(|title| extract_author_from_title(&title)))
}

/// Specification rows, then the requested URL, then the resolved URL, then
/// the whole page.
async fn lookup_isbn(page: &dyn Page, requested_url: &str) -> Result<Option<String>, BrowserError> {
    if let Some(isbn) = isbn_from_rows(page, ISBN_ROWS).await? {
        return Ok(Some(isbn));
    }
    if let Some(isbn) = extract_isbn(requested_url).or_else(|| extract_isbn(&page.url())) {
        return Ok(Some(isbn));
    }
    isbn_from_document(page).await
}

#[async_trait::async_trait]
impl Extractor for FlipkartExtractor {
    fn source(&self) -> Source {
        Source::Flipkart
    }

    async fn extract(&self, page: &mut dyn Page, title: &str, id: u64, url: &str) -> Record {
        if let Err(e) = open(page, Source::Flipkart, url, &self.timing).await {
            warn!("Flipkart error: {}", truncate(&e.to_string(), 40));
            return placeholder_record(id, title, Source::Flipkart, url);
        }
        self.dismiss_overlay(page).await;

        let author = settle(Source::Flipkart, "author", lookup_author(page).await);
        let price = settle(Source::Flipkart, "price", first_price(page, PRICE_SELECTORS).await);
        let isbn = settle(Source::Flipkart, "ISBN", lookup_isbn(page, url).await);

        Record {
            id,
            isbn,
            title: title.to_string(),
            author,
            source: Source::Flipkart,
            price,
            timestamp: now_local(),
            url: page.url(),
        }
    }
}
