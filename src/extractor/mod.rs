// Extractor module: per-site procedures turning a rendered page into a Record.
//
// Each field is looked up through an ordered list of strategies; the first one
// that yields a value wins. Lookup errors are logged and leave the field empty
// without stopping the remaining fields.

pub mod amazon;
pub mod flipkart;

pub use amazon::AmazonExtractor;
pub use flipkart::FlipkartExtractor;

use crate::browser::Page;
use crate::config::PageTiming;
use crate::model::{BrowserError, Record, Source};
use crate::normalizer::{clean_price, extract_isbn};
use crate::utils::truncate;

use tokio::time::sleep;
use tracing::{debug, info, warn};

#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    fn source(&self) -> Source;

    /// Visits `url` and reads whatever it can. Never fails: an unreachable
    /// page gives a record with every optional field absent.
    async fn extract(&self, page: &mut dyn Page, title: &str, id: u64, url: &str) -> Record;
}

/// Builds the extractor for `source`.
pub fn for_source(source: Source, timing: PageTiming) -> Box<dyn Extractor> {
    match source {
        Source::Amazon => Box::new(AmazonExtractor::new(timing)),
        Source::Flipkart => Box::new(FlipkartExtractor::new(timing)),
    }
}

/// Navigates and lets client-side rendering settle.
async fn open(
    page: &mut dyn Page,
    source: Source,
    url: &str,
    timing: &PageTiming,
) -> Result<(), BrowserError> {
    page.goto(url, timing.navigation_timeout).await?;
    sleep(timing.settle_delay).await;
    info!("{} URL: {}...", source, truncate(&page.url(), 60));
    Ok(())
}

/// Turns a field lookup into its value, logging errors and misses.
fn settle<T: std::fmt::Debug>(
    source: Source,
    field: &str,
    lookup: Result<Option<T>, BrowserError>,
) -> Option<T> {
    match lookup {
        Ok(Some(value)) => {
            info!("{} {} found: {:?}", source, field, value);
            Some(value)
        }
        Ok(None) => {
            debug!("{} {} not found", source, field);
            None
        }
        Err(e) => {
            warn!(
                "{} {} extraction error: {}",
                source,
                field,
                truncate(&e.to_string(), 30)
            );
            None
        }
    }
}

/// Trimmed text of the first selector whose first match is longer than one character.
async fn first_text(page: &dyn Page, selectors: &[&str]) -> Result<Option<String>, BrowserError> {
    for selector in selectors {
        if let Some(text) = page.query_text(selector).await? {
            let text = text.trim();
            if text.chars().count() > 1 {
                return Ok(Some(text.to_string()));
            }
        }
    }
    Ok(None)
}

/// Price from the first selector whose text cleans to a positive amount.
async fn first_price(page: &dyn Page, selectors: &[&str]) -> Result<Option<u64>, BrowserError> {
    for selector in selectors {
        if let Some(text) = page.query_text(selector).await? {
            if let Some(price) = clean_price(&text).filter(|&p| p > 0) {
                return Ok(Some(price));
            }
        }
    }
    Ok(None)
}

/// ISBN-13 from the first detail row that mentions an ISBN.
async fn isbn_from_rows(page: &dyn Page, rows: &str) -> Result<Option<String>, BrowserError> {
    let found = page
        .query_all_text(rows)
        .await?
        .iter()
        .filter(|row| row.contains("ISBN"))
        .find_map(|row| extract_isbn(row));
    Ok(found)
}

/// ISBN-13 anywhere in the rendered document.
async fn isbn_from_document(page: &dyn Page) -> Result<Option<String>, BrowserError> {
    Ok(extract_isbn(&page.content().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeBrowser, FakeSite};

    const URL: &str = "https://shop.test/item";

    fn page(site: FakeSite) -> crate::browser::fake::FakePage {
        FakeBrowser::new().site(URL, site).page()
    }

    #[tokio::test]
    async fn first_text_skips_short_and_missing() {
        let mut page = page(FakeSite::new().element("b", " x ").element("c", "  Jane Doe \n"));
        page.goto(URL, Default::default()).await.unwrap();

        let found = first_text(&page, &["a", "b", "c"]).await.unwrap();
        assert_eq!(found.as_deref(), Some("Jane Doe"));
        assert_eq!(first_text(&page, &["a", "b"]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_price_skips_zero_and_unparsable() {
        let mut page = page(
            FakeSite::new()
                .element("a", "Out of stock")
                .element("b", "₹0")
                .element("c", "₹1,299"),
        );
        page.goto(URL, Default::default()).await.unwrap();

        assert_eq!(first_price(&page, &["a", "b", "c"]).await.unwrap(), Some(1299));
    }

    #[tokio::test]
    async fn lookup_error_propagates_out_of_chain() {
        let mut page = page(FakeSite::new().broken("a").element("b", "Jane Doe"));
        page.goto(URL, Default::default()).await.unwrap();

        assert!(first_text(&page, &["a", "b"]).await.is_err());
    }

    #[tokio::test]
    async fn rows_must_mention_isbn() {
        let mut page = page(
            FakeSite::new()
                .element("li", "Item code: 9780000000002")
                .element("li", "ISBN-13 : 9780441013593"),
        );
        page.goto(URL, Default::default()).await.unwrap();

        assert_eq!(
            isbn_from_rows(&page, "li").await.unwrap().as_deref(),
            Some("9780441013593")
        );
    }

    #[test]
    fn settle_swallows_errors() {
        let value: Option<u64> = settle(
            Source::Amazon,
            "price",
            Err(BrowserError::Driver("boom".to_string())),
        );
        assert_eq!(value, None);
        assert_eq!(settle(Source::Amazon, "price", Ok(Some(5))), Some(5));
    }
}
