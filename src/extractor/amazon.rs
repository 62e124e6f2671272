// Amazon India product pages
use crate::assembly::placeholder_record;
use crate::browser::Page;
use crate::config::PageTiming;
use crate::extractor::{Extractor, first_price, first_text, isbn_from_document, isbn_from_rows, open, settle};
use crate::model::{BrowserError, Record, Source};
use crate::normalizer::{extract_author_from_title, extract_isbn_from_url_path};
use crate::utils::{now_local, truncate};

use tracing::warn;

const AUTHOR_SELECTORS: &[&str] = &[
    "#bylineInfo .author a",
    "#bylineInfo a.contributorNameID",
    "#bylineInfo a",
    ".author a",
    "a.a-link-normal.contributorNameID",
    "#bylineInfo span.author a",
];

const TITLE: &str = "#productTitle";

const PRICE_SELECTORS: &[&str] = &[
    "span.a-price-whole",
    "#corePrice_feature_div span.a-price-whole",
    ".a-price .a-offscreen",
];

const DETAIL_ROWS: &str = "#detailBullets_feature_div li, #productDetails_detailBullets_sections1 tr, .detail-bullet-list span";

pub struct AmazonExtractor {
    timing: PageTiming,
}

impl AmazonExtractor {
    pub fn new(timing: PageTiming) -> Self {
        Self { timing }
    }
}

/// Byline links, then the product title annotation.
async fn lookup_author(page: &dyn Page) -> Result<Option<String>, BrowserError> {
    if let Some(author) = first_text(page, AUTHOR_SELECTORS).await? {
        return Ok(Some(author));
    }
    Ok(page
        .query_text(TITLE)
        .await?
        .and_then(|title| extract_author_from_title(&title)))
}

/// Detail rows, then the whole page, then the `/dp/` token of the requested URL.
async fn lookup_isbn(page: &dyn Page, requested_url: &str) -> Result<Option<String>, BrowserError> {
    if let Some(isbn) = isbn_from_rows(page, DETAIL_ROWS).await? {
        return Ok(Some(isbn));
    }
    if let Some(isbn) = isbn_from_document(page).await? {
        return Ok(Some(isbn));
    }
    Ok(extract_isbn_from_url_path(requested_url))
}

#[async_trait::async_trait]
impl Extractor for AmazonExtractor {
    fn source(&self) -> Source {
        Source::Amazon
    }

    async fn extract(&self, page: &mut dyn Page, title: &str, id: u64, url: &str) -> Record {
        if let Err(e) = open(page, Source::Amazon, url, &self.timing).await {
            warn!("Amazon error: {}", truncate(&e.to_string(), 40));
            return placeholder_record(id, title, Source::Amazon, url);
        }

        let author = settle(Source::Amazon, "author", lookup_author(page).await);
        let price = settle(Source::Amazon, "price", first_price(page, PRICE_SELECTORS).await);
        let isbn = settle(Source::Amazon, "ISBN", lookup_isbn(page, url).await);

        Record {
            id,
            isbn,
            title: title.to_string(),
            author,
            source: Source::Amazon,
            price,
            timestamp: now_local(),
            url: page.url(),
        }
    }
}
