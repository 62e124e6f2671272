use crate::model::BrowserError;
use std::time::Duration;

/// An isolated browsing context that hands out pages.
#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError>;

    /// Tears the context down. Pages must already be closed.
    fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// One tab. Queries read the page as it is after the last navigation.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    /// Navigates and waits for the load signal, failing after `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Text content of the first element matching `selector`.
    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Text content of every element matching `selector`, in document order.
    async fn query_all_text(&self, selector: &str) -> Result<Vec<String>, BrowserError>;

    /// Clicks the first element matching `selector`; `false` if none matched.
    async fn click(&self, selector: &str) -> Result<bool, BrowserError>;

    /// The full rendered document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// The resolved URL after navigation and redirects.
    fn url(&self) -> String;

    fn close(self: Box<Self>) -> Result<(), BrowserError>;
}
