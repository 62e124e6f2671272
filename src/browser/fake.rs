// Scripted in-memory browser for extractor and driver tests.
use crate::browser::{Browser, Page};
use crate::model::BrowserError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a URL serves when visited.
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub resolved_url: Option<String>,
    pub elements: HashMap<String, Vec<String>>,
    /// Selectors whose lookup raises instead of answering.
    pub broken: Vec<String>,
    pub content: String,
    pub fail_navigation: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect_to(mut self, url: &str) -> Self {
        self.resolved_url = Some(url.to_string());
        self
    }

    pub fn element(mut self, selector: &str, text: &str) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(text.to_string());
        self
    }

    pub fn broken(mut self, selector: &str) -> Self {
        self.broken.push(selector.to_string());
        self
    }

    pub fn content(mut self, html: &str) -> Self {
        self.content = html.to_string();
        self
    }

    pub fn unreachable() -> Self {
        Self {
            fail_navigation: true,
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    sites: HashMap<String, FakeSite>,
    visits: Arc<Mutex<Vec<String>>>,
    clicks: Arc<Mutex<Vec<String>>>,
    fail_new_page: bool,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site(mut self, url: &str, site: FakeSite) -> Self {
        self.sites.insert(url.to_string(), site);
        self
    }

    pub fn without_pages(mut self) -> Self {
        self.fail_new_page = true;
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// A page on its own, for driving an extractor directly.
    pub fn page(&self) -> FakePage {
        FakePage {
            sites: self.sites.clone(),
            visits: Arc::clone(&self.visits),
            clicks: Arc::clone(&self.clicks),
            current: None,
            url: String::new(),
        }
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError> {
        if self.fail_new_page {
            return Err(BrowserError::Driver("target closed".to_string()));
        }
        Ok(Box::new(self.page()))
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Err(BrowserError::Driver("already gone".to_string()))
    }
}

pub struct FakePage {
    sites: HashMap<String, FakeSite>,
    visits: Arc<Mutex<Vec<String>>>,
    clicks: Arc<Mutex<Vec<String>>>,
    current: Option<FakeSite>,
    url: String,
}

impl FakePage {
    fn loaded(&self, selector: &str) -> Result<&FakeSite, BrowserError> {
        let site = self.current.as_ref().ok_or(BrowserError::NotNavigated)?;
        if site.broken.iter().any(|s| s == selector) {
            return Err(BrowserError::Driver(format!(
                "execution context was destroyed while querying {selector}"
            )));
        }
        Ok(site)
    }
}

#[async_trait::async_trait]
impl Page for FakePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(url.to_string());
        }
        match self.sites.get(url) {
            Some(site) if !site.fail_navigation => {
                self.url = site.resolved_url.clone().unwrap_or_else(|| url.to_string());
                self.current = Some(site.clone());
                Ok(())
            }
            _ => Err(BrowserError::Timeout(timeout)),
        }
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let site = self.loaded(selector)?;
        Ok(site
            .elements
            .get(selector)
            .and_then(|texts| texts.first().cloned()))
    }

    async fn query_all_text(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let site = self.loaded(selector)?;
        Ok(site.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> Result<bool, BrowserError> {
        let found = self.query_text(selector).await?.is_some();
        if found {
            if let Ok(mut clicks) = self.clicks.lock() {
                clicks.push(selector.to_string());
            }
        }
        Ok(found)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        let site = self.current.as_ref().ok_or(BrowserError::NotNavigated)?;
        Ok(site.content.clone())
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Ok(())
    }
}
