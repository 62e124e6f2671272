// Headless Chromium backend. The driver calls are blocking, so each one runs
// under `block_in_place` to keep the runtime worker usable.
use crate::browser::{Browser, Page};
use crate::config::BrowserConfig;
use crate::model::BrowserError;

use headless_chrome::{Browser as Chromium, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::block_in_place;
use tracing::debug;

fn driver_err(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Driver(e.to_string())
}

pub struct ChromeBrowser {
    browser: Chromium,
    user_agent: String,
}

impl ChromeBrowser {
    pub fn launch(cfg: &BrowserConfig) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(cfg.headless)
            .window_size(Some((cfg.viewport.width, cfg.viewport.height)))
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        let browser = Chromium::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self {
            browser,
            user_agent: cfg.user_agent.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Browser for ChromeBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError> {
        let tab = block_in_place(|| {
            let tab = self.browser.new_tab().map_err(driver_err)?;
            tab.set_user_agent(&self.user_agent, None, None)
                .map_err(driver_err)?;
            Ok::<_, BrowserError>(tab)
        })?;
        Ok(Box::new(ChromePage { tab }))
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        // The Chromium process is killed when the handle drops.
        drop(self.browser);
        Ok(())
    }
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Evaluates `expression` and decodes its string result as JSON.
    fn eval_json<T: serde::de::DeserializeOwned>(&self, expression: &str) -> Result<T, BrowserError> {
        let remote = block_in_place(|| self.tab.evaluate(expression, false)).map_err(driver_err)?;
        let raw = remote
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| BrowserError::Driver("script returned no value".to_string()))?;
        serde_json::from_str(raw).map_err(driver_err)
    }
}

fn quoted(selector: &str) -> Result<String, BrowserError> {
    serde_json::to_string(selector).map_err(driver_err)
}

#[async_trait::async_trait]
impl Page for ChromePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        block_in_place(|| {
            self.tab.set_default_timeout(timeout);
            self.tab
                .navigate_to(url)
                .and_then(|tab| tab.wait_until_navigated())
                .map(|_| ())
                .map_err(driver_err)
        })
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let script = format!(
            "JSON.stringify((() => {{ const el = document.querySelector({}); return el ? el.textContent : null; }})())",
            quoted(selector)?
        );
        self.eval_json(&script)
    }

    async fn query_all_text(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({})).map(el => el.textContent || ''))",
            quoted(selector)?
        );
        self.eval_json(&script)
    }

    async fn click(&self, selector: &str) -> Result<bool, BrowserError> {
        let script = format!(
            "JSON.stringify((() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})())",
            quoted(selector)?
        );
        self.eval_json(&script)
    }

    async fn content(&self) -> Result<String, BrowserError> {
        block_in_place(|| self.tab.get_content()).map_err(driver_err)
    }

    fn url(&self) -> String {
        self.tab.get_url()
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let closed = block_in_place(|| self.tab.close(true)).map_err(driver_err)?;
        debug!("Tab closed: {}", closed);
        Ok(())
    }
}
