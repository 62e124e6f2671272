// Static HTML backend: reqwest for navigation, scraper for selector queries.
// No script runs, so pages render exactly as served.
use crate::browser::{Browser, Page};
use crate::config::BrowserConfig;
use crate::model::BrowserError;

use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(cfg: &BrowserConfig) -> Result<Self, BrowserError> {
        debug!(
            "HTTP backend ignores viewport {}x{}",
            cfg.viewport.width, cfg.viewport.height
        );
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, BrowserError> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            url: String::new(),
            html: None,
        }))
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Ok(())
    }
}

pub struct HttpPage {
    client: Client,
    url: String,
    html: Option<String>,
}

impl HttpPage {
    fn document(&self) -> Result<Html, BrowserError> {
        self.html
            .as_deref()
            .map(Html::parse_document)
            .ok_or(BrowserError::NotNavigated)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector).map_err(|_| BrowserError::Selector(selector.to_string()))
}

#[async_trait::async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str, limit: Duration) -> Result<(), BrowserError> {
        let load = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| BrowserError::Http(e.to_string()))?;

            if !response.status().is_success() {
                return Err(BrowserError::Status(response.status().as_u16()));
            }

            let resolved = response.url().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| BrowserError::Http(e.to_string()))?;
            Ok::<_, BrowserError>((resolved, body))
        };

        let (resolved, body) = timeout(limit, load)
            .await
            .map_err(|_| BrowserError::Timeout(limit))??;

        self.url = resolved;
        self.html = Some(body);
        Ok(())
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let selector = parse_selector(selector)?;
        let document = self.document()?;
        Ok(document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>()))
    }

    async fn query_all_text(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let selector = parse_selector(selector)?;
        let document = self.document()?;
        Ok(document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect())
    }

    async fn click(&self, selector: &str) -> Result<bool, BrowserError> {
        // Nothing to dismiss in a static document; report whether it exists.
        Ok(self.query_text(selector).await?.is_some())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.html.clone().ok_or(BrowserError::NotNavigated)
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn close(self: Box<Self>) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const PRODUCT: &str = r#"<!doctype html>
<html>
  <body>
    <div id="bylineInfo"><span class="author"><a>Frank Herbert</a></span></div>
    <ul id="detailBullets_feature_div">
      <li>Publisher : Ace</li>
      <li>ISBN-13 : 978-0441013593 / 9780441013593</li>
    </ul>
  </body>
</html>
"#;

    /// Serves `PRODUCT` at `/product`, redirects `/dp/...` there, and answers
    /// `/missing` with a 404. Handles `requests` requests, then stops.
    fn spawn_shop(requests: usize) -> (String, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            for _ in 0..requests {
                let Ok(request) = server.recv() else { break };
                let response = match request.url() {
                    "/product" => tiny_http::Response::from_string(PRODUCT).with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    ),
                    path if path.starts_with("/dp/") => tiny_http::Response::from_string("")
                        .with_status_code(302)
                        .with_header("Location: /product".parse::<tiny_http::Header>().unwrap()),
                    _ => tiny_http::Response::from_string("not found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn follows_redirects_and_queries_selectors() {
        let (base, server) = spawn_shop(2);
        let browser = HttpBrowser::new(&BrowserConfig::default()).unwrap();
        let mut page = browser.new_page().await.unwrap();

        page.goto(&format!("{base}/dp/0441013597"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.url(), format!("{base}/product"));
        assert_eq!(
            page.query_text("#bylineInfo .author a").await.unwrap().as_deref(),
            Some("Frank Herbert")
        );
        let rows = page
            .query_all_text("#detailBullets_feature_div li")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].contains("9780441013593"));
        assert_eq!(page.query_text("span.a-price-whole").await.unwrap(), None);
        assert!(page.content().await.unwrap().contains("detailBullets"));

        page.close().unwrap();
        server.join().unwrap();
    }

    #[tokio::test]
    async fn error_status_fails_navigation() {
        let (base, server) = spawn_shop(1);
        let browser = HttpBrowser::new(&BrowserConfig::default()).unwrap();
        let mut page = browser.new_page().await.unwrap();

        let err = page
            .goto(&format!("{base}/missing"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::Status(404)));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn queries_before_navigation_fail() {
        let browser = HttpBrowser::new(&BrowserConfig::default()).unwrap();
        let page = browser.new_page().await.unwrap();
        assert!(matches!(
            page.query_text("h1").await,
            Err(BrowserError::NotNavigated)
        ));
    }

    #[tokio::test]
    async fn bad_selector_is_an_error() {
        let browser = HttpBrowser::new(&BrowserConfig::default()).unwrap();
        let page = browser.new_page().await.unwrap();
        assert!(matches!(
            page.query_all_text("div[").await,
            Err(BrowserError::Selector(_))
        ));
    }
}
