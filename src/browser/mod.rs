// Browser module: the page-automation contract and its backends.

pub mod http;
#[cfg(feature = "chrome")]
pub mod chrome;
#[cfg(test)]
pub mod fake;
mod traits;

pub use traits::{Browser, Page};

use crate::config::{BackendKind, BrowserConfig};
use crate::model::BrowserError;
use tracing::info;

/// Opens the browsing context selected by `cfg.backend`.
pub fn launch(cfg: &BrowserConfig) -> Result<Box<dyn Browser>, BrowserError> {
    info!(
        "Launching {:?} browser ({}x{})",
        cfg.backend, cfg.viewport.width, cfg.viewport.height
    );
    match cfg.backend {
        BackendKind::Http => Ok(Box::new(http::HttpBrowser::new(cfg)?)),
        #[cfg(feature = "chrome")]
        BackendKind::Chrome => Ok(Box::new(chrome::ChromeBrowser::launch(cfg)?)),
        #[cfg(not(feature = "chrome"))]
        BackendKind::Chrome => Err(BrowserError::Launch(
            "built without the `chrome` feature".to_string(),
        )),
    }
}
