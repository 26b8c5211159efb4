//! Tab-open boundary.

use std::sync::Arc;

use anyhow::Result;
use log::error;

/// Opens a URL in a new browsing context.
pub trait TabOpener: Send + Sync {
    fn open_tab(&self, url: &str) -> Result<()>;
}

/// Generic "open this URL" capability of the current context.
pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Prefers the tab opener; falls back to the generic opener when the tab
/// opener is missing or fails.
#[derive(Clone)]
pub struct Navigator {
    tabs: Option<Arc<dyn TabOpener>>,
    fallback: Arc<dyn UrlOpener>,
}

impl Navigator {
    pub fn new(tabs: Option<Arc<dyn TabOpener>>, fallback: Arc<dyn UrlOpener>) -> Self {
        Self { tabs, fallback }
    }

    pub fn open(&self, url: &str) -> Result<()> {
        if let Some(tabs) = &self.tabs {
            match tabs.open_tab(url) {
                Ok(()) => return Ok(()),
                Err(err) => error!("Error opening URL in new tab: {err:#}"),
            }
        }
        self.fallback.open_url(url)
    }
}
