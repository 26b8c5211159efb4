//! The collection view: every stored highlight, newest first.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use log::{error, info};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    error::{StoreResult, SummaryError},
    models::Highlight,
    navigation::Navigator,
    settings::SettingsStore,
    store::HighlightStore,
    summary::{summarize_with_limit, DEFAULT_PREVIEW_LIMIT},
};

/// One rendered line of the collection list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRow {
    pub id: String,
    pub quoted_text: String,
    pub source: String,
    pub url: String,
    pub date: String,
}

/// e.g. `Oct 18, 2026, 07:44 AM`
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

pub fn count_label(count: usize) -> String {
    format!(
        "{count} highlight{} in your collection",
        if count == 1 { "" } else { "s" }
    )
}

/// In-memory newest-first view kept in step with the store.
///
/// Mutations rewrite the whole stored list and touch the view only after the
/// write succeeds. Another surface writing between our read and write loses
/// its change.
pub struct CollectionController {
    store: HighlightStore,
    navigator: Navigator,
    view: RwLock<Vec<Highlight>>,
    preview_limit: usize,
}

impl CollectionController {
    pub fn new(store: HighlightStore, navigator: Navigator) -> Self {
        Self {
            store,
            navigator,
            view: RwLock::new(Vec::new()),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }

    /// A controller whose summaries use the preview limit from `settings`.
    pub fn with_settings(
        store: HighlightStore,
        navigator: Navigator,
        settings: &SettingsStore,
    ) -> Self {
        Self::new(store, navigator).with_preview_limit(settings.summary_preview_limit())
    }

    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// Reload from the store. A failed read leaves the view empty.
    pub async fn load(&self) -> StoreResult<Vec<Highlight>> {
        match self.store.load_highlights().await {
            Ok(mut highlights) => {
                highlights.reverse();
                *self.view.write().await = highlights.clone();
                Ok(highlights)
            }
            Err(err) => {
                error!("Error loading highlights: {err}");
                self.view.write().await.clear();
                Err(err)
            }
        }
    }

    pub async fn highlights(&self) -> Vec<Highlight> {
        self.view.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.view.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.view.read().await.is_empty()
    }

    /// Remove `id` from the view and write the remainder back oldest-first.
    /// Returns false, without writing, when `id` is not in the view.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut view = self.view.write().await;
        if !view.iter().any(|h| h.id == id) {
            return Ok(false);
        }

        let remaining: Vec<Highlight> = view.iter().filter(|h| h.id != id).cloned().collect();
        let stored: Vec<Highlight> = remaining.iter().rev().cloned().collect();
        if let Err(err) = self.store.save_highlights(&stored).await {
            error!("Error deleting highlight {id}: {err}");
            return Err(err);
        }

        *view = remaining;
        info!("Deleted highlight {id}");
        Ok(true)
    }

    /// Delete everything once `confirm` agrees. Returns whether anything was
    /// written.
    pub async fn clear_all<F>(&self, confirm: F) -> StoreResult<bool>
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return Ok(false);
        }

        let mut view = self.view.write().await;
        if let Err(err) = self.store.save_highlights(&[]).await {
            error!("Error clearing highlights: {err}");
            return Err(err);
        }
        view.clear();
        info!("Cleared all highlights");
        Ok(true)
    }

    /// Summary of the current view.
    pub async fn summarize(&self) -> Result<String, SummaryError> {
        let view = self.view.read().await;
        if view.is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(summarize_with_limit(&view, self.preview_limit))
    }

    pub async fn rows(&self) -> Vec<HighlightRow> {
        self.rows_in(&Local).await
    }

    pub async fn rows_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<HighlightRow>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.view
            .read()
            .await
            .iter()
            .map(|h| HighlightRow {
                id: h.id.clone(),
                quoted_text: format!("\"{}\"", h.text),
                source: h.display_title().to_string(),
                url: h.url.clone(),
                date: format_timestamp(&h.timestamp, tz),
            })
            .collect()
    }

    pub async fn count_label(&self) -> String {
        count_label(self.len().await)
    }

    /// Open the page a highlight came from.
    pub async fn open_source(&self, id: &str) -> Result<()> {
        let url = self
            .view
            .read()
            .await
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.url.clone())
            .ok_or_else(|| anyhow!("no highlight with id {id}"))?;
        self.navigator.open(&url)
    }
}
