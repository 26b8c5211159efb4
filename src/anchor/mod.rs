//! The write path: pending selection → persisted highlight → marked span.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use log::{error, info};

use crate::dom::{HostPage, Marked};
use crate::error::HighlightError;
use crate::models::{Highlight, PendingSelection};
use crate::store::HighlightStore;

/// Issues time-derived ids that strictly increase, even when two highlights
/// land in the same millisecond or the clock steps backwards.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id at `now`, kept above every id in `existing`.
    pub fn next_id(&self, now: DateTime<Utc>, existing: &[Highlight]) -> String {
        let floor = existing
            .iter()
            .filter_map(Highlight::id_millis)
            .max()
            .unwrap_or(i64::MIN);
        let candidate = now.timestamp_millis();

        let bump = |last: i64| {
            candidate
                .max(last.saturating_add(1))
                .max(floor.saturating_add(1))
        };
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        bump(previous).to_string()
    }
}

/// A highlight that made it to the store, and whether the page was marked.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedHighlight {
    pub highlight: Highlight,
    pub marked: Option<Marked>,
}

#[derive(Clone)]
pub struct Highlighter {
    store: HighlightStore,
    page: Arc<dyn HostPage>,
    ids: Arc<IdGenerator>,
}

impl Highlighter {
    pub fn new(store: HighlightStore, page: Arc<dyn HostPage>) -> Self {
        Self {
            store,
            page,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    pub fn page(&self) -> &Arc<dyn HostPage> {
        &self.page
    }

    pub fn store(&self) -> &HighlightStore {
        &self.store
    }

    /// Persist `pending` and mark it on the page.
    ///
    /// Persistence is all-or-nothing at the store. Marking runs only after a
    /// successful write and its failure never undoes the write.
    pub async fn confirm(
        &self,
        pending: &PendingSelection,
    ) -> Result<SavedHighlight, HighlightError> {
        let mut highlights = self.store.load_highlights().await?;

        let now = Utc::now();
        let highlight = Highlight::record(
            self.ids.next_id(now, &highlights),
            pending,
            self.page.url(),
            self.page.title(),
            now,
        );
        highlights.push(highlight.clone());

        if let Err(err) = self.store.save_highlights(&highlights).await {
            error!("Error saving highlight: {err}");
            return Err(err.into());
        }
        info!(
            "Highlight saved: {} ({} chars)",
            highlight.id,
            highlight.text.chars().count()
        );

        let marked = match self.page.try_annotate(pending.anchor()) {
            Ok(marked) => Some(marked),
            Err(err) => {
                info!("Could not add visual highlight: {err}");
                None
            }
        };

        self.page.clear_selection();

        Ok(SavedHighlight { highlight, marked })
    }

    /// Stored highlights that were captured on the current page.
    pub async fn page_highlights(&self) -> Result<Vec<Highlight>, HighlightError> {
        let url = self.page.url();
        let highlights = self.store.load_highlights().await?;
        Ok(highlights.into_iter().filter(|h| h.url == url).collect())
    }
}
