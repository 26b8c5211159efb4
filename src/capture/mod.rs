//! Host page events → pending selections and prompt transitions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    anchor::{Highlighter, SavedHighlight},
    dom::HostPage,
    models::{Highlight, PendingSelection},
    prompt::{Offer, PromptController},
    settings::{PromptTimings, SettingsStore},
    store::HighlightStore,
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const ESCAPE_KEY: &str = "Escape";

/// Signals consumed from the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// The user released the pointer after (possibly) selecting text.
    SelectionEnd,
    PointerDown {
        inside_prompt: bool,
    },
    KeyDown {
        key: String,
    },
    /// The user clicked the prompt.
    PromptClick,
    DocumentReady,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// A selection read is scheduled after the settle delay.
    Scheduled,
    /// A prompt was shown for a new pending selection.
    Prompted { generation: u64 },
    /// The selection was empty; any prompt was removed.
    Cleared,
    /// The prompt was dismissed without saving.
    Dismissed,
    Saved(SavedHighlight),
    SaveFailed(String),
    /// Highlights already stored for this page.
    Restored(Vec<Highlight>),
    Ignored,
}

pub struct SelectionCapture {
    page: Arc<dyn HostPage>,
    highlighter: Highlighter,
    prompt: PromptController,
    settle: Mutex<Option<JoinHandle<()>>>,
}

impl SelectionCapture {
    pub fn new(highlighter: Highlighter, prompt: PromptController) -> Arc<Self> {
        Arc::new(Self {
            page: highlighter.page().clone(),
            highlighter,
            prompt,
            settle: Mutex::new(None),
        })
    }

    /// Wire a capture context for `page` over `store`.
    pub fn for_page(
        store: HighlightStore,
        page: Arc<dyn HostPage>,
        timings: PromptTimings,
    ) -> Arc<Self> {
        let highlighter = Highlighter::new(store, page);
        let prompt = PromptController::new(highlighter.clone(), timings);
        Self::new(highlighter, prompt)
    }

    /// [`for_page`](Self::for_page) with the prompt timings from `settings`.
    pub fn with_settings(
        store: HighlightStore,
        page: Arc<dyn HostPage>,
        settings: &SettingsStore,
    ) -> Arc<Self> {
        Self::for_page(store, page, settings.prompt_timings())
    }

    pub fn prompt(&self) -> &PromptController {
        &self.prompt
    }

    pub async fn handle(self: &Arc<Self>, event: HostEvent) -> CaptureOutcome {
        match event {
            HostEvent::SelectionEnd => {
                self.schedule_capture().await;
                CaptureOutcome::Scheduled
            }
            HostEvent::PointerDown {
                inside_prompt: false,
            } => self.dismiss().await,
            HostEvent::PointerDown {
                inside_prompt: true,
            } => CaptureOutcome::Ignored,
            HostEvent::KeyDown { key } if key == ESCAPE_KEY => self.dismiss().await,
            HostEvent::KeyDown { .. } => CaptureOutcome::Ignored,
            HostEvent::PromptClick => match self.prompt.confirm().await {
                Ok(Some(saved)) => CaptureOutcome::Saved(saved),
                Ok(None) => CaptureOutcome::Ignored,
                Err(err) => CaptureOutcome::SaveFailed(err.to_string()),
            },
            HostEvent::DocumentReady => CaptureOutcome::Restored(self.restore().await),
        }
    }

    /// Read the live selection now and show or clear the prompt.
    pub async fn capture_now(&self) -> CaptureOutcome {
        let offset_px = self.prompt.timings().offset_px;
        let read = || {
            let live = self.page.selection()?;
            PendingSelection::from_live(live, self.page.scroll_offset(), offset_px)
        };

        match self.prompt.offer(read).await {
            Offer::Shown(generation) => CaptureOutcome::Prompted { generation },
            Offer::Hidden => CaptureOutcome::Cleared,
            Offer::SaveInFlight => CaptureOutcome::Ignored,
        }
    }

    /// Wait for the in-flight selection read, if any.
    pub async fn settled(&self) {
        let handle = self.settle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    log_error!("selection read task failed: {err}");
                }
            }
        }
    }

    /// A newer selection end supersedes a read that has not run yet.
    async fn schedule_capture(self: &Arc<Self>) {
        let delay = self.prompt.timings().settle_delay();
        let this = Arc::clone(self);

        let mut settle = self.settle.lock().await;
        if let Some(previous) = settle.take() {
            previous.abort();
        }
        *settle = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            this.capture_now().await;
        }));
    }

    async fn dismiss(&self) -> CaptureOutcome {
        if self.prompt.hide().await {
            CaptureOutcome::Dismissed
        } else {
            CaptureOutcome::Ignored
        }
    }

    async fn restore(&self) -> Vec<Highlight> {
        match self.highlighter.page_highlights().await {
            Ok(highlights) => {
                log_info!("Loaded {} highlights for this page", highlights.len());
                highlights
            }
            Err(err) => {
                log_warn!("Error loading highlights: {err}");
                Vec::new()
            }
        }
    }

    /// Feed host events through [`handle`](Self::handle) until the channel
    /// closes or `shutdown` fires.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<HostEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event).await;
                    }
                    None => break,
                },
                _ = shutdown.cancelled() => {
                    log_info!("selection capture shutting down");
                    break;
                }
            }
        }

        if let Some(handle) = self.settle.lock().await.take() {
            handle.abort();
        }
        self.prompt.hide().await;
    }
}
