use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::{watch, Mutex},
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    anchor::{Highlighter, SavedHighlight},
    dom::RangeAnchor,
    error::HighlightError,
    models::PendingSelection,
    settings::PromptTimings,
};

use super::{PromptSnapshot, PromptStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// What [`PromptController::offer`] did with the selection it read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Shown(u64),
    Hidden,
    /// A save is running; the prompt was left alone.
    SaveInFlight,
}

struct ActivePrompt {
    generation: u64,
    pending: PendingSelection,
    status: PromptStatus,
    /// Cancels the dismiss timer currently armed for this prompt.
    dismiss: CancellationToken,
}

impl ActivePrompt {
    fn snapshot(&self) -> PromptSnapshot {
        PromptSnapshot {
            status: self.status,
            generation: self.generation,
            position: Some(self.pending.position()),
            selection_text: Some(self.pending.text().to_string()),
        }
    }
}

/// Owns the single save prompt and its expiry timers.
///
/// Showing replaces the owned prompt, hiding clears it. Every timer is tied to
/// the generation it was armed for, so a stale timer never touches a newer
/// prompt.
#[derive(Clone)]
pub struct PromptController {
    slot: Arc<Mutex<Option<ActivePrompt>>>,
    generation: Arc<AtomicU64>,
    highlighter: Highlighter,
    timings: PromptTimings,
    state_tx: watch::Sender<PromptSnapshot>,
}

impl PromptController {
    pub fn new(highlighter: Highlighter, timings: PromptTimings) -> Self {
        let (state_tx, _) = watch::channel(PromptSnapshot::idle());
        Self {
            slot: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            highlighter,
            timings,
            state_tx,
        }
    }

    pub fn timings(&self) -> PromptTimings {
        self.timings
    }

    pub fn subscribe(&self) -> watch::Receiver<PromptSnapshot> {
        self.state_tx.subscribe()
    }

    pub async fn snapshot(&self) -> PromptSnapshot {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(ActivePrompt::snapshot)
            .unwrap_or_default()
    }

    pub async fn pending(&self) -> Option<PendingSelection> {
        self.slot.lock().await.as_ref().map(|p| p.pending.clone())
    }

    /// Replace any existing prompt with one for `pending`. Returns its
    /// generation, or `None` while a save is in flight.
    pub async fn show(&self, pending: PendingSelection) -> Option<u64> {
        match self.offer(|| Some(pending)).await {
            Offer::Shown(generation) => Some(generation),
            Offer::Hidden | Offer::SaveInFlight => None,
        }
    }

    /// Re-read the selection with `read` and show or hide the prompt to match.
    ///
    /// The read happens under the prompt lock, so it is ordered against the
    /// end of a save: either the save is still `Saving` and nothing changes,
    /// or the saved selection has already been cleared from the page.
    pub async fn offer<F>(&self, read: F) -> Offer
    where
        F: FnOnce() -> Option<PendingSelection>,
    {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().map(|p| p.status) == Some(PromptStatus::Saving) {
            return Offer::SaveInFlight;
        }

        match read() {
            Some(pending) => Offer::Shown(self.replace(&mut slot, pending)),
            None => {
                self.clear(&mut slot);
                Offer::Hidden
            }
        }
    }

    fn replace(&self, slot: &mut Option<ActivePrompt>, pending: PendingSelection) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dismiss = CancellationToken::new();
        if let Some(previous) = slot.take() {
            previous.dismiss.cancel();
        }

        self.arm_dismiss(generation, self.timings.display_timeout(), dismiss.clone());
        let prompt = ActivePrompt {
            generation,
            pending,
            status: PromptStatus::Offering,
            dismiss,
        };
        self.state_tx.send_replace(prompt.snapshot());
        *slot = Some(prompt);

        log_info!("Prompt {generation} shown");
        generation
    }

    fn clear(&self, slot: &mut Option<ActivePrompt>) -> bool {
        match slot.take() {
            Some(prompt) => {
                prompt.dismiss.cancel();
                self.state_tx.send_replace(PromptSnapshot::idle());
                true
            }
            None => false,
        }
    }

    /// Remove the prompt, if any, discarding its pending selection.
    pub async fn hide(&self) -> bool {
        let mut slot = self.slot.lock().await;
        self.clear(&mut slot)
    }

    /// Save the pending selection behind the prompt.
    ///
    /// `Ok(None)` when there is nothing to confirm (no prompt, or a save is
    /// already in flight). On failure the prompt switches to its error state
    /// and expires after the error timeout.
    pub async fn confirm(&self) -> Result<Option<SavedHighlight>, HighlightError> {
        let (generation, pending) = {
            let mut slot = self.slot.lock().await;
            match slot.as_mut() {
                Some(prompt) if prompt.status == PromptStatus::Offering => {
                    prompt.status = PromptStatus::Saving;
                    self.state_tx.send_replace(prompt.snapshot());
                    (prompt.generation, prompt.pending.clone())
                }
                _ => return Ok(None),
            }
        };

        match self.highlighter.confirm(&pending).await {
            Ok(saved) => {
                self.dismiss_saved(generation, pending.anchor()).await;
                Ok(Some(saved))
            }
            Err(err) => {
                log_error!("Prompt {generation} save failed: {err}");
                self.fail_generation(generation).await;
                Err(err)
            }
        }
    }

    /// Drop the prompt that started the save, or any later prompt offering
    /// the same range.
    async fn dismiss_saved(&self, generation: u64, anchor: &RangeAnchor) {
        let mut slot = self.slot.lock().await;
        let stale = slot
            .as_ref()
            .is_some_and(|p| p.generation == generation || p.pending.anchor() == anchor);
        if stale {
            self.clear(&mut slot);
        }
    }

    async fn fail_generation(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        let Some(prompt) = slot.as_mut().filter(|p| p.generation == generation) else {
            return;
        };

        prompt.dismiss.cancel();
        prompt.dismiss = CancellationToken::new();
        prompt.status = PromptStatus::Failed;
        self.arm_dismiss(generation, self.timings.error_timeout(), prompt.dismiss.clone());
        self.state_tx.send_replace(prompt.snapshot());
    }

    fn arm_dismiss(&self, generation: u64, after: Duration, token: CancellationToken) {
        let slot = self.slot.clone();
        let state_tx = self.state_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(after) => {
                    let mut guard = slot.lock().await;
                    // Cancellation may have raced the sleep; the token is authoritative.
                    if token.is_cancelled() {
                        return;
                    }
                    if guard.as_ref().map(|p| p.generation) == Some(generation) {
                        guard.take();
                        state_tx.send_replace(PromptSnapshot::idle());
                        log_info!("Prompt {generation} expired");
                    }
                }
            }
        });
    }
}
