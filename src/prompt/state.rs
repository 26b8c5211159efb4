use serde::{Deserialize, Serialize};

use crate::models::PromptPosition;

pub const SAVE_LABEL: &str = "Save Highlight?";
pub const ERROR_LABEL: &str = "Error saving highlight";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PromptStatus {
    #[default]
    Idle,
    /// Offering to save the pending selection.
    Offering,
    /// Confirmed; the write is in flight.
    Saving,
    /// The write failed; the prompt shows an error until it expires.
    Failed,
}

/// What the prompt currently shows. Published on every transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptSnapshot {
    pub status: PromptStatus,
    pub generation: u64,
    pub position: Option<PromptPosition>,
    pub selection_text: Option<String>,
}

impl PromptSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.status != PromptStatus::Idle
    }

    pub fn label(&self) -> Option<&'static str> {
        match self.status {
            PromptStatus::Idle => None,
            PromptStatus::Offering | PromptStatus::Saving => Some(SAVE_LABEL),
            PromptStatus::Failed => Some(ERROR_LABEL),
        }
    }
}
