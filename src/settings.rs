use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::summary::DEFAULT_PREVIEW_LIMIT;
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

/// Timing and placement of the save prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptTimings {
    /// Wait after selection end before reading the selection.
    pub settle_delay_ms: u64,
    /// Lifetime of an unanswered prompt.
    pub display_timeout_ms: u64,
    /// Lifetime of the prompt once it shows a save error.
    pub error_timeout_ms: u64,
    /// Gap between the selection's bottom edge and the prompt.
    pub offset_px: f64,
}

impl Default for PromptTimings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 10,
            display_timeout_ms: 5_000,
            error_timeout_ms: 2_000,
            offset_px: 5.0,
        }
    }
}

impl PromptTimings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn display_timeout(&self) -> Duration {
        Duration::from_millis(self.display_timeout_ms)
    }

    pub fn error_timeout(&self) -> Duration {
        Duration::from_millis(self.error_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighlighterSettings {
    pub prompt: PromptTimings,
    /// How many highlights the summary lists before "and N more".
    pub summary_preview_limit: usize,
}

impl Default for HighlighterSettings {
    fn default() -> Self {
        Self {
            prompt: PromptTimings::default(),
            summary_preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<HighlighterSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings at {}: {err}", path.display());
                HighlighterSettings::default()
            })
        } else {
            HighlighterSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, HighlighterSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HighlighterSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> HighlighterSettings {
        self.read().clone()
    }

    pub fn prompt_timings(&self) -> PromptTimings {
        self.read().prompt
    }

    pub fn summary_preview_limit(&self) -> usize {
        self.read().summary_preview_limit
    }

    pub fn update_prompt_timings(&self, timings: PromptTimings) -> Result<()> {
        let mut guard = self.write();
        guard.prompt = timings;
        self.persist(&guard)
    }

    pub fn update_summary_preview_limit(&self, limit: usize) -> Result<()> {
        let mut guard = self.write();
        guard.summary_preview_limit = limit;
        self.persist(&guard)
    }

    fn persist(&self, data: &HighlighterSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: HighlighterSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.settings(), HighlighterSettings::default());
        assert_eq!(store.prompt_timings().display_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn updates_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_prompt_timings(PromptTimings {
                display_timeout_ms: 8_000,
                ..PromptTimings::default()
            })
            .unwrap();
        store.update_summary_preview_limit(3).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.prompt_timings().display_timeout_ms, 8_000);
        assert_eq!(reopened.summary_preview_limit(), 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"prompt":{"error_timeout_ms":500}}"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let timings = store.prompt_timings();
        assert_eq!(timings.error_timeout_ms, 500);
        assert_eq!(timings.settle_delay_ms, 10);
        assert_eq!(store.settings().summary_preview_limit, 5);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.settings(), HighlighterSettings::default());
        assert!(store.reload().is_err());
    }
}
