//! Persistence boundary.
//!
//! [`KeyValueStore`] is the durable map the rest of the crate writes through;
//! [`HighlightStore`] is the typed adapter over it and the only component that
//! writes highlight state.

mod memory;
mod sqlite;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::Highlight;

pub use memory::MemoryStore;

/// Key under which the full highlight list lives.
pub const HIGHLIGHTS_KEY: &str = "highlights";

/// A durable map from string keys to JSON values.
///
/// `set` replaces the whole value and is all-or-nothing.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct HighlightStore {
    backend: Arc<dyn KeyValueStore>,
}

impl HighlightStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Adapter over a SQLite database file, created if missing.
    pub fn open_sqlite(path: PathBuf) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(Database::new(path)?)))
    }

    /// Oldest-first list; empty when nothing has been stored yet.
    pub async fn load_highlights(&self) -> StoreResult<Vec<Highlight>> {
        match self.backend.get(HIGHLIGHTS_KEY).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|source| StoreError::Malformed {
                key: HIGHLIGHTS_KEY.to_string(),
                source,
            }),
        }
    }

    /// Replace the stored list. `highlights` must be oldest-first.
    pub async fn save_highlights(&self, highlights: &[Highlight]) -> StoreResult<()> {
        let value =
            serde_json::to_value(highlights).map_err(|source| StoreError::Serialization {
                key: HIGHLIGHTS_KEY.to_string(),
                source,
            })?;
        self.backend.set(HIGHLIGHTS_KEY, value).await
    }
}
