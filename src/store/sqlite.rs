use async_trait::async_trait;
use serde_json::Value;

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

use super::KeyValueStore;

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let Some(raw) = self.get_value(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let serialized =
            serde_json::to_string(&value).map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            })?;
        self.put_value(key, serialized).await?;
        Ok(())
    }
}
