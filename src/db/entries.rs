use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::Database;

impl Database {
    /// Raw JSON text stored under `key`.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to read '{key}'"))
        })
        .await
    }

    /// Insert or replace the whole value in one statement.
    pub async fn put_value(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write '{key}'"))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("store.sqlite3")).unwrap();

        assert_eq!(db.get_value("highlights").await.unwrap(), None);

        db.put_value("highlights", "[]".into()).await.unwrap();
        db.put_value("highlights", r#"[{"id":"1"}]"#.into()).await.unwrap();

        assert_eq!(
            db.get_value("highlights").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite3");

        {
            let db = Database::new(path.clone()).unwrap();
            db.put_value("k", "\"v\"".into()).await.unwrap();
        }

        let db = Database::new(path).unwrap();
        assert_eq!(db.get_value("k").await.unwrap().as_deref(), Some("\"v\""));
    }
}
