use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PendingSelection;

/// Shown in place of an empty page title.
pub const UNKNOWN_PAGE: &str = "Unknown Page";

/// A saved text span with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub text: String,
    pub url: String,
    #[serde(default)]
    pub page_title: String,
    pub timestamp: DateTime<Utc>,
}

impl Highlight {
    /// Build a record from a pending selection. The text invariant (trimmed,
    /// non-empty) is carried by `PendingSelection`.
    pub fn record(
        id: String,
        pending: &PendingSelection,
        url: impl Into<String>,
        page_title: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: pending.text().to_string(),
            url: url.into(),
            page_title: page_title.into(),
            timestamp,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.page_title.is_empty() {
            UNKNOWN_PAGE
        } else {
            &self.page_title
        }
    }

    /// Numeric form of the id, when it is one.
    pub fn id_millis(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_camel_case_keys() {
        let highlight = Highlight {
            id: "1700000000000".into(),
            text: "hello world".into(),
            url: "https://a.test".into(),
            page_title: "A".into(),
            timestamp: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        };

        let value = serde_json::to_value(&highlight).unwrap();
        assert_eq!(value["pageTitle"], "A");
        assert_eq!(value["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn reads_records_written_by_browser_storage() {
        let raw = r#"{"id":"1700000000000","text":"x","url":"https://a.test",
            "timestamp":"2023-11-14T22:13:20.123Z","pageTitle":""}"#;
        let highlight: Highlight = serde_json::from_str(raw).unwrap();
        assert_eq!(highlight.display_title(), UNKNOWN_PAGE);
        assert_eq!(highlight.id_millis(), Some(1_700_000_000_000));
    }
}
