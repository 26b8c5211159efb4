use thiserror::Error;

/// Errors raised at the persistent store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The stored value exists but is not a valid highlight list.
    #[error("stored value under '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Unavailable(format!("{err:#}"))
    }
}

/// Failure to visually mark a range in the host document.
///
/// Always recoverable: a highlight is saved regardless of whether marking works.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("range partially selects a non-text node")]
    CrossesBoundary,

    #[error("anchor no longer resolves in the document: {0}")]
    StaleAnchor(String),

    #[error("range is collapsed")]
    Collapsed,
}

/// Errors from the confirm (write) path.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("No highlights to summarize!")]
    Empty,
}

pub type StoreResult<T> = Result<T, StoreError>;
