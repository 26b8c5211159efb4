//! Save text highlights from web pages and browse them later.
//!
//! Two independent contexts share one store:
//! - the capture context ([`SelectionCapture`]) turns host-page selections into
//!   pending highlights, offers them through a [`PromptController`], and saves
//!   them via the [`Highlighter`];
//! - the collection context ([`CollectionController`]) lists, deletes, clears
//!   and summarizes what was saved.

pub mod anchor;
pub mod capture;
pub mod collection;
pub mod db;
pub mod dom;
pub mod error;
pub mod models;
pub mod navigation;
pub mod prompt;
pub mod settings;
pub mod store;
pub mod summary;
pub mod utils;

pub use anchor::{Highlighter, SavedHighlight};
pub use capture::{CaptureOutcome, HostEvent, SelectionCapture};
pub use collection::{CollectionController, HighlightRow};
pub use error::{AnnotationError, HighlightError, StoreError, SummaryError};
pub use models::{Highlight, PendingSelection};
pub use prompt::{PromptController, PromptSnapshot, PromptStatus};
pub use settings::{HighlighterSettings, PromptTimings, SettingsStore};
pub use store::{HighlightStore, KeyValueStore, MemoryStore};
pub use summary::summarize;
pub use utils::init_logging;
