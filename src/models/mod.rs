pub mod highlight;
pub mod selection;

pub use highlight::{Highlight, UNKNOWN_PAGE};
pub use selection::{PendingSelection, PromptPosition};
