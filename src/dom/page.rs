use std::sync::{Mutex, MutexGuard};

use log::debug;
use uuid::Uuid;

use crate::error::AnnotationError;

use super::{
    Document, Element, HostPage, LiveSelection, Marked, RangeAnchor, Rect, ScrollOffset,
    MARKER_CLASS, MARKER_ID_ATTR, MARKER_TITLE,
};

struct PageState {
    document: Document,
    selection: Option<(RangeAnchor, Rect)>,
    scroll: ScrollOffset,
}

/// A [`HostPage`] backed by an in-memory [`Document`].
pub struct DocumentPage {
    url: String,
    title: String,
    state: Mutex<PageState>,
}

impl DocumentPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>, document: Document) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            state: Mutex::new(PageState {
                document,
                selection: None,
                scroll: ScrollOffset::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn select(&self, anchor: RangeAnchor, bounds: Rect) {
        self.lock().selection = Some((anchor, bounds));
    }

    /// Select the first occurrence of `needle`. Returns false when it is not found.
    pub fn select_text(&self, needle: &str, bounds: Rect) -> bool {
        let mut state = self.lock();
        match state.document.find_text(needle) {
            Some(anchor) => {
                state.selection = Some((anchor, bounds));
                true
            }
            None => false,
        }
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.lock().scroll = ScrollOffset { x, y };
    }

    pub fn document(&self) -> Document {
        self.lock().document.clone()
    }

    pub fn has_selection(&self) -> bool {
        self.lock().selection.is_some()
    }
}

impl HostPage for DocumentPage {
    fn selection(&self) -> Option<LiveSelection> {
        let state = self.lock();
        let (anchor, bounds) = state.selection.as_ref()?;
        match state.document.range_text(anchor) {
            Ok(text) => Some(LiveSelection {
                text,
                anchor: anchor.clone(),
                bounds: *bounds,
            }),
            Err(err) => {
                debug!("Dropping unresolvable selection: {err}");
                None
            }
        }
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.lock().scroll
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn clear_selection(&self) {
        self.lock().selection = None;
    }

    fn try_annotate(&self, anchor: &RangeAnchor) -> Result<Marked, AnnotationError> {
        let marker_id = Uuid::new_v4();
        let wrapper = Element::new("span")
            .with_attr("class", MARKER_CLASS)
            .with_attr("title", MARKER_TITLE)
            .with_attr(MARKER_ID_ATTR, marker_id.to_string());

        self.lock().document.surround_contents(anchor, wrapper)?;
        Ok(Marked { marker_id })
    }
}
