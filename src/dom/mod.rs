//! Host page boundary.
//!
//! The capture pipeline never touches a concrete DOM. It talks to a [`HostPage`],
//! which exposes the live selection, page provenance and the one destructive
//! operation we need (wrapping a range in a marker). [`DocumentPage`] is an
//! in-memory implementation over [`Document`].

pub mod document;
pub mod page;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnnotationError;

pub use document::{Document, Element, Node};
pub use page::DocumentPage;

pub const MARKER_CLASS: &str = "saved-highlight";
pub const MARKER_TITLE: &str = "Saved highlight";
pub const MARKER_ID_ATTR: &str = "data-highlight-marker";

/// Viewport-relative bounding box, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// A position inside a text node, addressed by the child-index path from the
/// document body and a character offset into that node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Cloned selection range. Independent of the live selection, so it survives
/// the user clearing or changing what is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeAnchor {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl RangeAnchor {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// What the host reports for its current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSelection {
    pub text: String,
    pub anchor: RangeAnchor,
    pub bounds: Rect,
}

/// Proof that a range was wrapped in a marker container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marked {
    pub marker_id: Uuid,
}

pub trait HostPage: Send + Sync {
    /// Current selection, or `None` when nothing is selected.
    fn selection(&self) -> Option<LiveSelection>;

    fn scroll_offset(&self) -> ScrollOffset;

    fn url(&self) -> String;

    fn title(&self) -> String;

    fn clear_selection(&self);

    /// Wrap the anchored span in a marker container. Must leave the document
    /// untouched when it fails.
    fn try_annotate(&self, anchor: &RangeAnchor) -> Result<Marked, AnnotationError>;
}
