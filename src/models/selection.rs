use serde::{Deserialize, Serialize};

use crate::dom::{LiveSelection, RangeAnchor, ScrollOffset};

/// Page coordinates where the prompt is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptPosition {
    pub left: f64,
    pub top: f64,
}

/// A captured but not yet confirmed selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    text: String,
    anchor: RangeAnchor,
    position: PromptPosition,
}

impl PendingSelection {
    /// Returns `None` when the selection is empty or whitespace-only.
    ///
    /// The prompt sits under the left edge of the selection's bounding box,
    /// converted to page coordinates and pushed down by `offset_px`.
    pub fn from_live(live: LiveSelection, scroll: ScrollOffset, offset_px: f64) -> Option<Self> {
        let text = live.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            position: PromptPosition {
                left: live.bounds.left + scroll.x,
                top: live.bounds.bottom + scroll.y + offset_px,
            },
            anchor: live.anchor,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn anchor(&self) -> &RangeAnchor {
        &self.anchor
    }

    pub fn position(&self) -> PromptPosition {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{BoundaryPoint, Rect};

    fn live(text: &str) -> LiveSelection {
        LiveSelection {
            text: text.to_string(),
            anchor: RangeAnchor::new(
                BoundaryPoint::new(vec![0, 0], 0),
                BoundaryPoint::new(vec![0, 0], text.chars().count()),
            ),
            bounds: Rect::new(100.0, 40.0, 180.0, 60.0),
        }
    }

    #[test]
    fn trims_text_and_positions_below_selection() {
        let scroll = ScrollOffset { x: 5.0, y: 300.0 };
        let pending = PendingSelection::from_live(live("  hello world \n"), scroll, 5.0).unwrap();

        assert_eq!(pending.text(), "hello world");
        assert_eq!(pending.position(), PromptPosition { left: 105.0, top: 365.0 });
    }

    #[test]
    fn whitespace_only_selection_is_a_clear_signal() {
        let scroll = ScrollOffset::default();
        assert!(PendingSelection::from_live(live(" \t\n "), scroll, 5.0).is_none());
        assert!(PendingSelection::from_live(live(""), scroll, 5.0).is_none());
    }
}
