//! Deterministic digest over a highlight list.

use std::fmt::Write;

use crate::models::Highlight;

/// Highlights listed before the "and N more" note.
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Words across all highlight texts, split on whitespace.
pub fn word_count(highlights: &[Highlight]) -> usize {
    highlights
        .iter()
        .map(|h| h.text.split_whitespace().count())
        .sum()
}

/// Summarize `highlights` in their given (newest-first) order.
///
/// Callers check for an empty list first; an empty input yields only the header.
pub fn summarize(highlights: &[Highlight]) -> String {
    summarize_with_limit(highlights, DEFAULT_PREVIEW_LIMIT)
}

pub fn summarize_with_limit(highlights: &[Highlight], preview_limit: usize) -> String {
    let total = highlights.len();
    let mut out = format!(
        "Summary of {total} highlight{} ({} words total):\n\n",
        plural(total),
        word_count(highlights)
    );

    if let [only] = highlights {
        let _ = write!(
            out,
            "Your highlight:\n\"{}\"\n\nFrom: {}",
            only.text,
            only.display_title()
        );
        return out;
    }
    if total == 0 {
        return out;
    }

    out.push_str("Your highlights cover various topics from different webpages:\n\n");
    for (index, highlight) in highlights.iter().take(preview_limit).enumerate() {
        let _ = write!(
            out,
            "{}. \"{}\"\n   Source: {}\n\n",
            index + 1,
            highlight.text,
            highlight.display_title()
        );
    }

    let remaining = total.saturating_sub(preview_limit);
    if remaining > 0 {
        let _ = write!(out, "... and {remaining} more highlight{}.", plural(remaining));
    }
    out
}
