//! The deck should close with a summary slide before any backup slides.

use crate::types::Deck;

/// Whether a summary slide ends the main part of the deck.
///
/// Only titled slides count. After a summary title, a backup title settles
/// the result and any other title means the summary was not last.
pub fn ends_with_summary_slide(deck: &Deck) -> bool {
    let mut summary_at_end = false;

    for slide in &deck.slides {
        let Some(title) = slide.title.as_deref() else {
            continue;
        };
        let title = title.to_lowercase();

        if title.contains("summary") {
            summary_at_end = true;
        } else if title.contains("backup") {
            return summary_at_end;
        } else if summary_at_end {
            return false;
        }
    }

    summary_at_end
}
