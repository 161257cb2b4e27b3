//! Slides after the title slide should carry their number in a fixed place.

use crate::feedback::SlideFeedback;
use crate::rules::RuleContext;
use crate::text::{parse_slide_number, SLIDE_NUMBER_GLYPH};
use crate::types::Shape;

pub const MISPLACED: &str = "Slide number is misplaced in a different location.";
pub const MISSING: &str = "Slide number is missing on this slide.";

/// Fraction of the slide height, at the top and bottom, where numbers live.
const NUMBER_BAND: f64 = 0.1;

/// Check presence and placement of slide numbers.
///
/// Returns whether any slide carries a number. The first number found fixes
/// the expected position; later slides without a number, or with one
/// elsewhere, get a finding.
pub fn has_slide_numbers(ctx: &RuleContext<'_>, feedback: &mut SlideFeedback) -> bool {
    let deck = ctx.deck;
    if deck.slides.len() < 2 {
        return true;
    }

    let mut canonical: Option<(i64, i64)> = None;

    for (index, slide) in ctx.slides().iter().enumerate().skip(1) {
        let expected = deck.first_slide_number + index;
        let mut slide_has_number = false;

        for shape in slide
            .shapes
            .iter()
            .filter(|s| is_slide_number(s, expected, deck.height))
        {
            slide_has_number = true;
            let position = shape.geometry.position();
            match canonical {
                None => canonical = Some(position),
                Some(expected_position) if expected_position != position => {
                    feedback.push(index, MISPLACED);
                }
                Some(_) => {}
            }
        }

        if canonical.is_some() && !slide_has_number {
            feedback.push(index, MISSING);
        }
    }

    log::debug!("Slide numbers found: {}", canonical.is_some());
    canonical.is_some()
}

/// A single-paragraph shape showing `expected` (or the number glyph) in the
/// top or bottom band of the slide.
fn is_slide_number(shape: &Shape, expected: usize, slide_height: i64) -> bool {
    let Some(frame) = &shape.text_frame else {
        return false;
    };
    if frame.paragraphs.len() != 1 {
        return false;
    }

    let text = shape.text();
    let text = text.trim();
    let matches_number = text == SLIDE_NUMBER_GLYPH || parse_slide_number(text) == Some(expected);
    if !matches_number {
        return false;
    }

    let top = shape.geometry.top as f64;
    let height = slide_height as f64;
    top > height * (1.0 - NUMBER_BAND) || top < height * NUMBER_BAND
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::fixtures::{deck, text_box, HEIGHT};
    use crate::types::{Deck, Slide};

    const BOTTOM: i64 = HEIGHT * 95 / 100;

    fn numbered_deck(positions: &[Option<(i64, i64)>]) -> Deck {
        let slides = positions
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let mut slide = Slide::new().with_shape(text_box(0, 200_000, "Content"));
                if let Some((left, top)) = pos {
                    slide = slide.with_shape(text_box(*left, *top, &(i + 1).to_string()));
                }
                slide
            })
            .collect();
        deck(slides)
    }

    fn run(deck: &Deck) -> (bool, SlideFeedback) {
        let config = Config::default();
        let ctx = RuleContext::new(deck, &config);
        let mut feedback = SlideFeedback::new(ctx.boundary);
        let result = has_slide_numbers(&ctx, &mut feedback);
        (result, feedback)
    }

    #[test]
    fn test_sequential_numbers_pass() {
        let pos = Some((900_000, BOTTOM));
        let deck = numbered_deck(&[None, pos, pos, pos, pos]);
        let (result, feedback) = run(&deck);
        assert!(result);
        assert!(feedback.is_clean());
    }

    #[test]
    fn test_moved_number_is_misplaced() {
        let pos = Some((900_000, BOTTOM));
        let moved = Some((50_000, BOTTOM));
        let deck = numbered_deck(&[None, pos, moved, pos, pos]);
        let (result, feedback) = run(&deck);
        assert!(result);
        assert_eq!(feedback.findings(2), &[MISPLACED.to_string()]);
        for index in [0, 1, 3, 4] {
            assert!(feedback.findings(index).is_empty());
        }
    }

    #[test]
    fn test_missing_number_after_first() {
        let pos = Some((900_000, BOTTOM));
        let deck = numbered_deck(&[None, None, pos, None, pos]);
        let (result, feedback) = run(&deck);
        assert!(result);
        // Slide 2 comes before any number was seen.
        assert!(feedback.findings(1).is_empty());
        assert_eq!(feedback.findings(3), &[MISSING.to_string()]);
    }

    #[test]
    fn test_number_outside_band_ignored() {
        let middle = Some((900_000, HEIGHT / 2));
        let deck = numbered_deck(&[None, middle, middle]);
        let (result, feedback) = run(&deck);
        assert!(!result);
        assert!(feedback.is_clean());
    }

    #[test]
    fn test_glyph_and_circled_digits() {
        let deck = deck(vec![
            Slide::new(),
            Slide::new().with_shape(text_box(10, 5_000, SLIDE_NUMBER_GLYPH)),
            Slide::new().with_shape(text_box(10, 5_000, "③")),
        ]);
        let (result, feedback) = run(&deck);
        assert!(result);
        assert!(feedback.is_clean());
    }

    #[test]
    fn test_small_decks_pass() {
        assert!(run(&deck(vec![])).0);
        assert!(run(&deck(vec![Slide::new()])).0);
    }

    #[test]
    fn test_stops_at_backup() {
        let pos = Some((900_000, BOTTOM));
        let mut deck = numbered_deck(&[None, pos, pos]);
        deck.add_slide(Slide::new().with_title("Backup"));
        deck.add_slide(Slide::new());
        let (result, feedback) = run(&deck);
        assert!(result);
        assert_eq!(feedback.len(), 3);
        assert!(feedback.is_clean());
    }
}
