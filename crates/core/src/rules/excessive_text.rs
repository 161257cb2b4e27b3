//! Slides should not be walls of text.

use crate::feedback::SlideFeedback;
use crate::rules::RuleContext;
use crate::text::word_count;
use crate::types::Slide;

pub const EXCESSIVE_TEXT: &str = "😴 Excessive amount of words on this slide.";

/// Words counted against the per-slide limit.
///
/// Runs of one or two words (labels, numbers) and runs repeating the title
/// are left out.
pub fn slide_word_count(slide: &Slide) -> usize {
    let title = slide.title.as_deref().map(str::trim);

    slide
        .shapes
        .iter()
        .filter_map(|shape| shape.text_frame.as_ref())
        .flat_map(|frame| frame.text_runs())
        .map(|run| run.text.trim())
        .filter(|text| Some(*text) != title)
        .map(word_count)
        .filter(|&words| words > 2)
        .sum()
}

/// Flag every in-scope slide above `max_num_words_per_slide`.
pub fn has_no_excessive_text(ctx: &RuleContext<'_>, feedback: &mut SlideFeedback) -> bool {
    let max_words = ctx.config.max_num_words_per_slide;
    let mut excessive = false;

    for (index, slide) in ctx.slides().iter().enumerate() {
        let words = slide_word_count(slide);
        if words > max_words {
            log::debug!("Slide {} has {} words (max {})", index + 1, words, max_words);
            feedback.push(index, EXCESSIVE_TEXT);
            excessive = true;
        }
    }

    !excessive
}
