//! Slide text should be bullet fragments, not prose.

use crate::feedback::SlideFeedback;
use crate::rules::RuleContext;
use crate::sentence::SentenceDetector;
use crate::text::word_count;

/// Shortest run (in words) worth classifying, exclusive.
const MIN_WORDS: usize = 4;

/// Whether a run is a candidate for classification at all.
///
/// Questions, label/value lines (`:`), dashed lists and the title are skipped.
fn is_candidate(text: &str, title: &str) -> bool {
    !text.is_empty()
        && text.to_lowercase() != title
        && word_count(text) > MIN_WORDS
        && !text.ends_with('?')
        && !text.contains(':')
        && !text.contains('-')
}

/// Annotate every run that reads like a complete sentence.
///
/// Returns whether no such run was found.
pub fn has_no_complete_sentences(
    ctx: &RuleContext<'_>,
    detector: &SentenceDetector<'_>,
    feedback: &mut SlideFeedback,
) -> bool {
    let mut result = true;

    for (index, slide) in ctx.slides().iter().enumerate() {
        let title = slide
            .title
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();

        let runs = slide
            .shapes
            .iter()
            .filter_map(|shape| shape.text_frame.as_ref())
            .flat_map(|frame| frame.text_runs());

        for run in runs {
            let text = run.text.trim();
            if is_candidate(text, &title) && detector.is_complete_sentence(text) {
                feedback.push(index, format!("Avoid full sentences: '{}'", run.text));
                result = false;
            }
        }
    }

    result
}
