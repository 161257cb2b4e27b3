//! Runs every rule over a deck and assembles the feedback model.

use crate::config::Config;
use crate::feedback::{FeedbackModel, SlideFeedback};
use crate::lexicon::Lexicon;
use crate::rules::{
    contrast, excessive_text, sentences, slide_numbers, summary, timing, transitions, RuleContext,
};
use crate::sentence::SentenceDetector;
use crate::types::Deck;

pub const ADD_SUMMARY: &str = "Please end the presentation with a summary slide.";
pub const ADD_SLIDE_NUMBERS: &str = "Please add slide numbers.";
pub const CHECK_TRANSITIONS: &str = "Please check slide transitions.";
pub const CHECK_COLOURS: &str = "Please check colours and fonts.";
pub const REDUCE_TEXT: &str = "Please ensure that slides do not have too much text.";

/// Evaluates decks against a fixed configuration.
///
/// Holds no state between runs; evaluating the same deck twice gives the
/// same model.
pub struct RuleEngine<'a> {
    config: Config,
    detector: SentenceDetector<'a>,
}

impl RuleEngine<'static> {
    /// An engine using the built-in lexicon and clause classifier.
    pub fn new(config: Config) -> Self {
        Self::with_detector(config, SentenceDetector::default())
    }
}

impl<'a> RuleEngine<'a> {
    /// An engine with a custom lexicon.
    pub fn with_lexicon(config: Config, lexicon: &'a Lexicon) -> Self {
        Self::with_detector(config, SentenceDetector::new(lexicon))
    }

    /// An engine with a custom sentence detector.
    pub fn with_detector(config: Config, detector: SentenceDetector<'a>) -> Self {
        Self { config, detector }
    }

    /// Run all rules in order and build the feedback model.
    pub fn evaluate(&self, deck: &Deck) -> FeedbackModel {
        let ctx = RuleContext::new(deck, &self.config);
        let mut feedback = SlideFeedback::new(ctx.boundary);
        let mut general = Vec::new();
        let mut all_passed = true;

        log::debug!(
            "Evaluating {} slides ({} before the backup section)",
            deck.slides.len(),
            ctx.boundary
        );

        let checks: [(bool, &str); 5] = [
            (summary::ends_with_summary_slide(deck), ADD_SUMMARY),
            (
                slide_numbers::has_slide_numbers(&ctx, &mut feedback),
                ADD_SLIDE_NUMBERS,
            ),
            (
                transitions::has_smooth_transitions(&ctx, &mut feedback),
                CHECK_TRANSITIONS,
            ),
            (
                contrast::has_readable_colors_and_fonts(&ctx, &mut feedback),
                CHECK_COLOURS,
            ),
            (
                excessive_text::has_no_excessive_text(&ctx, &mut feedback),
                REDUCE_TEXT,
            ),
        ];
        for (passed, advice) in checks {
            if !passed {
                log::debug!("Deck check failed: {}", advice);
                general.push(advice);
                all_passed = false;
            }
        }

        // Annotation only: findings fail the deck through the per-slide text.
        sentences::has_no_complete_sentences(&ctx, &self.detector, &mut feedback);

        let estimate = timing::estimate_presentation_length(deck, &self.config);

        let passed = all_passed && feedback.is_clean();
        let mut model = FeedbackModel {
            start_slide_num: deck.first_slide_number,
            slide_feedback: feedback.into_strings(),
            total_time: None,
            slide_times: None,
            cumul_slide_times: None,
            general_feedback: general
                .iter()
                .map(|line| format!("{}<br>", line))
                .collect(),
            passed,
        };
        model.set_time_estimate(estimate);
        model
    }
}
