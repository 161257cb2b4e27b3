//! Authoring-quality rules.
//!
//! Each rule inspects the in-scope part of a deck and records findings in a
//! [`SlideFeedback`](crate::feedback::SlideFeedback) accumulator. Boolean
//! rules return whether the deck passes.

pub mod contrast;
pub mod excessive_text;
pub mod sentences;
pub mod slide_numbers;
pub mod summary;
pub mod timing;
pub mod transitions;

use crate::config::Config;
use crate::types::{Deck, Slide};

/// What every rule sees during one run.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub deck: &'a Deck,
    pub config: &'a Config,
    /// Index of the first backup slide (or the slide count).
    pub boundary: usize,
}

impl<'a> RuleContext<'a> {
    /// Build a context, locating the backup boundary once.
    pub fn new(deck: &'a Deck, config: &'a Config) -> Self {
        Self {
            deck,
            config,
            boundary: deck.backup_boundary(),
        }
    }

    /// Slides before the backup boundary.
    pub fn slides(&self) -> &'a [Slide] {
        &self.deck.slides[..self.boundary]
    }
}
