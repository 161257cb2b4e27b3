//! Cross-slide shape correspondence.
//!
//! Shapes are matched between consecutive slides by a structural
//! fingerprint (descriptor, size, ordinal). A matched shape that carries the
//! same content but jumps by more than the configured fraction of the slide
//! size makes the transition jarring.

use crate::feedback::SlideFeedback;
use crate::rules::RuleContext;
use crate::text::SLIDE_NUMBER_GLYPH;
use crate::types::{Shape, Slide};
use std::collections::HashMap;

pub const SLIDE_NUMBER_NOT_SMOOTH: &str = "Slide transition for the slide number is not smooth.";

/// Identity of a shape within one slide, independent of its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    pub descriptor: String,
    pub width: i64,
    pub height: i64,
    /// Disambiguates identical shapes on the same slide, in order of appearance.
    pub ordinal: usize,
}

/// What a fingerprinted shape looks like on one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeState {
    pub position: (i64, i64),
    /// Descriptor, then the shape text when it has any.
    pub attributes: Vec<String>,
}

/// Fingerprints of one slide, in shape order.
#[derive(Debug, Clone, Default)]
pub struct SlideShapes {
    entries: Vec<(Fingerprint, ShapeState)>,
    index: HashMap<Fingerprint, usize>,
}

impl SlideShapes {
    /// Fingerprint every shape of a slide.
    pub fn from_slide(slide: &Slide) -> Self {
        let mut shapes = Self::default();
        for shape in &slide.shapes {
            shapes.insert(shape);
        }
        shapes
    }

    fn insert(&mut self, shape: &Shape) {
        let descriptor = shape.descriptor();
        let mut key = Fingerprint {
            descriptor: descriptor.clone(),
            width: shape.geometry.width,
            height: shape.geometry.height,
            ordinal: 0,
        };
        while self.index.contains_key(&key) {
            key.ordinal += 1;
        }

        let mut attributes = vec![descriptor];
        let text = shape.text();
        if !text.is_empty() {
            attributes.push(text);
        }

        let state = ShapeState {
            position: shape.geometry.position(),
            attributes,
        };
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, state));
    }

    pub fn get(&self, key: &Fingerprint) -> Option<&ShapeState> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Fingerprint, ShapeState)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether the move from `prev` to `curr` leaves the tolerance window.
pub fn exceeds_tolerance(
    prev: (i64, i64),
    curr: (i64, i64),
    threshold: f64,
    slide_width: i64,
    slide_height: i64,
) -> bool {
    let dx = (curr.0 - prev.0).abs() as f64;
    let dy = (curr.1 - prev.1).abs() as f64;
    dx > threshold * slide_width as f64 || dy > threshold * slide_height as f64
}

/// Finding text for a shape that jumped.
fn transition_message(attributes: &[String]) -> String {
    match attributes {
        [_, text, ..] if text == SLIDE_NUMBER_GLYPH => SLIDE_NUMBER_NOT_SMOOTH.to_string(),
        [descriptor, text, ..] => format!(
            "Slide transition for {} is not smooth. This shape object holds the following text: '{}'",
            descriptor, text
        ),
        [descriptor] => format!("Slide transition for {} is not smooth.", descriptor),
        [] => "Slide transition is not smooth.".to_string(),
    }
}

/// Compare two consecutive slides, returning `(fingerprint, message)` for
/// every shape that jumped. Results follow the shape order of `curr`.
pub fn compare_slides(
    prev: &SlideShapes,
    curr: &SlideShapes,
    threshold: f64,
    slide_width: i64,
    slide_height: i64,
) -> Vec<(Fingerprint, String)> {
    let mut jumps = Vec::new();

    for (key, state) in curr.iter() {
        let Some(before) = prev.get(key) else {
            continue;
        };
        if before.position == state.position || before.attributes != state.attributes {
            continue;
        }
        if exceeds_tolerance(
            before.position,
            state.position,
            threshold,
            slide_width,
            slide_height,
        ) {
            jumps.push((key.clone(), transition_message(&state.attributes)));
        }
    }

    jumps
}

/// Check every pair of consecutive in-scope slides.
pub fn has_smooth_transitions(ctx: &RuleContext<'_>, feedback: &mut SlideFeedback) -> bool {
    let deck = ctx.deck;
    if deck.slides.len() < 2 {
        return true;
    }

    let threshold = ctx.config.shape_pos_threshold;
    let mut smooth = true;
    let mut prev: Option<SlideShapes> = None;

    for (index, slide) in ctx.slides().iter().enumerate() {
        let curr = SlideShapes::from_slide(slide);

        if let Some(prev) = prev.as_ref().filter(|p| !p.is_empty()) {
            for (key, message) in compare_slides(prev, &curr, threshold, deck.width, deck.height) {
                log::debug!("Slide {}: {:?} jumped", index + 1, key);
                feedback.push(index, message);
                smooth = false;
            }
        }

        prev = Some(curr);
    }

    smooth
}
