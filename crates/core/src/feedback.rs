//! Feedback accumulated by the rules and handed to renderers.

use serde::{Deserialize, Serialize};

/// Per-slide findings, one entry per in-scope slide.
///
/// Threaded through every rule by the engine. Findings for slides outside
/// the tracked range are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideFeedback {
    slides: Vec<Vec<String>>,
}

impl SlideFeedback {
    /// Create an accumulator for `slide_count` slides.
    pub fn new(slide_count: usize) -> Self {
        Self {
            slides: vec![Vec::new(); slide_count],
        }
    }

    /// Record a finding for the slide at `index` (0-based).
    pub fn push(&mut self, index: usize, finding: impl Into<String>) {
        match self.slides.get_mut(index) {
            Some(findings) => findings.push(finding.into()),
            None => log::debug!("Dropping finding for out-of-scope slide {}", index + 1),
        }
    }

    /// Findings recorded for one slide.
    pub fn findings(&self, index: usize) -> &[String] {
        self.slides.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of tracked slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Whether no slide has any finding.
    pub fn is_clean(&self) -> bool {
        self.slides.iter().all(Vec::is_empty)
    }

    /// One newline-joined string per slide.
    pub fn into_strings(self) -> Vec<String> {
        self.slides
            .into_iter()
            .map(|findings| findings.join("\n"))
            .collect()
    }
}

/// Spoken-duration estimate built from speaker notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEstimate {
    /// Whole presentation, `HH:MM:SS`.
    pub total: String,
    /// Time spent on each slide, `MM:SS`.
    pub slide_times: Vec<String>,
    /// Elapsed time when each slide starts, `HH:MM:SS`.
    pub cumul_slide_times: Vec<String>,
}

/// The result of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackModel {
    /// Number of the first slide.
    pub start_slide_num: usize,
    /// Newline-joined findings, one entry per in-scope slide.
    pub slide_feedback: Vec<String>,
    /// Estimated total time, absent when it cannot be estimated.
    pub total_time: Option<String>,
    pub slide_times: Option<Vec<String>>,
    pub cumul_slide_times: Option<Vec<String>>,
    /// Deck-level advice, HTML-safe and `<br>`-separated.
    pub general_feedback: String,
    /// Whether every rule passed and no slide has findings.
    pub passed: bool,
}

impl FeedbackModel {
    /// Attach a time estimate, or mark it unavailable.
    pub fn set_time_estimate(&mut self, estimate: Option<TimeEstimate>) {
        match estimate {
            Some(estimate) => {
                self.total_time = Some(estimate.total);
                self.slide_times = Some(estimate.slide_times);
                self.cumul_slide_times = Some(estimate.cumul_slide_times);
            }
            None => {
                self.total_time = None;
                self.slide_times = None;
                self.cumul_slide_times = None;
            }
        }
    }

    /// Iterate `(slide number, findings)` over slides that have findings.
    pub fn slides_with_findings(&self) -> impl Iterator<Item = (usize, &str)> {
        let start = self.start_slide_num;
        self.slide_feedback
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_empty())
            .map(move |(i, f)| (start + i, f.as_str()))
    }
}
