//! Core domain model and rule engine for checking presentation decks
//! against slide-design guidelines.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod lexicon;
pub mod report;
pub mod rules;
pub mod sentence;
pub mod text;
pub mod types;

pub use config::Config;
pub use engine::RuleEngine;
pub use error::{Error, Result};
pub use feedback::{FeedbackModel, SlideFeedback, TimeEstimate};
pub use lexicon::Lexicon;
pub use report::HtmlReport;
pub use sentence::{ClauseClassifier, SentenceClassifier, SentenceDetector};
pub use types::{
    ColorRef, ColorScheme, Deck, Fill, Geometry, Paragraph, Rgb, RunKind, Shape, ShapeKind, Slide,
    TextFrame, TextRun, ThemeColor,
};
