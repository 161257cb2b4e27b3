//! PPTX (Office Open XML) reader for deckcheck.
//!
//! A .pptx file is a ZIP package of XML parts. This crate follows the
//! presentation's relationships to read slides, their layouts and masters,
//! the theme palette and speaker notes into a [`deckcheck_core::Deck`].

pub mod package;
pub mod parser;
pub mod shapes;

pub use parser::PptxParser;
