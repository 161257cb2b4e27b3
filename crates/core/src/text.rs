//! Text helpers shared by the rules: word counting, slide-number glyphs,
//! tokenization and speaker-note markers.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Text PowerPoint shows in a slide-number placeholder that is not yet
/// bound to a slide.
pub const SLIDE_NUMBER_GLYPH: &str = "‹#›";

/// Circled digits, in order, standing for 1 through 20.
pub const CIRCLED_DIGITS: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯', '⑰', '⑱',
    '⑲', '⑳',
];

/// Punctuation that ends a spoken sentence.
pub const SENTENCE_TERMINALS: [char; 3] = ['.', '?', '!'];

/// Word tokens: runs of letters/digits, keeping inner apostrophes.
static WORD_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*").unwrap());

/// Explicit pause markers in speaker notes.
static BREAK_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*(?:break|pause)\s*\]").unwrap());

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Replace a lone circled digit with its plain digits; other text is kept.
pub fn normalize_circled_digit(text: &str) -> String {
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(pos) = CIRCLED_DIGITS.iter().position(|&d| d == c) {
            return (pos + 1).to_string();
        }
    }
    text.to_string()
}

/// Parse text as a slide number: plain digits or a single circled digit.
pub fn parse_slide_number(text: &str) -> Option<usize> {
    let text = normalize_circled_digit(text.trim());
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Split text into word tokens, folding typographic variants (NFKC) first.
pub fn word_tokens(text: &str) -> Vec<String> {
    let folded: String = text.nfkc().collect();
    WORD_TOKEN_REGEX
        .find_iter(&folded)
        .map(|m| m.as_str().replace('’', "'"))
        .collect()
}

/// Speaker notes split into their spoken text and pause markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerNotes {
    /// Notes text with break markers removed.
    pub text: String,
    /// Number of explicit `[break]`/`[pause]` markers.
    pub breaks: usize,
}

impl SpeakerNotes {
    pub fn parse(notes: &str) -> Self {
        let breaks = BREAK_MARKER_REGEX.find_iter(notes).count();
        let text = BREAK_MARKER_REGEX.replace_all(notes, " ").trim().to_string();
        Self { text, breaks }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.breaks == 0
    }

    /// Count of sentence-ending punctuation marks.
    pub fn pauses(&self) -> usize {
        self.text
            .chars()
            .filter(|c| SENTENCE_TERMINALS.contains(c))
            .count()
    }

    /// Words left once sentence punctuation is stripped.
    pub fn words(&self) -> usize {
        let stripped: String = self
            .text
            .chars()
            .filter(|c| !SENTENCE_TERMINALS.contains(c))
            .collect();
        word_count(&stripped)
    }
}
