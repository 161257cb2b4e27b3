//! Heuristic detection of complete sentences in slide text.
//!
//! Slides should read like an outline. A run that contains a subject
//! followed by a finite verb reads like prose and is reported. The
//! classification is approximate by nature; [`SentenceClassifier`] lets
//! callers plug in their own.

use crate::lexicon::{Lexicon, PartOfSpeech, TaggedWord};
use crate::text::word_tokens;

/// Decides whether tagged tokens form a complete sentence.
pub trait SentenceClassifier {
    fn is_complete_sentence(&self, words: &[TaggedWord]) -> bool;
}

/// Subject noun phrase followed by a finite verb.
///
/// A subject is a subject pronoun, or a determiner followed by adjectives
/// and nouns ending in a noun. The verb must come right after the subject,
/// adverbs allowed in between, and is either an auxiliary/modal or a verb
/// not in `-ing` form. Right after a pronoun, a word missing from the
/// lexicon is taken as the verb.
///
/// At the start of a run the determiner may be missing ("Users want ...").
/// The verb after such a bare subject has to look finite: an `-s` or `-ed`
/// form, a listed verb that is not also a noun, or a listed verb after a
/// plural head. Imperatives ("Reduce costs ...") never form a bare subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseClassifier;

impl ClauseClassifier {
    pub fn new() -> Self {
        Self
    }

    /// End (exclusive) of a subject phrase starting at `start`.
    fn subject_end(words: &[TaggedWord], start: usize) -> Option<usize> {
        let first = &words[start];

        if first.is(PartOfSpeech::Pronoun) {
            return Some(start + 1);
        }
        if !first.is(PartOfSpeech::Determiner) {
            return None;
        }

        // Determiner (Adjective | Noun)* Noun
        noun_phrase_end(words, start + 1, |w, _| is_finite_verb(w))
    }

    /// End (exclusive) of a determiner-less subject at the start of a run.
    fn bare_subject_end(words: &[TaggedWord]) -> Option<usize> {
        let first = words.first()?;
        if first.is(PartOfSpeech::Verb) && !(first.is(PartOfSpeech::Noun) && is_plural(first)) {
            return None;
        }
        noun_phrase_end(words, 0, is_bare_subject_verb)
    }
}

/// End of `(Adjective | Noun)* Noun` starting at `from`, stopping at the
/// first noun followed by a word that `is_verb` accepts after that head.
fn noun_phrase_end(
    words: &[TaggedWord],
    from: usize,
    is_verb: impl Fn(&TaggedWord, &TaggedWord) -> bool,
) -> Option<usize> {
    let mut end = None;
    for (i, word) in words.iter().enumerate().skip(from) {
        if word.is(PartOfSpeech::Noun) {
            end = Some(i + 1);
        } else if !word.is(PartOfSpeech::Adjective) {
            break;
        }
        // Stop at the first word that can also be the verb.
        if end.is_some() && words.get(i + 1).is_some_and(|next| is_verb(next, word)) {
            break;
        }
    }
    end
}

fn is_plural(word: &TaggedWord) -> bool {
    let lower = word.word.to_lowercase();
    lower.ends_with('s') && !lower.ends_with("ss")
}

fn is_bare_subject_verb(word: &TaggedWord, head: &TaggedWord) -> bool {
    if word.is(PartOfSpeech::Auxiliary) {
        return true;
    }
    if !is_finite_verb(word) {
        return false;
    }
    let lower = word.word.to_lowercase();
    lower.ends_with('s')
        || lower.ends_with("ed")
        || (word.listed && (!word.is(PartOfSpeech::Noun) || is_plural(head)))
}

fn is_finite_verb(word: &TaggedWord) -> bool {
    if word.is(PartOfSpeech::Auxiliary) {
        return true;
    }
    word.is(PartOfSpeech::Verb) && !word.word.to_lowercase().ends_with("ing")
}

fn is_unlisted_base_form(word: &TaggedWord) -> bool {
    !word.listed && word.is(PartOfSpeech::Noun)
}

impl SentenceClassifier for ClauseClassifier {
    fn is_complete_sentence(&self, words: &[TaggedWord]) -> bool {
        if let Some(end) = Self::bare_subject_end(words) {
            let head = &words[end - 1];
            let verb = words[end..]
                .iter()
                .find(|w| !w.is(PartOfSpeech::Adverb) || w.is(PartOfSpeech::Auxiliary));
            if verb.is_some_and(|w| is_bare_subject_verb(w, head)) {
                return true;
            }
        }

        (0..words.len()).any(|start| {
            let Some(end) = Self::subject_end(words, start) else {
                return false;
            };
            let after_pronoun = end == start + 1 && words[start].is(PartOfSpeech::Pronoun);
            words[end..]
                .iter()
                .find(|w| !w.is(PartOfSpeech::Adverb) || w.is(PartOfSpeech::Auxiliary))
                .is_some_and(|w| is_finite_verb(w) || (after_pronoun && is_unlisted_base_form(w)))
        })
    }
}

/// Tokenizes, tags and classifies slide text.
pub struct SentenceDetector<'a> {
    lexicon: &'a Lexicon,
    classifier: Box<dyn SentenceClassifier + 'a>,
}

impl<'a> SentenceDetector<'a> {
    /// A detector using the [`ClauseClassifier`].
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self::with_classifier(lexicon, ClauseClassifier::new())
    }

    pub fn with_classifier(lexicon: &'a Lexicon, classifier: impl SentenceClassifier + 'a) -> Self {
        Self {
            lexicon,
            classifier: Box::new(classifier),
        }
    }

    /// Whether `text` reads like a complete sentence.
    pub fn is_complete_sentence(&self, text: &str) -> bool {
        let tokens = word_tokens(text);
        let tagged = self.lexicon.tag_tokens(&tokens);
        self.classifier.is_complete_sentence(&tagged)
    }
}

impl Default for SentenceDetector<'static> {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}
