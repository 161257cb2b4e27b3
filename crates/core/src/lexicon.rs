//! Part-of-speech lexicon used by the sentence classifier.
//!
//! The built-in word list covers closed word classes (pronouns, determiners,
//! auxiliaries, prepositions, conjunctions) and a set of common verbs and
//! nouns. Words not in the list are tagged from their suffix. A replacement
//! or additional list can be loaded from a file in the same format:
//!
//! ```text
//! # comment
//! word<TAB>tag[,tag...]
//! ```

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

const BUILTIN_WORDS: &str = include_str!("../data/lexicon.txt");

static BUILTIN_LEXICON: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::parse(BUILTIN_WORDS).unwrap_or_else(|e| {
        log::warn!("Built-in lexicon is malformed, using suffix rules only: {}", e);
        Lexicon::empty()
    })
});

/// Word classes known to the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Pronoun,
    Verb,
    Auxiliary,
    Determiner,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Number,
}

impl PartOfSpeech {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl FromStr for PartOfSpeech {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let pos = match s.trim().to_ascii_lowercase().as_str() {
            "noun" => PartOfSpeech::Noun,
            "pronoun" => PartOfSpeech::Pronoun,
            "verb" => PartOfSpeech::Verb,
            "aux" => PartOfSpeech::Auxiliary,
            "det" => PartOfSpeech::Determiner,
            "adj" => PartOfSpeech::Adjective,
            "adv" => PartOfSpeech::Adverb,
            "prep" => PartOfSpeech::Preposition,
            "conj" => PartOfSpeech::Conjunction,
            "num" => PartOfSpeech::Number,
            other => return Err(format!("unknown tag '{}'", other)),
        };
        Ok(pos)
    }
}

/// The set of word classes a word may belong to.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u16);

impl TagSet {
    pub fn of(tags: &[PartOfSpeech]) -> Self {
        let mut set = Self::default();
        for &tag in tags {
            set.insert(tag);
        }
        set
    }

    pub fn insert(&mut self, tag: PartOfSpeech) {
        self.0 |= tag.bit();
    }

    pub fn contains(&self, tag: PartOfSpeech) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    fn union(self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ALL: [PartOfSpeech; 10] = [
            PartOfSpeech::Noun,
            PartOfSpeech::Pronoun,
            PartOfSpeech::Verb,
            PartOfSpeech::Auxiliary,
            PartOfSpeech::Determiner,
            PartOfSpeech::Adjective,
            PartOfSpeech::Adverb,
            PartOfSpeech::Preposition,
            PartOfSpeech::Conjunction,
            PartOfSpeech::Number,
        ];
        f.debug_set()
            .entries(ALL.iter().filter(|t| self.contains(**t)))
            .finish()
    }
}

/// A token with its candidate word classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedWord {
    pub word: String,
    pub tags: TagSet,
    /// Whether the tags come from the word list rather than a suffix guess.
    pub listed: bool,
}

impl TaggedWord {
    pub fn is(&self, tag: PartOfSpeech) -> bool {
        self.tags.contains(tag)
    }
}

/// Word list mapping lower-case words to their word classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    words: HashMap<String, TagSet>,
}

impl Lexicon {
    /// A lexicon without entries; every word is tagged by suffix.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The word list shipped with the crate.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN_LEXICON
    }

    /// Parse a word list. Repeated words accumulate their tags.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lexicon = Self::empty();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, tags) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| Error::LexiconError {
                    line: i + 1,
                    reason: "expected a word followed by its tags".to_string(),
                })?;

            let mut set = TagSet::default();
            for tag in tags.split(',').filter(|t| !t.trim().is_empty()) {
                let tag = tag.parse::<PartOfSpeech>().map_err(|reason| Error::LexiconError {
                    line: i + 1,
                    reason,
                })?;
                set.insert(tag);
            }
            if set.is_empty() {
                return Err(Error::LexiconError {
                    line: i + 1,
                    reason: format!("no tags for '{}'", word),
                });
            }

            lexicon.add(word, set);
        }

        Ok(lexicon)
    }

    /// Read a word list file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::parse(&content)?;
        log::debug!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    /// Add tags for a word.
    pub fn add(&mut self, word: &str, tags: TagSet) {
        let entry = self.words.entry(word.to_lowercase()).or_default();
        *entry = entry.union(tags);
    }

    /// Add every entry of `other`; tags of shared words accumulate.
    pub fn extend(&mut self, other: &Lexicon) {
        for (word, tags) in &other.words {
            self.add(word, *tags);
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Listed tags of a word, if any.
    pub fn lookup(&self, word: &str) -> Option<TagSet> {
        self.words.get(&word.to_lowercase()).copied()
    }

    /// Tags of a word: listed tags, otherwise a suffix-based guess.
    pub fn tag(&self, word: &str) -> TagSet {
        self.lookup(word).unwrap_or_else(|| guess_tags(word))
    }

    /// Tag a token sequence.
    pub fn tag_tokens(&self, tokens: &[String]) -> Vec<TaggedWord> {
        tokens
            .iter()
            .map(|word| match self.lookup(word) {
                Some(tags) => TaggedWord {
                    word: word.clone(),
                    tags,
                    listed: true,
                },
                None => TaggedWord {
                    word: word.clone(),
                    tags: guess_tags(word),
                    listed: false,
                },
            })
            .collect()
    }
}

/// Guess word classes from the shape of an unknown word.
fn guess_tags(word: &str) -> TagSet {
    use PartOfSpeech::*;

    if word.chars().all(|c| c.is_ascii_digit()) {
        return TagSet::of(&[Number]);
    }

    let lower = word.to_lowercase();
    let ends = |suffixes: &[&str]| suffixes.iter().any(|s| lower.len() > s.len() + 1 && lower.ends_with(s));

    if ends(&["ly"]) {
        TagSet::of(&[Adverb])
    } else if ends(&["ing"]) {
        TagSet::of(&[Verb, Noun])
    } else if ends(&["ed"]) {
        TagSet::of(&[Verb, Adjective])
    } else if ends(&["tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "er", "or"]) {
        TagSet::of(&[Noun])
    } else if ends(&["ous", "ful", "ive", "able", "ible", "al", "ic", "less", "est"]) {
        TagSet::of(&[Adjective])
    } else if ends(&["ize", "ise", "ify", "ate"]) {
        TagSet::of(&[Verb])
    } else if ends(&["s"]) && !ends(&["ss", "us", "is"]) {
        TagSet::of(&[Noun, Verb])
    } else {
        TagSet::of(&[Noun])
    }
}
