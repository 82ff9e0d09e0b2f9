use smallvec::SmallVec;
use std::collections::HashMap;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// The score given to entries that don't specify one.
pub const DEFAULT_SCORE: i32 = 50;

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- lowercase, with no whitespace.
    pub normalized_string: String,

    /// The word as it appears in the caller's word list, with arbitrary formatting.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,

    /// The word's score, usually on a roughly 0 - 100 scale where 50 means average quality.
    pub score: i32,
}

impl Word {
    /// The number of cells this word occupies in the grid.
    #[must_use]
    pub fn length(&self) -> usize {
        self.glyphs.len()
    }
}

/// Given a canonical word string from a word list, turn it into the normalized form we'll use in
/// the actual fill engine.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordListError {
    #[error("word list contains invalid word: “{0}”")]
    InvalidWord(String),

    #[error("word list contains invalid score: “{0}”")]
    InvalidScore(String),
}

/// The vocabulary available to a fill. Words and glyphs are interned so that the rest of the
/// engine can work with integer ids; ids are assigned in the order entries are first seen and
/// never change.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// All loaded words. A `WordId` is an index into this list.
    pub words: Vec<Word>,

    /// A map from a normalized string to the id of the Word representing it.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Build a word list from `(word, score)` entries. If two entries normalize to the same string,
    /// the first one wins.
    pub fn new<I, S>(entries: I) -> Result<WordList, WordListError>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();

        for (canonical, score) in entries {
            word_list.add_word(canonical.as_ref(), score)?;
        }

        Ok(word_list)
    }

    /// Build a word list from bare words, each getting `DEFAULT_SCORE`.
    pub fn from_words<I, S>(words: I) -> Result<WordList, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        WordList::new(words.into_iter().map(|word| (word, DEFAULT_SCORE)))
    }

    /// Parse the contents of a word list file, with one entry per line formatted as either `word`
    /// or `word;score`. Blank lines are ignored.
    pub fn from_contents(contents: &str) -> Result<WordList, WordListError> {
        let entries = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| -> Result<(&str, i32), WordListError> {
                let line_parts: Vec<&str> = line.split(';').collect();
                let canonical = line_parts[0].trim();

                let score = match line_parts.get(1) {
                    None => DEFAULT_SCORE,
                    Some(raw_score) => raw_score
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| WordListError::InvalidScore((*raw_score).to_string()))?,
                };

                Ok((canonical, score))
            })
            .collect::<Result<Vec<_>, WordListError>>()?;

        WordList::new(entries)
    }

    /// Get the id for the given character, adding it to the glyph table if it isn't there yet.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        if let Some(&glyph_id) = self.glyph_id_by_char.get(&ch) {
            return glyph_id;
        }
        self.glyphs.push(ch);
        self.glyph_id_by_char.insert(ch, self.glyphs.len() - 1);
        self.glyphs.len() - 1
    }

    /// Add a word to the list, returning its id, or `None` if an entry with the same normalized
    /// form is already present.
    fn add_word(&mut self, canonical: &str, score: i32) -> Result<Option<WordId>, WordListError> {
        let normalized = normalize_word(canonical);
        if normalized.is_empty() {
            return Err(WordListError::InvalidWord(canonical.to_string()));
        }

        if self.word_id_by_string.contains_key(&normalized) {
            return Ok(None);
        }

        let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> = normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        let word_id = self.words.len();
        self.word_id_by_string.insert(normalized.clone(), word_id);
        self.words.push(Word {
            normalized_string: normalized,
            canonical_string: canonical.to_string(),
            glyphs,
            score,
        });

        Ok(Some(word_id))
    }

    /// Look up a word by any spelling that normalizes to it.
    #[must_use]
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.word_id_by_string.get(&normalize_word(word)).copied()
    }

    #[must_use]
    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// The normalized string for the given word.
    #[must_use]
    pub fn word_string(&self, word_id: WordId) -> &str {
        &self.words[word_id].normalized_string
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
