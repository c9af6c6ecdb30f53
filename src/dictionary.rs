use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter or whatever, based on its index in the Dictionary's
/// `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the Dictionary's `words` field.
pub type WordId = usize;

/// A word that can be chosen for a slot, with its characters interned as glyph ids so that
/// crossing checks compare integers.
#[derive(Debug)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph_at(&self, cell_idx: usize) -> Option<GlyphId> {
        self.glyphs.get(cell_idx).copied()
    }
}

/// The set of candidate words, normalized to upper case and de-duplicated.
pub struct Dictionary {
    glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl Debug for Dictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl Dictionary {
    /// Build a dictionary from raw entries. Entries are trimmed and upper-cased, blank entries
    /// are dropped, and only the first occurrence of a repeated word is kept.
    pub fn from_words<I, S>(entries: I) -> Result<Dictionary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Dictionary {
            glyphs: SmallVec::new(),
            words: vec![],
            ids_by_string: HashMap::new(),
        };
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();

        for entry in entries {
            let string = entry.as_ref().trim().to_uppercase();
            if string.is_empty() || dictionary.ids_by_string.contains_key(&string) {
                continue;
            }

            let glyphs = string
                .chars()
                .map(|c| {
                    *glyph_ids_by_char.entry(c).or_insert_with(|| {
                        dictionary.glyphs.push(c);
                        dictionary.glyphs.len() - 1
                    })
                })
                .collect();

            dictionary.ids_by_string.insert(string.clone(), dictionary.words.len());
            dictionary.words.push(Word { string, glyphs });
        }

        if dictionary.words.is_empty() {
            return Err(Error::EmptyDictionary);
        }

        Ok(dictionary)
    }

    /// Parse a word list with one word per line.
    pub fn parse(text: &str) -> Result<Dictionary> {
        Dictionary::from_words(text.lines())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dictionary> {
        let text = fs::read_to_string(path)?;
        Dictionary::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Look up a word by its text; the lookup is case-insensitive like loading.
    pub fn find(&self, word: &str) -> Option<WordId> {
        self.ids_by_string.get(&word.trim().to_uppercase()).copied()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }
}

#[cfg(test)]
mod tests {
    use crate::dictionary::Dictionary;
    use crate::error::Error;

    #[test]
    fn test_entries_are_normalized_and_deduplicated() {
        let dictionary = Dictionary::parse("cat\n  Dog \n\nCAT\ncar\n").expect("non-empty list");

        let strings: Vec<&str> = dictionary.words().iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, vec!["CAT", "DOG", "CAR"]);
        assert_eq!(dictionary.find("dog"), Some(1));
        assert_eq!(dictionary.find("BIRD"), None);
    }

    #[test]
    fn test_glyphs_are_shared_between_words() {
        let dictionary = Dictionary::from_words(["CAT", "ACT"]).expect("non-empty list");

        assert_eq!(dictionary.glyph_count(), 3);
        assert_eq!(dictionary.word(0).glyphs[0], dictionary.word(1).glyphs[1]);
        assert_eq!(dictionary.glyph(dictionary.word(1).glyphs[2]), 'T');
        assert_eq!(dictionary.word(0).glyph_at(3), None);
    }

    #[test]
    fn test_length_counts_characters() {
        let dictionary = Dictionary::from_words(["ÉTÉ"]).expect("non-empty list");

        assert_eq!(dictionary.word(0).len(), 3);
    }

    #[test]
    fn test_empty_word_list_is_rejected() {
        assert!(matches!(Dictionary::parse("\n \n"), Err(Error::EmptyDictionary)));
    }
}
