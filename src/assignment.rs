use std::collections::{BTreeMap, HashSet};

use crate::dictionary::{Dictionary, WordId};
use crate::structure::{Crossword, SlotId};
use crate::Puzzle;

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// Words chosen so far, keyed by slot. Partial while searching, complete once every slot of
/// the crossword has an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    choices: BTreeMap<SlotId, WordId>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Assign a word, returning whatever the slot held before.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        self.choices.insert(slot_id, word_id)
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        self.choices.remove(&slot_id)
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices.get(&slot_id).copied()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.choices.contains_key(&slot_id)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Choices in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.choices.iter().map(|(&slot_id, &word_id)| Choice { slot_id, word_id })
    }

    /// The text assigned to a slot, if any.
    pub fn word<'d>(&self, slot_id: SlotId, dictionary: &'d Dictionary) -> Option<&'d str> {
        self.get(slot_id).map(|word_id| dictionary.word(word_id).string.as_str())
    }
}

impl FromIterator<Choice> for Assignment {
    fn from_iter<I: IntoIterator<Item = Choice>>(choices: I) -> Assignment {
        Assignment {
            choices: choices.into_iter().map(|c| (c.slot_id, c.word_id)).collect(),
        }
    }
}

/// Does every slot in the crossword have a word?
pub fn is_complete(assignment: &Assignment, crossword: &Crossword) -> bool {
    crossword.slot_ids().all(|slot_id| assignment.contains(slot_id))
}

/// Check a (possibly partial) assignment against every constraint, cheapest first: no word is
/// used twice, every word fits its slot's length, and crossing assigned slots agree on their
/// shared cell.
pub fn is_consistent(puzzle: &Puzzle, assignment: &Assignment) -> bool {
    let mut seen: HashSet<WordId> = HashSet::with_capacity(assignment.len());
    if !assignment.iter().all(|choice| seen.insert(choice.word_id)) {
        return false;
    }

    let lengths_match = assignment.iter().all(|Choice { slot_id, word_id }| {
        puzzle.dictionary.word(word_id).len() == puzzle.crossword.slot(slot_id).length
    });
    if !lengths_match {
        return false;
    }

    assignment.iter().all(|Choice { slot_id, word_id }| {
        let word = puzzle.dictionary.word(word_id);

        puzzle.crossword.neighbors(slot_id).iter().all(|&neighbor| {
            let neighbor_word = match assignment.get(neighbor) {
                Some(neighbor_word_id) => puzzle.dictionary.word(neighbor_word_id),
                None => return true,
            };
            let overlap = match puzzle.crossword.overlap(slot_id, neighbor) {
                Some(overlap) => overlap,
                None => unreachable!("neighbors always overlap"),
            };

            match (word.glyph_at(overlap.first), neighbor_word.glyph_at(overlap.second)) {
                (Some(glyph), Some(neighbor_glyph)) => glyph == neighbor_glyph,
                _ => false,
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::assignment::{is_complete, is_consistent, Assignment, Choice};
    use crate::dictionary::Dictionary;
    use crate::structure::{Crossword, Slot};
    use crate::structure::Direction::{Across, Down};
    use crate::Puzzle;

    /// A 3-letter across entry whose last cell starts a 4-letter down entry.
    ///
    /// ___
    /// ##_
    /// ##_
    /// ##_
    fn fixture() -> (Crossword, Dictionary) {
        let crossword = Crossword::from_slots(
            3,
            4,
            vec![Slot::new(0, 0, Across, 3), Slot::new(0, 2, Down, 4)],
        )
        .expect("valid slots");
        let dictionary = Dictionary::from_words(["CAT", "TOES", "TAN", "NAPS", "DOGS", "SON"])
            .expect("non-empty list");
        (crossword, dictionary)
    }

    fn assign(dictionary: &Dictionary, words: &[(usize, &str)]) -> Assignment {
        words
            .iter()
            .map(|&(slot_id, word)| Choice {
                slot_id,
                word_id: dictionary.find(word).expect("in dictionary"),
            })
            .collect()
    }

    #[test]
    fn test_empty_assignment_is_consistent_but_incomplete() {
        let (crossword, dictionary) = fixture();
        let puzzle = Puzzle::new(&crossword, &dictionary);

        assert!(is_consistent(&puzzle, &Assignment::new()));
        assert!(!is_complete(&Assignment::new(), &crossword));
    }

    #[test]
    fn test_matching_crossing_is_consistent_and_complete() {
        let (crossword, dictionary) = fixture();
        let puzzle = Puzzle::new(&crossword, &dictionary);
        let assignment = assign(&dictionary, &[(0, "CAT"), (1, "TOES")]);

        assert!(is_consistent(&puzzle, &assignment));
        assert!(is_complete(&assignment, &crossword));
        assert_eq!(assignment.word(1, &dictionary), Some("TOES"));
    }

    #[test]
    fn test_mismatched_crossing_is_inconsistent() {
        let (crossword, dictionary) = fixture();
        let puzzle = Puzzle::new(&crossword, &dictionary);

        assert!(!is_consistent(&puzzle, &assign(&dictionary, &[(0, "CAT"), (1, "NAPS")])));
    }

    #[test]
    fn test_wrong_length_is_inconsistent() {
        let (crossword, dictionary) = fixture();
        let puzzle = Puzzle::new(&crossword, &dictionary);

        assert!(!is_consistent(&puzzle, &assign(&dictionary, &[(0, "TOES")])));
        assert!(!is_consistent(&puzzle, &assign(&dictionary, &[(1, "TAN")])));
    }

    #[test]
    fn test_repeated_word_is_inconsistent() {
        let crossword = Crossword::from_template("___\n###\n___").expect("valid template");
        let dictionary = Dictionary::from_words(["CAT", "DOG"]).expect("non-empty list");
        let puzzle = Puzzle::new(&crossword, &dictionary);

        assert!(!is_consistent(&puzzle, &assign(&dictionary, &[(0, "CAT"), (1, "CAT")])));
        assert!(is_consistent(&puzzle, &assign(&dictionary, &[(0, "CAT"), (1, "DOG")])));
    }

    #[test]
    fn test_consistency_matches_manual_enumeration() {
        let (crossword, dictionary) = fixture();
        let puzzle = Puzzle::new(&crossword, &dictionary);

        for across in 0..dictionary.len() {
            for down in 0..dictionary.len() {
                let across_word: Vec<char> = dictionary.word(across).string.chars().collect();
                let down_word: Vec<char> = dictionary.word(down).string.chars().collect();

                let expected = across != down &&
                    across_word.len() == 3 &&
                    down_word.len() == 4 &&
                    across_word[2] == down_word[0];

                let assignment: Assignment = [
                    Choice { slot_id: 0, word_id: across },
                    Choice { slot_id: 1, word_id: down },
                ].into_iter().collect();

                assert_eq!(
                    is_consistent(&puzzle, &assignment),
                    expected,
                    "{} / {}",
                    dictionary.word(across).string,
                    dictionary.word(down).string,
                );
            }
        }
    }

    #[test]
    fn test_insert_and_remove_report_previous_word() {
        let mut assignment = Assignment::new();

        assert_eq!(assignment.insert(2, 7), None);
        assert_eq!(assignment.insert(2, 8), Some(7));
        assert_eq!(assignment.remove(2), Some(8));
        assert!(assignment.is_empty());
    }
}
