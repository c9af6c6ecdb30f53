//! Per-slot candidate sets.
//!
//! Every removal is recorded on an undo trail, so rolling back a speculative move costs time
//! proportional to what the move removed rather than a copy of every domain. A `Snapshot` is
//! just a position on that trail.

use bit_set::BitSet;

use crate::dictionary::WordId;
use crate::structure::SlotId;
use crate::Puzzle;

/// A saved position in the domain history; see `Domains::snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    position: usize,
    epoch: usize,
}

/// The mutable candidate words for every slot in a puzzle.
#[derive(Debug, Clone)]
pub struct Domains {
    domains: Vec<BitSet>,

    /// Cached `len()` of each entry in `domains`, which would otherwise need a full scan.
    sizes: Vec<usize>,

    /// Every (slot, word) removal since the last freeze, oldest first.
    trail: Vec<(SlotId, WordId)>,

    /// Bumped by `freeze`, which invalidates all earlier snapshots.
    epoch: usize,
}

impl Domains {
    /// Seed every slot with the whole dictionary.
    pub fn new(puzzle: &Puzzle) -> Domains {
        let word_count = puzzle.dictionary.len();
        let full: BitSet = (0..word_count).collect();

        Domains {
            domains: puzzle.crossword.slot_ids().map(|_| full.clone()).collect(),
            sizes: puzzle.crossword.slot_ids().map(|_| word_count).collect(),
            trail: vec![],
            epoch: 0,
        }
    }

    /// Remove every word whose length doesn't match its slot.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle) {
        for (slot_id, slot) in puzzle.crossword.slots().iter().enumerate() {
            let mismatched: Vec<WordId> = self.domains[slot_id]
                .iter()
                .filter(|&word_id| puzzle.dictionary.word(word_id).len() != slot.length)
                .collect();

            for word_id in mismatched {
                self.remove(slot_id, word_id);
            }
        }
    }

    /// Drop a candidate. Returns whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.domains[slot_id].remove(word_id) {
            return false;
        }
        self.sizes[slot_id] -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Narrow a slot's domain to the single given word, returning how many candidates were
    /// removed. The word itself is never added if it had already been removed.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) -> usize {
        let others: Vec<WordId> =
            self.domains[slot_id].iter().filter(|&other| other != word_id).collect();

        for &other in &others {
            self.remove(slot_id, other);
        }

        others.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { position: self.trail.len(), epoch: self.epoch }
    }

    /// Put every domain back exactly as it was when the snapshot was taken, undoing removals
    /// newest first.
    pub fn restore(&mut self, snapshot: Snapshot) {
        assert_eq!(snapshot.epoch, self.epoch, "snapshot predates a freeze");
        debug_assert!(snapshot.position <= self.trail.len(), "snapshot is from a later state");

        while self.trail.len() > snapshot.position {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                self.domains[slot_id].insert(word_id);
                self.sizes[slot_id] += 1;
            }
        }
    }

    /// Forget the history so far. The current state becomes the floor that later restores
    /// can reach.
    pub fn freeze(&mut self) {
        self.trail.clear();
        self.epoch += 1;
    }

    pub fn domain_of(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    pub fn size(&self, slot_id: SlotId) -> usize {
        self.sizes[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.sizes[slot_id] == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// Remaining candidates for a slot, in ascending word id order.
    pub fn words(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domain_of(slot_id).iter()
    }

    /// The only remaining candidate, if exactly one is left.
    pub fn single_word(&self, slot_id: SlotId) -> Option<WordId> {
        if self.sizes[slot_id] == 1 {
            self.domains[slot_id].iter().next()
        } else {
            None
        }
    }

    /// Number of removals that a restore could still undo.
    pub fn history_len(&self) -> usize {
        self.trail.len()
    }
}
