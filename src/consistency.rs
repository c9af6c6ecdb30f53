use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::dictionary::WordId;
use crate::domains::Domains;
use crate::structure::{Crossword, SlotId};
use crate::Puzzle;

/// An ordered pair of crossing slots `(x, y)`: revising it makes `x` consistent with `y`.
pub type Arc = (SlotId, SlotId);

/// FIFO worklist of arcs still to be revised. Duplicates are allowed; revising an arc that's
/// already consistent is a no-op.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<Arc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
    where
        Items: IntoIterator<Item = Arc>,
    {
        ArcQueue { queue: VecDeque::from_iter(items) }
    }

    fn pop_front(&mut self) -> Option<Arc> {
        self.queue.pop_front()
    }

    fn enqueue(&mut self, arc: Arc) {
        self.queue.push_back(arc);
    }
}

/// Every ordered pair of crossing slots, each direction separately.
pub fn all_arcs(crossword: &Crossword) -> impl Iterator<Item = Arc> + '_ {
    crossword.slot_ids().flat_map(move |x| crossword.neighbors(x).iter().map(move |&y| (x, y)))
}

/// Remove from `x`'s domain every word that no word in `y`'s domain agrees with at their shared
/// cell. Returns whether anything was removed; slots that don't cross are left alone.
pub fn revise(puzzle: &Puzzle, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let overlap = match puzzle.crossword.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    // The glyphs `y` can still place in the shared cell. A word in `x` survives iff its own glyph
    // there is one of them.
    let mut supported = BitSet::with_capacity(puzzle.dictionary.glyph_count());
    for word_id in domains.words(y) {
        if let Some(glyph) = puzzle.dictionary.word(word_id).glyph_at(overlap.second) {
            supported.insert(glyph);
        }
    }

    let unsupported: Vec<WordId> = domains
        .words(x)
        .filter(|&word_id| {
            !puzzle
                .dictionary
                .word(word_id)
                .glyph_at(overlap.first)
                .map_or(false, |glyph| supported.contains(glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    if !unsupported.is_empty() {
        trace!(x, y, removed = unsupported.len(), "revised arc");
    }

    !unsupported.is_empty()
}

/// Make domains arc consistent, starting from `arcs` or, if none are given, from every arc in
/// the puzzle. Returns false as soon as any domain is emptied.
pub fn ac3(puzzle: &Puzzle, domains: &mut Domains, arcs: Option<Vec<Arc>>) -> bool {
    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_queue(arcs),
        None => ArcQueue::with_initial_queue(all_arcs(puzzle.crossword)),
    };

    while let Some((x, y)) = queue.pop_front() {
        if !revise(puzzle, domains, x, y) {
            continue;
        }

        if domains.is_empty(x) {
            debug!(slot = %puzzle.crossword.slot(x), "arc consistency emptied a domain");
            return false;
        }

        // Narrowing `x` may leave words in its other neighbors without support.
        for &z in puzzle.crossword.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    true
}
