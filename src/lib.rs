//! Fill a crossword grid with dictionary words by treating it as a constraint satisfaction
//! problem: every slot takes one word of the right length, no word is used twice, and crossing
//! slots agree on their shared letter.
//!
//! Solving runs node consistency and AC-3 arc consistency over per-slot domains, then a
//! backtracking search ordered by minimum remaining values (degree breaks ties) and least
//! constraining value, propagating every choice with AC-3.

pub mod assignment;
pub mod consistency;
pub mod dictionary;
pub mod domains;
pub mod error;
pub mod render;
pub mod search;
pub mod structure;

pub use assignment::{is_complete, is_consistent, Assignment, Choice};
pub use dictionary::{Dictionary, GlyphId, Word, WordId};
pub use domains::{Domains, Snapshot};
pub use error::{Error, Result};
pub use render::{load_font, render_grid, render_image, save_image};
pub use search::{solve, FillOutcome, InferredConflict, Solver, SolverConfig, Statistics};
pub use structure::{Crossword, Direction, Overlap, Slot, SlotId};

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// The read-only inputs to a solve: the grid's structure and the words that may fill it.
#[derive(Debug, Clone, Copy)]
pub struct Puzzle<'a> {
    pub crossword: &'a Crossword,
    pub dictionary: &'a Dictionary,
}

impl<'a> Puzzle<'a> {
    pub fn new(crossword: &'a Crossword, dictionary: &'a Dictionary) -> Puzzle<'a> {
        Puzzle { crossword, dictionary }
    }
}
