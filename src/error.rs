//! Errors raised while building a crossword structure, loading a word list or saving a grid
//! image.
//!
//! Running out of candidates during the search is not an error: the solver reports it as
//! `None`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading a structure or word file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The structure has no cells, or no run of open cells long enough to form a slot.
    #[error("Structure contains no slots")]
    EmptyStructure,

    /// A slot runs past the edge of the grid.
    #[error("Cell ({row}, {col}) is outside the {width}x{height} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    /// A slot was declared with length zero.
    #[error("Slot starting at ({row}, {col}) has no cells")]
    EmptySlot { row: usize, col: usize },

    /// Two slots share the same start cell and direction.
    #[error("Slot starting at ({row}, {col}) is declared twice")]
    DuplicateSlot { row: usize, col: usize },

    /// Two slots share more than one cell, so there's no single overlap to constrain.
    #[error("Slots {first} and {second} share more than one cell")]
    AmbiguousOverlap { first: String, second: String },

    /// The word list had no usable entries.
    #[error("Dictionary contains no words")]
    EmptyDictionary,

    /// Encoding or writing the grid image failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The font file couldn't be parsed.
    #[error("Invalid font: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),
}

pub type Result<T> = std::result::Result<T, Error>;
