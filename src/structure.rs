use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the Crossword's `slots` field.
pub type SlotId = usize;

/// Zero-indexed row and column of a cell, where row 0 is the top of the grid.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single run of cells that must hold one word. Identity is the start cell plus direction;
/// the cells it covers follow from that and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot, in word order.
    pub fn cells(&self) -> Vec<GridCoord> {
        (0..self.length).map(|cell_idx| self.cell(cell_idx)).collect()
    }

    fn cell(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        }
    }

    fn identity(&self) -> (usize, usize, Direction) {
        (self.row, self.col, self.direction)
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// The cell shared by two slots: the character at `first` in one slot's word has to equal the
/// character at `second` in the other's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
}

impl Overlap {
    /// The same overlap seen from the other slot.
    pub fn swapped(self) -> Overlap {
        Overlap { first: self.second, second: self.first }
    }
}

/// The static shape of a puzzle: which cells are open, which slots they form, and how those
/// slots cross. Built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Crossword {
    width: usize,
    height: usize,
    open: Vec<Vec<bool>>,
    slots: Vec<Slot>,
    overlaps: Vec<Vec<Option<Overlap>>>,
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,
}

impl Crossword {
    /// Build a crossword from a text template, one line per row, where `_` or `.` marks an open
    /// cell and anything else is a block. Short lines are padded with blocks, and an empty line
    /// is a row of blocks. Empty lines at the end of the template are dropped.
    pub fn from_template(template: &str) -> Result<Crossword> {
        let mut lines: Vec<&str> = template.lines().collect();
        while lines.last().map_or(false, |line| line.is_empty()) {
            lines.pop();
        }

        let rows: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();

        let height = rows.len();
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(Error::EmptyStructure);
        }

        let open: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| {
                (0..width)
                    .map(|col| matches!(row.get(col).copied(), Some('_') | Some('.')))
                    .collect()
            })
            .collect();

        // Maximal runs of at least two open cells, across slots first.
        let mut slots = vec![];
        for direction in [Direction::Across, Direction::Down] {
            for row in 0..height {
                for col in 0..width {
                    if !open[row][col] {
                        continue;
                    }

                    let (prev_open, run_length) = match direction {
                        Direction::Across => (
                            col > 0 && open[row][col - 1],
                            (col..width).take_while(|&c| open[row][c]).count(),
                        ),
                        Direction::Down => (
                            row > 0 && open[row - 1][col],
                            (row..height).take_while(|&r| open[r][col]).count(),
                        ),
                    };

                    if !prev_open && run_length > 1 {
                        slots.push(Slot::new(row, col, direction, run_length));
                    }
                }
            }
        }

        Crossword::build(width, height, open, slots)
    }

    /// Read a template file; see `from_template`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Crossword> {
        let template = fs::read_to_string(path)?;
        Crossword::from_template(&template)
    }

    /// Build a crossword from explicitly declared slots. The open cells are exactly the cells
    /// covered by some slot.
    pub fn from_slots(width: usize, height: usize, slots: Vec<Slot>) -> Result<Crossword> {
        if width == 0 || height == 0 || slots.is_empty() {
            return Err(Error::EmptyStructure);
        }

        let mut seen: HashSet<(usize, usize, Direction)> = HashSet::new();
        for slot in &slots {
            if slot.length == 0 {
                return Err(Error::EmptySlot { row: slot.row, col: slot.col });
            }
            if !seen.insert(slot.identity()) {
                return Err(Error::DuplicateSlot { row: slot.row, col: slot.col });
            }

            let (last_row, last_col) = slot.cell(slot.length - 1);
            if last_row >= height || last_col >= width {
                let (row, col) = if slot.row >= height || slot.col >= width {
                    (slot.row, slot.col)
                } else {
                    (last_row, last_col)
                };
                return Err(Error::CellOutOfBounds { row, col, width, height });
            }
        }

        let mut open = vec![vec![false; width]; height];
        for slot in &slots {
            for (row, col) in slot.cells() {
                open[row][col] = true;
            }
        }

        Crossword::build(width, height, open, slots)
    }

    fn build(
        width: usize,
        height: usize,
        open: Vec<Vec<bool>>,
        slots: Vec<Slot>,
    ) -> Result<Crossword> {
        if slots.is_empty() {
            return Err(Error::EmptyStructure);
        }

        // Map each cell to the (slot, offset) pairs covering it, then derive the overlaps from
        // every cell covered more than once.
        let mut entries_by_cell: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> =
            HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cells().into_iter().enumerate() {
                entries_by_cell.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let mut overlaps: Vec<Vec<Option<Overlap>>> = vec![vec![None; slots.len()]; slots.len()];
        for entries in entries_by_cell.values() {
            for &(a, a_cell) in entries {
                for &(b, b_cell) in entries {
                    if a == b {
                        continue;
                    }
                    if overlaps[a][b].is_some() {
                        return Err(Error::AmbiguousOverlap {
                            first: slots[a].to_string(),
                            second: slots[b].to_string(),
                        });
                    }
                    overlaps[a][b] = Some(Overlap { first: a_cell, second: b_cell });
                }
            }
        }

        let neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>> = overlaps
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, overlap)| overlap.is_some())
                    .map(|(other, _)| other)
                    .collect()
            })
            .collect();

        Ok(Crossword { width, height, open, slots, overlaps, neighbors })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Is this cell part of the puzzle? Out-of-range coordinates are not.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.open.get(row).and_then(|cells| cells.get(col)).copied().unwrap_or(false)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_ids(&self) -> std::ops::Range<SlotId> {
        0..self.slots.len()
    }

    /// Slots crossing the given one, in ascending id order.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors[slot_id].len()
    }

    /// Offsets of the shared cell, as (offset in `a`, offset in `b`), or `None` if the slots
    /// don't cross.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<Overlap> {
        self.overlaps[a][b]
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::structure::{Crossword, Direction, Overlap, Slot};
    use crate::structure::Direction::{Across, Down};

    /// ___
    /// _##
    /// _##
    #[test]
    fn test_template_with_two_crossing_slots() {
        let crossword = Crossword::from_template("___\n_##\n_##").expect("valid template");

        assert_eq!(crossword.width(), 3);
        assert_eq!(crossword.height(), 3);
        assert_eq!(crossword.slots(), &[Slot::new(0, 0, Across, 3), Slot::new(0, 0, Down, 3)]);
        assert_eq!(crossword.overlap(0, 1), Some(Overlap { first: 0, second: 0 }));
        assert_eq!(crossword.neighbors(0), &[1]);
        assert_eq!(crossword.neighbors(1), &[0]);
        assert!(crossword.is_open(2, 0));
        assert!(!crossword.is_open(2, 2));
        assert!(!crossword.is_open(5, 5));
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let crossword =
            Crossword::from_template("#___#\n#_##_\n#_##_\n#_##_\n#____").expect("valid template");

        for a in crossword.slot_ids() {
            for b in crossword.slot_ids() {
                if a == b {
                    assert_eq!(crossword.overlap(a, b), None);
                    continue;
                }
                assert_eq!(
                    crossword.overlap(a, b).map(Overlap::swapped),
                    crossword.overlap(b, a),
                );
                if let Some(overlap) = crossword.overlap(a, b) {
                    assert_eq!(
                        crossword.slot(a).cells()[overlap.first],
                        crossword.slot(b).cells()[overlap.second],
                    );
                }
            }
        }
    }

    #[test]
    fn test_template_ignores_single_cell_runs() {
        let crossword = Crossword::from_template("_#_\n###\n___").expect("valid template");

        assert_eq!(crossword.slot_count(), 1);
        assert_eq!(crossword.slot(0), &Slot::new(2, 0, Direction::Across, 3));
        assert!(crossword.neighbors(0).is_empty());
    }

    #[test]
    fn test_short_lines_are_padded_with_blocks() {
        let crossword = Crossword::from_template("____\n__\n").expect("valid template");

        assert_eq!(crossword.width(), 4);
        assert!(!crossword.is_open(1, 3));
        assert_eq!(crossword.slot_count(), 4);
    }

    #[test]
    fn test_leading_spaces_are_blocks() {
        let crossword = Crossword::from_template(" __\n___").expect("valid template");

        assert_eq!(crossword.width(), 3);
        assert!(!crossword.is_open(0, 0));
        assert!(crossword.is_open(0, 1));
        assert_eq!(
            crossword.slots(),
            &[
                Slot::new(0, 1, Across, 2),
                Slot::new(1, 0, Across, 3),
                Slot::new(0, 1, Down, 2),
                Slot::new(0, 2, Down, 2),
            ]
        );
    }

    #[test]
    fn test_empty_line_is_a_row_of_blocks() {
        let crossword = Crossword::from_template("__\n\n__\n\n").expect("valid template");

        assert_eq!(crossword.height(), 3);
        assert!(!crossword.is_open(1, 0));
        assert!(!crossword.is_open(1, 1));
        assert_eq!(crossword.slots(), &[Slot::new(0, 0, Across, 2), Slot::new(2, 0, Across, 2)]);
        assert!(crossword.neighbors(0).is_empty());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert!(matches!(Crossword::from_template("\n  \n"), Err(Error::EmptyStructure)));
        assert!(matches!(Crossword::from_template("#_#\n###"), Err(Error::EmptyStructure)));
    }

    #[test]
    fn test_from_slots_rejects_out_of_bounds() {
        let result = Crossword::from_slots(3, 3, vec![Slot::new(0, 1, Across, 3)]);

        assert!(matches!(
            result,
            Err(Error::CellOutOfBounds { row: 0, col: 3, width: 3, height: 3 })
        ));
    }

    #[test]
    fn test_from_slots_rejects_zero_length() {
        let result = Crossword::from_slots(3, 3, vec![Slot::new(0, 0, Down, 0)]);

        assert!(matches!(result, Err(Error::EmptySlot { row: 0, col: 0 })));
    }

    #[test]
    fn test_from_slots_rejects_duplicates() {
        let result = Crossword::from_slots(
            4,
            4,
            vec![Slot::new(1, 0, Across, 3), Slot::new(1, 0, Across, 4)],
        );

        assert!(matches!(result, Err(Error::DuplicateSlot { row: 1, col: 0 })));
    }

    #[test]
    fn test_from_slots_rejects_slots_sharing_two_cells() {
        let result = Crossword::from_slots(
            5,
            1,
            vec![Slot::new(0, 0, Across, 3), Slot::new(0, 1, Across, 3)],
        );

        assert!(matches!(result, Err(Error::AmbiguousOverlap { .. })));
    }

    #[test]
    fn test_from_slots_derives_open_cells() {
        let crossword = Crossword::from_slots(
            4,
            3,
            vec![Slot::new(0, 0, Across, 3), Slot::new(0, 2, Down, 3)],
        )
        .expect("valid slots");

        assert_eq!(crossword.overlap(0, 1), Some(Overlap { first: 2, second: 0 }));
        assert!(crossword.is_open(2, 2));
        assert!(!crossword.is_open(1, 0));
        assert!(!crossword.is_open(0, 3));
        assert_eq!(crossword.slot(1).to_string(), "(0, 2) down : 3");
    }
}
