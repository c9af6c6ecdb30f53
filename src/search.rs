use std::cmp::Reverse;

use instant::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::assignment::{is_complete, is_consistent, Assignment, Choice};
use crate::consistency::{ac3, Arc};
use crate::dictionary::{Dictionary, WordId};
use crate::domains::Domains;
use crate::structure::{Crossword, SlotId};
use crate::Puzzle;

/// What to do when the words forced by inference conflict with the current assignment (for
/// example two slots left with the same single word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferredConflict {
    /// Abandon the candidate: restore the domains from before it was tried and move on to the
    /// next one.
    #[default]
    Rollback,

    /// Drop only the forced words. The narrowed domains are kept and the search continues
    /// below the candidate on its own.
    KeepNarrowing,
}

/// Knobs for a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Propagate each choice with arc consistency and pick up any slots it leaves with a single
    /// candidate.
    pub inference: bool,
    pub inferred_conflict: InferredConflict,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig { inference: true, inferred_conflict: InferredConflict::default() }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Calls into the recursive search, including the top-level one.
    pub backtrack_calls: u64,
    /// Candidate words tentatively assigned, whether or not they survived.
    pub words_tested: u64,
    /// Slots filled because inference left them a single candidate.
    pub inferred_assignments: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation. `assignment` is `None` when no
/// complete assignment exists.
#[derive(Debug)]
pub struct FillOutcome {
    pub assignment: Option<Assignment>,
    pub statistics: Statistics,
}

/// Pick the unassigned slot with the fewest remaining candidates, preferring slots that cross
/// more others, then the lowest slot id.
pub fn select_unassigned_slot(
    puzzle: &Puzzle,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    puzzle
        .crossword
        .slot_ids()
        .filter(|&slot_id| !assignment.contains(slot_id))
        .min_by_key(|&slot_id| (domains.size(slot_id), Reverse(puzzle.crossword.degree(slot_id))))
}

/// Order a slot's candidates by how many words each would rule out of the domains of unassigned
/// crossing slots, fewest first. Ties keep ascending word id order.
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &Domains,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    // For each unassigned neighbor: the offset of the shared cell in our slot, the neighbor's
    // domain size, and how many of its words put each glyph in the shared cell. A candidate
    // eliminates every neighbor word that doesn't share its glyph there.
    struct NeighborCounts {
        cell_idx: usize,
        option_count: usize,
        glyph_counts: Vec<usize>,
    }

    let neighbor_counts: Vec<NeighborCounts> = puzzle
        .crossword
        .neighbors(slot_id)
        .iter()
        .filter(|&&neighbor| !assignment.contains(neighbor))
        .filter_map(|&neighbor| {
            let overlap = puzzle.crossword.overlap(slot_id, neighbor)?;
            let mut glyph_counts = vec![0; puzzle.dictionary.glyph_count()];
            for word_id in domains.words(neighbor) {
                if let Some(glyph) = puzzle.dictionary.word(word_id).glyph_at(overlap.second) {
                    glyph_counts[glyph] += 1;
                }
            }

            Some(NeighborCounts {
                cell_idx: overlap.first,
                option_count: domains.size(neighbor),
                glyph_counts,
            })
        })
        .collect();

    let mut options: Vec<WordId> = domains.words(slot_id).collect();
    options.sort_by_cached_key(|&word_id| {
        let word = puzzle.dictionary.word(word_id);

        neighbor_counts
            .iter()
            .map(|counts| {
                let compatible =
                    word.glyph_at(counts.cell_idx).map_or(0, |glyph| counts.glyph_counts[glyph]);
                counts.option_count - compatible
            })
            .sum::<usize>()
    });

    options
}

/// Backtracking search over one puzzle. Owns the domains for the lifetime of the solve.
pub struct Solver<'a> {
    puzzle: Puzzle<'a>,
    config: SolverConfig,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> Solver<'a> {
    pub fn new(puzzle: Puzzle<'a>, config: SolverConfig) -> Solver<'a> {
        let domains = Domains::new(&puzzle);
        Solver { puzzle, config, domains, statistics: Statistics::default() }
    }

    /// Enforce node and arc consistency, then search for a complete assignment.
    pub fn solve(mut self) -> FillOutcome {
        let start = Instant::now();

        debug!(
            slots = self.puzzle.crossword.slot_count(),
            words = self.puzzle.dictionary.len(),
            "starting solve"
        );

        self.domains.enforce_node_consistency(&self.puzzle);

        let assignment = if ac3(&self.puzzle, &mut self.domains, None) {
            // Nothing ever backtracks past the initial propagation.
            self.domains.freeze();

            let mut assignment = Assignment::new();
            if self.backtrack(&mut assignment) {
                Some(assignment)
            } else {
                None
            }
        } else {
            debug!("initial arc consistency left a slot without candidates");
            None
        };

        self.statistics.duration = start.elapsed();

        info!(
            solved = assignment.is_some(),
            backtrack_calls = self.statistics.backtrack_calls,
            words_tested = self.statistics.words_tested,
            duration = ?self.statistics.duration,
            "finished solve"
        );

        FillOutcome { assignment, statistics: self.statistics }
    }

    /// Extend `assignment` to a complete one. On success the assignment is left complete; on
    /// failure it and the domains are as they were on entry.
    fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        self.statistics.backtrack_calls += 1;

        if is_complete(assignment, self.puzzle.crossword) {
            return true;
        }

        let slot_id = match select_unassigned_slot(&self.puzzle, &self.domains, assignment) {
            Some(slot_id) => slot_id,
            None => unreachable!("an incomplete assignment has an unassigned slot"),
        };

        let snapshot = self.domains.snapshot();

        for word_id in order_domain_values(&self.puzzle, &self.domains, slot_id, assignment) {
            self.statistics.words_tested += 1;

            assignment.insert(slot_id, word_id);
            if !is_consistent(&self.puzzle, assignment) {
                assignment.remove(slot_id);
                continue;
            }

            let mut inferred: Vec<Choice> = vec![];
            if self.config.inference {
                match self.infer(slot_id, word_id, assignment) {
                    Some(choices) => inferred = choices,
                    None => {
                        trace!(slot_id, word_id, "inference emptied a domain");
                        self.domains.restore(snapshot);
                        assignment.remove(slot_id);
                        continue;
                    }
                }
            }

            if !inferred.is_empty() {
                for choice in &inferred {
                    assignment.insert(choice.slot_id, choice.word_id);
                }

                if !is_consistent(&self.puzzle, assignment) {
                    for choice in &inferred {
                        assignment.remove(choice.slot_id);
                    }
                    inferred.clear();

                    match self.config.inferred_conflict {
                        InferredConflict::Rollback => {
                            trace!(slot_id, word_id, "inferred words conflict, rolling back");
                            self.domains.restore(snapshot);
                            assignment.remove(slot_id);
                            continue;
                        }
                        InferredConflict::KeepNarrowing => {
                            trace!(slot_id, word_id, "inferred words conflict, dropping them");
                        }
                    }
                }

                self.statistics.inferred_assignments += inferred.len() as u64;
            }

            if self.backtrack(assignment) {
                return true;
            }

            for choice in &inferred {
                assignment.remove(choice.slot_id);
            }
            self.domains.restore(snapshot);
            assignment.remove(slot_id);
        }

        false
    }

    /// Fix `slot_id` to `word_id` in the domains and propagate outward. Returns the unassigned
    /// slots left with exactly one candidate, or `None` if some domain ran dry.
    fn infer(
        &mut self,
        slot_id: SlotId,
        word_id: WordId,
        assignment: &Assignment,
    ) -> Option<Vec<Choice>> {
        self.domains.restrict_to(slot_id, word_id);

        let crossword = self.puzzle.crossword;
        let arcs: Vec<Arc> =
            crossword.neighbors(slot_id).iter().map(|&neighbor| (neighbor, slot_id)).collect();
        if !ac3(&self.puzzle, &mut self.domains, Some(arcs)) {
            return None;
        }

        let forced: Vec<Choice> = crossword
            .slot_ids()
            .filter(|&other| !assignment.contains(other))
            .filter_map(|other| {
                let word_id = self.domains.single_word(other)?;
                Some(Choice { slot_id: other, word_id })
            })
            .collect();

        Some(forced)
    }
}

/// Fill the crossword with words from the dictionary using the default configuration. Returns
/// `None` if no complete, consistent assignment exists.
pub fn solve(crossword: &Crossword, dictionary: &Dictionary) -> Option<Assignment> {
    Solver::new(Puzzle::new(crossword, dictionary), SolverConfig::default()).solve().assignment
}
