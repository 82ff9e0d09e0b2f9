//! This module implements grid filling using a recursive backtracking search over the domains
//! left after node consistency and AC-3. Variables are ordered by minimum remaining values with
//! degree as the tie-break, and values by how few options they would take away from unassigned
//! crossing slots. Optionally, each tentative choice is followed by a round of inference (dupe
//! elimination plus AC-3 seeded from the chosen slot), with every resulting elimination rolled back
//! when the choice is retracted.

use log::{debug, trace};
use std::cmp::Reverse;
use std::mem;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::arc_consistency::{
    ac3, enforce_node_consistency, establish_arc_consistency, ArcConsistencyResult,
};
use crate::assignment::{is_complete, is_consistent, Assignment};
use crate::domains::Domains;
use crate::grid_config::{Arc, GridConfig};
use crate::types::{SlotId, WordId};
use crate::word_list::WordList;

/// Settings for a fill operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FillOptions {
    /// After each tentative choice, remove the chosen word from every other slot and re-establish
    /// arc consistency around the choice before descending.
    pub inference: bool,

    /// Words scoring below this are excluded from every slot.
    pub min_score: Option<i32>,
}

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Statistics {
    /// Number of search states visited.
    pub states: usize,

    /// Number of tentative choices that were undone.
    pub backtracks: usize,

    /// Number of choices rejected because inference wiped out a domain.
    pub failed_inferences: usize,

    /// Number of arcs revised, including the initial AC-3 pass.
    pub revisions: usize,

    /// Number of options removed by node consistency and the initial AC-3 pass.
    pub initial_eliminations: usize,

    pub total_time: Duration,
    pub initial_arc_consistency_time: Duration,
    pub search_time: Duration,
}

/// A struct representing the results of a successful fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// The solver state for one grid and word list: the live domain of every slot plus statistics.
pub struct CrosswordSolver<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    options: FillOptions,
    domains: Domains,
    statistics: Statistics,
}

impl<'a> CrosswordSolver<'a> {
    /// Create a solver whose domains all hold the full word list.
    #[must_use]
    pub fn new(
        config: &'a GridConfig,
        word_list: &'a WordList,
        options: FillOptions,
    ) -> CrosswordSolver<'a> {
        CrosswordSolver {
            config,
            word_list,
            options,
            domains: Domains::new(config, word_list),
            statistics: Statistics::default(),
        }
    }

    #[must_use]
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Remove every option that violates its slot's unary constraints.
    pub fn enforce_node_consistency(&mut self) -> usize {
        let eliminated = enforce_node_consistency(
            self.config,
            self.word_list,
            &mut self.domains,
            self.options.min_score,
        );
        self.statistics.initial_eliminations += eliminated;
        eliminated
    }

    /// Run AC-3 on the current domains, starting from every arc in the grid if `arcs` is `None`.
    pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> ArcConsistencyResult {
        let result = ac3(self.config, self.word_list, &mut self.domains, arcs);
        if let Ok(success) = &result {
            self.statistics.revisions += success.revisions;
            self.statistics.initial_eliminations += success.eliminations;
        }
        result
    }

    #[must_use]
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        is_consistent(self.config, self.word_list, assignment)
    }

    #[must_use]
    pub fn assignment_complete(&self, assignment: &Assignment) -> bool {
        is_complete(self.config, assignment)
    }

    /// Choose the unassigned slot with the fewest remaining options. Ties go to the slot with the
    /// most crossings, and then to the lowest slot id (i.e. the earliest `SlotSpec`).
    #[must_use]
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !assignment.contains(slot_id))
            .min_by_key(|&slot_id| {
                (
                    self.domains.option_count(slot_id),
                    Reverse(self.config.slot_configs[slot_id].degree()),
                    slot_id,
                )
            })
    }

    /// List the slot's options, ordered by how many unassigned crossing slots also have that word
    /// as an option (and so would lose it if it were chosen here). Ties go to the higher-scoring
    /// word, then to word list order.
    #[must_use]
    pub fn order_domain_values(&self, slot_id: SlotId, assignment: &Assignment) -> Vec<WordId> {
        let unassigned_neighbors: Vec<SlotId> = self
            .config
            .neighbors(slot_id)
            .into_iter()
            .filter(|&other_slot_id| !assignment.contains(other_slot_id))
            .collect();

        let mut word_ids = self.domains.words(slot_id);
        word_ids.sort_by_cached_key(|&word_id| {
            let ruled_out = unassigned_neighbors
                .iter()
                .filter(|&&other_slot_id| self.domains.contains(other_slot_id, word_id))
                .count();
            (
                ruled_out,
                Reverse(self.word_list.word(word_id).score),
                word_id,
            )
        });
        word_ids
    }

    /// Propagate the implications of choosing `word_id` for `slot_id`, if inference is enabled.
    /// Returns false (with every change undone) if some domain is wiped out.
    fn infer(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.options.inference {
            return true;
        }

        self.domains.choose_word(slot_id, word_id);

        let mut arcs: Vec<Arc> = self
            .config
            .neighbors(slot_id)
            .into_iter()
            .map(|other_slot_id| (other_slot_id, slot_id))
            .collect();

        // No other slot can use this word anymore.
        for other_slot_id in 0..self.config.slot_count() {
            if other_slot_id == slot_id
                || self.domains.is_fixed(other_slot_id)
                || !self.domains.contains(other_slot_id, word_id)
            {
                continue;
            }

            self.domains.eliminate(other_slot_id, word_id, Some(slot_id));

            if self.domains.is_wiped_out(other_slot_id) {
                trace!("choosing word {word_id} for slot {slot_id} wipes out slot {other_slot_id}");
                self.statistics.failed_inferences += 1;
                self.retract(slot_id);
                return false;
            }

            arcs.extend(
                self.config
                    .neighbors(other_slot_id)
                    .into_iter()
                    .map(|neighbor_id| (neighbor_id, other_slot_id)),
            );
        }

        match establish_arc_consistency(
            self.config,
            self.word_list,
            &mut self.domains,
            Some(arcs),
            Some(slot_id),
        ) {
            Ok(success) => {
                self.statistics.revisions += success.revisions;
                true
            }
            Err(failure) => {
                trace!(
                    "choosing word {word_id} for slot {slot_id} wipes out slot {}",
                    failure.wiped_out_slot_id
                );
                self.statistics.failed_inferences += 1;
                self.retract(slot_id);
                false
            }
        }
    }

    /// Undo a choice along with every elimination it caused.
    fn retract(&mut self, slot_id: SlotId) {
        if self.options.inference {
            self.domains.clear_choice(slot_id);
            self.domains.clear_eliminations(slot_id);
        }
    }

    /// Extend `assignment` until it's complete, returning false if that's impossible. On success
    /// the completed fill is left in `assignment`; on failure `assignment` and the domains are
    /// returned to the state they were in when this was called.
    pub fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        self.statistics.states += 1;

        if self.assignment_complete(assignment) {
            return true;
        }

        let Some(slot_id) = self.select_unassigned_variable(assignment) else {
            return false;
        };

        trace!(
            "filling slot {} ({} options, {} assigned)",
            self.config.slot_configs[slot_id].slot_key(),
            self.domains.option_count(slot_id),
            assignment.len()
        );

        for word_id in self.order_domain_values(slot_id, assignment) {
            assignment.insert(slot_id, word_id);

            if self.consistent(assignment) {
                if self.infer(slot_id, word_id) {
                    if self.backtrack(assignment) {
                        return true;
                    }
                    self.retract(slot_id);
                }
            } else {
                trace!(
                    "rejecting {} for slot {slot_id}",
                    self.word_list.word_string(word_id)
                );
            }

            assignment.remove(slot_id);
            self.statistics.backtracks += 1;
        }

        trace!(
            "exhausted options for slot {}",
            self.config.slot_configs[slot_id].slot_key()
        );

        false
    }

    /// Run node consistency, AC-3, and backtracking search from scratch, returning a complete and
    /// consistent assignment or `None` if there isn't one.
    pub fn solve(&mut self) -> Option<Assignment> {
        let start = Instant::now();
        self.domains = Domains::new(self.config, self.word_list);
        self.statistics = Statistics::default();

        self.enforce_node_consistency();

        // If some slot has no words of the right shape, there's nothing to search.
        if let Some(slot_id) =
            (0..self.config.slot_count()).find(|&slot_id| self.domains.is_wiped_out(slot_id))
        {
            debug!(
                "no options for slot {} after node consistency",
                self.config.slot_configs[slot_id].slot_key()
            );
            self.statistics.total_time = start.elapsed();
            return None;
        }

        let initial_result = self.ac3(None);
        self.statistics.initial_arc_consistency_time = start.elapsed();
        if initial_result.is_err() {
            self.statistics.total_time = start.elapsed();
            return None;
        }

        let search_start = Instant::now();
        let mut assignment = Assignment::new();
        let found = self.backtrack(&mut assignment);
        self.statistics.search_time = search_start.elapsed();
        self.statistics.total_time = start.elapsed();

        if found {
            debug!("found fill: {:?}", self.statistics);
            Some(assignment)
        } else {
            debug!("no fill exists: {:?}", self.statistics);
            None
        }
    }
}

/// Search for a fill of the given grid using words from the given list. `None` means no fill
/// exists.
#[must_use]
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: FillOptions,
) -> Option<FillSuccess> {
    let mut solver = CrosswordSolver::new(config, word_list, options);
    let assignment = solver.solve()?;

    Some(FillSuccess {
        statistics: mem::take(&mut solver.statistics),
        assignment,
    })
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::FillOptions;

    #[test]
    fn test_fill_options_deserialization_fills_defaults() {
        let options: FillOptions = serde_json::from_str(r#"{"inference": true}"#).unwrap();

        assert_eq!(
            options,
            FillOptions {
                inference: true,
                min_score: None,
            }
        );
        assert_eq!(
            serde_json::to_string(&FillOptions::default()).unwrap(),
            r#"{"inference":false,"min_score":null}"#
        );
    }
}
