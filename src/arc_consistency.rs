//! This module contains node consistency and a crossword-specific implementation of the AC-3
//! algorithm. For our purposes:
//!
//! - A slot is node-consistent when every word in its domain satisfies the slot's own unary
//!   constraints: the word's length, plus the slot's filter pattern and the minimum score if
//!   either is configured.
//!
//! - An arc `(x, y)` is consistent when every word in `x`'s domain has at least one word in `y`'s
//!   domain with the same glyph in their shared cell. For example, if 1D doesn't have any options
//!   starting with the letter A, any option for 1A that starts with A has to go.
//!
//! We keep revising arcs until no more eliminations are possible or some domain is wiped out.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::{Arc, GridConfig, SlotConfig};
use crate::types::{SlotId, WordId};
use crate::util::{build_glyph_counts_for_cell, is_supported};
use crate::word_list::WordList;

/// Result from a successful call to `establish_arc_consistency`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,

    /// How many words were eliminated across all slots.
    pub eliminations: usize,
}

/// Result from a failed call to `establish_arc_consistency`: some slot has no words left, so no
/// fill is possible from the current domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub wiped_out_slot_id: SlotId,
}

/// Result from a call to `establish_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Does the word satisfy every unary constraint on the slot?
#[must_use]
pub fn satisfies_unary_constraints(
    slot_config: &SlotConfig,
    word_list: &WordList,
    word_id: WordId,
    min_score: Option<i32>,
) -> bool {
    let word = word_list.word(word_id);

    if word.length() != slot_config.length {
        return false;
    }

    if min_score.map_or(false, |min_score| word.score < min_score) {
        return false;
    }

    if let Some(filter_pattern) = &slot_config.filter_pattern {
        match filter_pattern.is_match(&word.normalized_string) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                debug!(
                    "filter pattern for slot {} failed on {:?}, treating it as a non-match: {err}",
                    slot_config.slot_key(),
                    word.normalized_string
                );
                return false;
            }
        }
    }

    true
}

/// Remove every word from every domain that violates its slot's unary constraints. Returns the
/// number of words eliminated. These eliminations are permanent.
pub fn enforce_node_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    min_score: Option<i32>,
) -> usize {
    let mut eliminated = 0;

    for slot_config in &config.slot_configs {
        for word_id in domains.words(slot_config.id) {
            if !satisfies_unary_constraints(slot_config, word_list, word_id, min_score) {
                domains.eliminate(slot_config.id, word_id, None);
                eliminated += 1;
            }
        }
    }

    debug!(
        "node consistency eliminated {eliminated} options across {} slots",
        config.slot_count()
    );

    eliminated
}

/// Make `x` arc-consistent with `y` by removing every word from `x`'s domain that has no word in
/// `y`'s domain agreeing with it in their shared cell. Returns the number of words removed; zero
/// means the domain was left unchanged. Slots with a fixed choice are never revised.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
    blamed_slot_id: Option<SlotId>,
) -> usize {
    let Some((x_cell, y_cell)) = config.overlaps(x, y) else {
        return 0;
    };

    if domains.is_fixed(x) {
        return 0;
    }

    let y_counts = build_glyph_counts_for_cell(word_list, y_cell, domains.iter(y));

    let mut removed = 0;
    for word_id in domains.words(x) {
        if !is_supported(word_list, word_id, x_cell, &y_counts) {
            domains.eliminate(x, word_id, blamed_slot_id);
            removed += 1;
        }
    }

    removed
}

/// Run AC-3 over the given domains. If `arcs` is `None`, every arc in the grid is checked;
/// otherwise only the given arcs are, which is enough when the domains were arc-consistent before
/// some slots were narrowed. Any elimination is blamed on `blamed_slot_id` so it can be rolled back.
pub fn establish_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
    blamed_slot_id: Option<SlotId>,
) -> ArcConsistencyResult {
    let mut queue: VecDeque<Arc> = VecDeque::new();
    let mut queued: HashSet<Arc> = HashSet::new();

    for arc in arcs.unwrap_or_else(|| config.arcs()) {
        if !domains.is_fixed(arc.0) && queued.insert(arc) {
            queue.push_back(arc);
        }
    }

    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        queued.remove(&(x, y));
        success.revisions += 1;

        let removed = revise(config, word_list, domains, x, y, blamed_slot_id);
        if removed == 0 {
            continue;
        }
        success.eliminations += removed;

        if domains.is_wiped_out(x) {
            trace!("domain of slot {x} wiped out while revising against slot {y}");
            return Err(ArcConsistencyFailure {
                wiped_out_slot_id: x,
            });
        }

        // Shrinking `x` may have removed the only support for words in its other neighbors.
        for z in config.neighbors(x) {
            if z != y && !domains.is_fixed(z) && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    // A slot can start out empty without any revision touching it (e.g. a slot with no crossings
    // and no words of the right length), which still means there's no fill.
    if let Some(wiped_out_slot_id) =
        (0..config.slot_count()).find(|&slot_id| domains.is_wiped_out(slot_id))
    {
        return Err(ArcConsistencyFailure { wiped_out_slot_id });
    }

    Ok(success)
}

/// Establish arc consistency across the whole grid, or across the given arcs. The eliminations are
/// permanent.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let result = establish_arc_consistency(config, word_list, domains, arcs, None);

    match &result {
        Ok(success) => debug!(
            "arc consistency established after {} revisions ({} eliminations)",
            success.revisions, success.eliminations
        ),
        Err(failure) => debug!(
            "arc consistency failed: slot {} has no options left",
            failure.wiped_out_slot_id
        ),
    }

    result
}
