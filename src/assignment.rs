//! Partial and complete assignments of words to slots, and the checks a fill has to pass.

use std::collections::{BTreeMap, HashSet};

use crate::grid_config::{GridConfig, SlotSpec};
use crate::types::{SlotId, WordId};
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// A mapping from slots to the words assigned to them. During search this grows by one entry on
/// each descent and shrinks by one on each backtrack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<SlotId, WordId>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Assignment {
        Assignment::default()
    }

    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) {
        let previous = self.words.insert(slot_id, word_id);
        if CHECK_INVARIANTS && previous.is_some() {
            panic!("Slot {slot_id} was already assigned?");
        }
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        self.words.remove(&slot_id)
    }

    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words.get(&slot_id).copied()
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.words.contains_key(&slot_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over `(slot, word)` pairs in slot id order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.words
            .iter()
            .map(|(&slot_id, &word_id)| (slot_id, word_id))
    }

    /// Pair each assigned slot's spec with its word as it was spelled in the caller's word list,
    /// which is the form a renderer or other consumer needs.
    #[must_use]
    pub fn entries<'a>(
        &self,
        config: &GridConfig,
        word_list: &'a WordList,
    ) -> Vec<(SlotSpec, &'a str)> {
        self.iter()
            .map(|(slot_id, word_id)| {
                (
                    config.slot_configs[slot_id].slot_spec(),
                    word_list.word(word_id).canonical_string.as_str(),
                )
            })
            .collect()
    }
}

/// Is the assignment consistent? That is: no word is used twice, every word has its slot's
/// length, and every pair of assigned crossing slots agree on their shared cell. Assignments with
/// fewer than two entries can only fail the length check.
#[must_use]
pub fn is_consistent(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> bool {
    let mut seen_words: HashSet<WordId> = HashSet::with_capacity(assignment.len());
    if !assignment.iter().all(|(_, word_id)| seen_words.insert(word_id)) {
        return false;
    }

    if assignment.iter().any(|(slot_id, word_id)| {
        word_list.word(word_id).length() != config.slot_configs[slot_id].length
    }) {
        return false;
    }

    assignment.iter().all(|(slot_id, word_id)| {
        let word = word_list.word(word_id);

        config.slot_configs[slot_id]
            .crossings
            .iter()
            .enumerate()
            .all(|(cell_idx, crossing)| {
                let Some(crossing) = crossing else {
                    return true;
                };
                let Some(other_word_id) = assignment.get(crossing.other_slot_id) else {
                    return true;
                };
                word.glyphs[cell_idx]
                    == word_list.word(other_word_id).glyphs[crossing.other_slot_cell]
            })
    })
}

/// Is the assignment complete? That is: does every slot in the grid have exactly one word?
#[must_use]
pub fn is_complete(config: &GridConfig, assignment: &Assignment) -> bool {
    assignment.len() == config.slot_count()
        && (0..config.slot_count()).all(|slot_id| assignment.contains(slot_id))
}
