//! Live domain state for each slot during a fill. Domains start out as the entire word list and
//! only ever shrink, except that eliminations caused by a choice during search are rolled back
//! when that choice is retracted.

use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// The domain of a single slot.
#[derive(Clone)]
pub struct SlotDomain {
    id: SlotId,

    /// Record of which words have been eliminated from this slot, stored as a Vec indexed by
    /// `WordId`:
    /// * `Some(Some(id))` means "this word has been eliminated by the choice in slot `id`"
    /// * `Some(None)` means "this word has been eliminated regardless of any choices"
    /// * `None` means "this word has not been eliminated"
    eliminations: Vec<Option<Option<SlotId>>>,

    /// How many words are still available for this slot, ignoring `fixed_word_id`.
    remaining_option_count: usize,

    /// The word tentatively chosen for this slot during search, if there is one. While it's set,
    /// the domain behaves as if it contained only this word; `eliminations` and
    /// `remaining_option_count` are kept in the state they were in before the choice was made.
    fixed_word_id: Option<WordId>,
}

impl Debug for SlotDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDomain")
            .field("id", &self.id)
            .field("remaining_option_count", &self.remaining_option_count)
            .field("fixed_word_id", &self.fixed_word_id)
            .finish()
    }
}

/// The domains of every slot in a grid, indexed by `SlotId`.
#[derive(Debug, Clone)]
pub struct Domains {
    slots: Vec<SlotDomain>,
}

impl Domains {
    /// Give every slot the full word list as its domain.
    #[must_use]
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        Domains {
            slots: config
                .slot_configs
                .iter()
                .map(|slot_config| SlotDomain {
                    id: slot_config.id,
                    eliminations: vec![None; word_list.len()],
                    remaining_option_count: word_list.len(),
                    fixed_word_id: None,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// How many words does this slot's domain currently hold?
    #[must_use]
    pub fn option_count(&self, slot_id: SlotId) -> usize {
        let slot = &self.slots[slot_id];
        if slot.fixed_word_id.is_some() {
            1
        } else {
            slot.remaining_option_count
        }
    }

    /// Has this slot's domain been emptied?
    #[must_use]
    pub fn is_wiped_out(&self, slot_id: SlotId) -> bool {
        self.option_count(slot_id) == 0
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        let slot = &self.slots[slot_id];
        match slot.fixed_word_id {
            Some(fixed_word_id) => fixed_word_id == word_id,
            None => slot.eliminations[word_id].is_none(),
        }
    }

    /// Iterate over the words in this slot's domain, in word list order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        let slot = &self.slots[slot_id];
        let fixed_word_id = slot.fixed_word_id;

        slot.eliminations
            .iter()
            .enumerate()
            .filter(move |&(word_id, elimination)| match fixed_word_id {
                Some(fixed_word_id) => fixed_word_id == word_id,
                None => elimination.is_none(),
            })
            .map(|(word_id, _)| word_id)
    }

    /// Collect this slot's domain, for callers that need to mutate domains while walking it.
    #[must_use]
    pub fn words(&self, slot_id: SlotId) -> Vec<WordId> {
        self.iter(slot_id).collect()
    }

    /// A copy of every slot's current domain.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Vec<WordId>> {
        (0..self.slots.len())
            .map(|slot_id| self.words(slot_id))
            .collect()
    }

    /// Record that a word is unavailable for a slot, along with the slot whose choice is
    /// responsible (if any) so that we can roll it back if we backtrack that choice.
    pub fn eliminate(&mut self, slot_id: SlotId, word_id: WordId, blamed_slot_id: Option<SlotId>) {
        let slot = &mut self.slots[slot_id];

        if CHECK_INVARIANTS && slot.fixed_word_id.is_some() {
            panic!("Editing eliminations for a fixed slot?");
        }
        if CHECK_INVARIANTS && slot.eliminations[word_id].is_some() {
            panic!("Eliminating word {word_id} from slot {slot_id} twice?");
        }

        slot.eliminations[word_id] = Some(blamed_slot_id);
        slot.remaining_option_count -= 1;
    }

    /// Roll back every elimination that was blamed on the choice in the given slot.
    pub fn clear_eliminations(&mut self, blamed_slot_id: SlotId) {
        for slot in &mut self.slots {
            for elimination in &mut slot.eliminations {
                if *elimination == Some(Some(blamed_slot_id)) {
                    *elimination = None;
                    slot.remaining_option_count += 1;
                }
            }
        }
    }

    /// Record a choice, shadowing the slot's existing eliminations.
    pub fn choose_word(&mut self, slot_id: SlotId, word_id: WordId) {
        if CHECK_INVARIANTS && self.slots[slot_id].fixed_word_id.is_some() {
            panic!("Choosing a word for slot {slot_id}, which already has one?");
        }
        self.slots[slot_id].fixed_word_id = Some(word_id);
    }

    /// Clear a choice. Since we only ever backtrack linearly, the previously-stored eliminations
    /// should still be correct.
    pub fn clear_choice(&mut self, slot_id: SlotId) {
        self.slots[slot_id].fixed_word_id = None;
    }

    #[must_use]
    pub fn is_fixed(&self, slot_id: SlotId) -> bool {
        self.slots[slot_id].fixed_word_id.is_some()
    }
}
