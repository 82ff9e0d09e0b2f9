#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! A crossword-filling engine that treats the grid as a constraint satisfaction problem: slots are
//! variables, candidate words are their domains, and crossings are binary constraints. Domains are
//! pruned with node consistency and AC-3 before a backtracking search fills the grid.

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod types;
pub mod util;
pub mod word_list;

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use assignment::Assignment;
pub use backtracking_search::{find_fill, CrosswordSolver, FillOptions, FillSuccess, Statistics};
pub use grid_config::{Direction, GridConfig, GridError, GridStructure, SlotSpec};
pub use word_list::{WordList, WordListError};
