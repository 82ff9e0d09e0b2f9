//! This module implements the static description of a puzzle: which cells are fillable, the slots
//! derived from them, and the crossings between slots. Nothing here changes once a fill starts.

use fancy_regex::Regex;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserializer, Serializer};

use crate::assignment::Assignment;
use crate::types::{GridCoord, SlotId};
use crate::word_list::WordList;

/// An ordered pair of crossing slots, read as "the domain of the first slot must be supported by
/// the domain of the second".
pub type Arc = (SlotId, SlotId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("rows in grid must all be the same length (row {row} has {found} cells, expected {expected})")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid doesn't contain any slots")]
    NoSlots,

    #[error("more than two slots share the cell at {0:?}")]
    OverlappingSlots(GridCoord),

    #[error("invalid filter pattern for slot {slot_id}: {message}")]
    InvalidFilterPattern { slot_id: SlotId, message: String },

    #[error("invalid slot key: {0:?}")]
    InvalidSlotKey(String),

    #[error("grid has no slot with id {0}")]
    UnknownSlot(SlotId),
}

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// The fillable/blocked layout of a rectangular grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStructure {
    pub width: usize,
    pub height: usize,

    /// Flat array of cells in order of row and then column; `true` means fillable.
    cells: Vec<bool>,
}

impl GridStructure {
    /// Build a structure from rows of cells, where `true` means fillable.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<GridStructure, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::EmptyGrid);
        }

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(GridError::RaggedRows {
                row,
                expected: width,
                found,
            });
        }

        Ok(GridStructure {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Parse a template string with `#` representing blocks and any other character (usually `.`
    /// or `_`) representing a fillable cell. Blank lines and surrounding whitespace are ignored.
    pub fn from_template(template: &str) -> Result<GridStructure, GridError> {
        GridStructure::new(
            template
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| line.chars().map(|c| c != '#').collect())
                .collect(),
        )
    }

    /// Is the given cell fillable? Cells outside the grid are not.
    #[must_use]
    pub fn is_fillable(&self, (row, col): GridCoord) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct identifying a specific slot in the grid. Ordering is by start cell, then direction,
/// then length, which is also the order slot ids are assigned in.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct SlotSpec {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl SlotSpec {
    /// Parse a string like "1,2,down,5" (row, column, direction, length) into a `SlotSpec`.
    pub fn from_key(key: &str) -> Result<SlotSpec, GridError> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(GridError::InvalidSlotKey(key.to_string()));
        }

        let row: Result<usize, _> = key_parts[0].parse();
        let col: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(row), Ok(col), Some(direction), Ok(length)) = (row, col, direction, length) {
            Ok(SlotSpec {
                start_cell: (row, col),
                direction,
                length,
            })
        } else {
            Err(GridError::InvalidSlotKey(key.to_string()))
        }
    }

    /// Represent this slot as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }

    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0, self.start_cell.1 + cell_idx),
                Direction::Down => (self.start_cell.0 + cell_idx, self.start_cell.1),
            })
            .collect()
    }
}

/// Serialize a `SlotSpec` into a string key.
#[cfg(feature = "serde")]
impl serde::Serialize for SlotSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `SlotSpec` from a string key.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SlotSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = <String as serde::Deserialize>::deserialize(deserializer)?;
        SlotSpec::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of the slot, the crossing slot sharing it, if any.
    pub crossings: Vec<Option<Crossing>>,

    /// An extra unary constraint: candidate words must match this pattern.
    pub filter_pattern: Option<Regex>,
}

impl SlotConfig {
    /// Generate a `SlotSpec` identifying this slot.
    #[must_use]
    pub fn slot_spec(&self) -> SlotSpec {
        SlotSpec {
            start_cell: self.start_cell,
            direction: self.direction,
            length: self.length,
        }
    }

    /// Generate a string key identifying this slot.
    #[must_use]
    pub fn slot_key(&self) -> String {
        self.slot_spec().to_key()
    }

    /// The number of slots crossing this one.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.crossings.iter().flatten().count()
    }
}

/// Generate the slots for a structure by scanning for runs of two or more fillable cells, first
/// across each row and then down each column. The result is sorted into slot id order.
#[must_use]
pub fn generate_slots_from_structure(structure: &GridStructure) -> Vec<SlotSpec> {
    fn push_runs(
        slot_specs: &mut Vec<SlotSpec>,
        direction: Direction,
        lines: impl Iterator<Item = Vec<(GridCoord, bool)>>,
    ) {
        for line in lines {
            let mut current_run: Vec<GridCoord> = vec![];

            for (coord, fillable) in line.into_iter().chain([((0, 0), false)]) {
                if fillable {
                    current_run.push(coord);
                    continue;
                }
                if current_run.len() > 1 {
                    slot_specs.push(SlotSpec {
                        start_cell: current_run[0],
                        direction,
                        length: current_run.len(),
                    });
                }
                current_run.clear();
            }
        }
    }

    let mut slot_specs: Vec<SlotSpec> = vec![];

    push_runs(
        &mut slot_specs,
        Direction::Across,
        (0..structure.height).map(|row| {
            (0..structure.width)
                .map(|col| ((row, col), structure.is_fillable((row, col))))
                .collect()
        }),
    );

    push_runs(
        &mut slot_specs,
        Direction::Down,
        (0..structure.width).map(|col| {
            (0..structure.height)
                .map(|row| ((row, col), structure.is_fillable((row, col))))
                .collect()
        }),
    );

    slot_specs.sort();
    slot_specs
}

/// Given `SlotSpec`s specifying the positions of the slots in a grid, generate `SlotConfig`s
/// containing derived information about crossings. Slot ids follow the order of `entries`.
pub fn generate_slot_configs(entries: &[SlotSpec]) -> Result<Vec<SlotConfig>, GridError> {
    // Build a map from cell location to entries involved, which we can then use to calculate
    // crossings. Each value is a list of (entry index, cell index within entry).
    let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();

    for (entry_idx, entry) in entries.iter().enumerate() {
        for (cell_idx, loc) in entry.cell_coords().into_iter().enumerate() {
            let cell_entries = entries_by_loc.entry(loc).or_default();
            cell_entries.push((entry_idx, cell_idx));
            if cell_entries.len() > 2 {
                return Err(GridError::OverlappingSlots(loc));
            }
        }
    }

    Ok(entries
        .iter()
        .enumerate()
        .map(|(entry_idx, entry)| SlotConfig {
            id: entry_idx,
            start_cell: entry.start_cell,
            direction: entry.direction,
            length: entry.length,
            crossings: entry
                .cell_coords()
                .iter()
                .map(|loc| {
                    entries_by_loc[loc]
                        .iter()
                        .find(|&&(e, _)| e != entry_idx)
                        .map(|&(other_slot_id, other_slot_cell)| Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                })
                .collect(),
            filter_pattern: None,
        })
        .collect())
}

/// The complete static model of a puzzle: its structure, its slots, and the overlap table between
/// them.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub structure: GridStructure,

    /// Config representing all of the slots in the grid and their crossings, indexed by `SlotId`.
    pub slot_configs: Vec<SlotConfig>,
}

impl GridConfig {
    /// Derive the slots and crossings for the given structure.
    pub fn from_structure(structure: GridStructure) -> Result<GridConfig, GridError> {
        let slot_specs = generate_slots_from_structure(&structure);
        if slot_specs.is_empty() {
            return Err(GridError::NoSlots);
        }

        let slot_configs = generate_slot_configs(&slot_specs)?;

        Ok(GridConfig {
            structure,
            slot_configs,
        })
    }

    /// Shorthand for parsing a template with `GridStructure::from_template` and deriving its slots.
    pub fn from_template(template: &str) -> Result<GridConfig, GridError> {
        GridConfig::from_structure(GridStructure::from_template(template)?)
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// Find the id of the slot matching the given spec, if there is one.
    #[must_use]
    pub fn slot_id_for_spec(&self, spec: &SlotSpec) -> Option<SlotId> {
        self.slot_configs
            .iter()
            .position(|slot_config| slot_config.slot_spec() == *spec)
    }

    /// Restrict the words allowed in a slot to those matching the given regex.
    pub fn set_filter_pattern(&mut self, slot_id: SlotId, pattern: &str) -> Result<(), GridError> {
        let slot_config = self
            .slot_configs
            .get_mut(slot_id)
            .ok_or(GridError::UnknownSlot(slot_id))?;
        let regex = Regex::new(pattern).map_err(|err| GridError::InvalidFilterPattern {
            slot_id,
            message: err.to_string(),
        })?;
        slot_config.filter_pattern = Some(regex);
        Ok(())
    }

    /// All slots sharing a cell with the given slot.
    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> BTreeSet<SlotId> {
        self.slot_configs[slot_id]
            .crossings
            .iter()
            .flatten()
            .map(|crossing| crossing.other_slot_id)
            .collect()
    }

    /// If the two slots share a cell, return `(i, j)` such that character `i` of the first slot's
    /// word must equal character `j` of the second slot's word.
    #[must_use]
    pub fn overlaps(&self, slot_a: SlotId, slot_b: SlotId) -> Option<(usize, usize)> {
        if slot_a == slot_b {
            return None;
        }
        self.slot_configs[slot_a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == slot_b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    /// Every ordered pair of crossing slots, in slot id order.
    #[must_use]
    pub fn arcs(&self) -> Vec<Arc> {
        self.slot_configs
            .iter()
            .flat_map(|slot_config| {
                self.neighbors(slot_config.id)
                    .into_iter()
                    .map(move |other_slot_id| (slot_config.id, other_slot_id))
            })
            .collect()
    }

    /// Lay the assignment's words out on the grid, producing a `height` x `width` matrix with
    /// `None` for blocks and unassigned cells.
    #[must_use]
    pub fn letter_grid(
        &self,
        word_list: &WordList,
        assignment: &Assignment,
    ) -> Vec<Vec<Option<char>>> {
        let mut letters = vec![vec![None; self.structure.width]; self.structure.height];

        for (slot_id, word_id) in assignment.iter() {
            let slot_spec = self.slot_configs[slot_id].slot_spec();
            let word = word_list.word(word_id);

            for ((row, col), &glyph) in slot_spec.cell_coords().into_iter().zip(&word.glyphs) {
                letters[row][col] = Some(word_list.glyphs[glyph]);
            }
        }

        letters
    }
}

#[cfg(test)]
mod tests {
    use super::{Crossing, Direction, GridConfig, GridError, GridStructure, SlotSpec};

    const SMALL_TEMPLATE: &str = "
        ...
        #.#
        ...
    ";

    #[test]
    fn test_structure_rejects_bad_input() {
        assert_eq!(GridStructure::new(vec![]), Err(GridError::EmptyGrid));
        assert_eq!(
            GridStructure::from_template("...\n..\n"),
            Err(GridError::RaggedRows {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            GridConfig::from_template(".#.\n#.#\n").unwrap_err(),
            GridError::NoSlots
        );
    }

    #[test]
    fn test_slot_generation() {
        let config = GridConfig::from_template(SMALL_TEMPLATE).unwrap();

        let specs: Vec<SlotSpec> = config
            .slot_configs
            .iter()
            .map(|slot_config| slot_config.slot_spec())
            .collect();

        assert_eq!(
            specs,
            vec![
                SlotSpec {
                    start_cell: (0, 0),
                    direction: Direction::Across,
                    length: 3
                },
                SlotSpec {
                    start_cell: (0, 1),
                    direction: Direction::Down,
                    length: 3
                },
                SlotSpec {
                    start_cell: (2, 0),
                    direction: Direction::Across,
                    length: 3
                },
            ]
        );
        assert_eq!(
            config.slot_configs[1].crossings,
            vec![
                Some(Crossing {
                    other_slot_id: 0,
                    other_slot_cell: 1
                }),
                None,
                Some(Crossing {
                    other_slot_id: 2,
                    other_slot_cell: 1
                }),
            ]
        );
    }

    #[test]
    fn test_runs_stop_at_blocks_and_edges() {
        let config = GridConfig::from_template(
            "
            ..#..
            .....
            ",
        )
        .unwrap();

        let keys: Vec<String> = config
            .slot_configs
            .iter()
            .map(|slot_config| slot_config.slot_key())
            .collect();

        assert_eq!(
            keys,
            vec![
                "0,0,across,2",
                "0,0,down,2",
                "0,1,down,2",
                "0,3,across,2",
                "0,3,down,2",
                "0,4,down,2",
                "1,0,across,5",
            ]
        );
    }

    #[test]
    fn test_neighbors_and_overlaps() {
        let config = GridConfig::from_template(SMALL_TEMPLATE).unwrap();

        assert_eq!(config.neighbors(1).into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(config.neighbors(0).into_iter().collect::<Vec<_>>(), vec![1]);

        assert_eq!(config.overlaps(0, 1), Some((1, 0)));
        assert_eq!(config.overlaps(1, 0), Some((0, 1)));
        assert_eq!(config.overlaps(2, 1), Some((1, 2)));
        assert_eq!(config.overlaps(0, 2), None);
        assert_eq!(config.overlaps(0, 0), None);

        assert_eq!(config.arcs(), vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
        assert_eq!(config.slot_configs[1].degree(), 2);
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let config = GridConfig::from_template(
            "
            ....#
            ....#
            .....
            #....
            #....
            ",
        )
        .unwrap();

        for a in 0..config.slot_count() {
            for b in 0..config.slot_count() {
                assert_eq!(
                    config.overlaps(a, b),
                    config.overlaps(b, a).map(|(i, j)| (j, i)),
                );
            }
        }
    }

    #[test]
    fn test_slot_key_round_trip_and_errors() {
        let spec = SlotSpec::from_key("3,4,down,12").unwrap();
        assert_eq!(spec.start_cell, (3, 4));
        assert_eq!(spec.direction, Direction::Down);
        assert_eq!(spec.to_key(), "3,4,down,12");

        assert_eq!(
            SlotSpec::from_key("3,4,sideways,12"),
            Err(GridError::InvalidSlotKey("3,4,sideways,12".into()))
        );
        assert!(SlotSpec::from_key("3,4,down").is_err());
    }

    #[test]
    fn test_slot_id_for_spec() {
        let config = GridConfig::from_template(SMALL_TEMPLATE).unwrap();
        let spec = SlotSpec::from_key("2,0,across,3").unwrap();

        assert_eq!(config.slot_id_for_spec(&spec), Some(2));
        assert_eq!(
            config.slot_id_for_spec(&SlotSpec::from_key("2,0,across,2").unwrap()),
            None
        );
    }

    #[test]
    fn test_invalid_filter_pattern() {
        let mut config = GridConfig::from_template(SMALL_TEMPLATE).unwrap();

        assert!(config.set_filter_pattern(0, "^c").is_ok());
        assert!(matches!(
            config.set_filter_pattern(1, "(unclosed"),
            Err(GridError::InvalidFilterPattern { slot_id: 1, .. })
        ));
        assert_eq!(
            config.set_filter_pattern(5, "^a"),
            Err(GridError::UnknownSlot(5))
        );
        assert!(config.slot_configs[1].filter_pattern.is_none());
    }
}
