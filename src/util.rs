use smallvec::{smallvec, SmallVec};

use crate::types::{GlyphId, WordId};
use crate::word_list::WordList;
use crate::MAX_GLYPH_COUNT;

/// Number of occurrences of each glyph at one position across a set of words, indexed by
/// `GlyphId`.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// Count the glyphs appearing at `cell_idx` in each of the given words. Words too short to have a
/// cell at that index don't contribute anything.
pub fn build_glyph_counts_for_cell(
    word_list: &WordList,
    cell_idx: usize,
    options: impl IntoIterator<Item = WordId>,
) -> GlyphCounts {
    let mut result: GlyphCounts = smallvec![0; word_list.glyphs.len()];

    for word_id in options {
        if let Some(&glyph) = word_list.words[word_id].glyphs.get(cell_idx) {
            result[glyph] += 1;
        }
    }

    result
}

/// Does the word have a glyph at `cell_idx` that appears at least once in `counts`?
#[must_use]
pub fn is_supported(
    word_list: &WordList,
    word_id: WordId,
    cell_idx: usize,
    counts: &[u32],
) -> bool {
    word_list.words[word_id]
        .glyphs
        .get(cell_idx)
        .map_or(false, |&glyph: &GlyphId| counts[glyph] > 0)
}
