//! Cursor movement over the pair sequence.
//!
//! Skip and save both jump to the next unverified pair after the cursor. When
//! the whole tail is verified the cursor stays at the last visited position
//! instead of wrapping around to an earlier unverified pair.

use crate::error::{Result, ReviewError};
use crate::model::pair::TranslationPair;

/// First unverified index in `start..n`, else `max(0, start - 1)`.
pub fn find_next_unverified(pairs: &[TranslationPair], start: usize) -> usize {
    pairs
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, p)| !p.verified)
        .map(|(i, _)| i)
        .unwrap_or_else(|| start.saturating_sub(1))
}

pub fn after_save(pairs: &[TranslationPair], cursor: usize) -> usize {
    find_next_unverified(pairs, cursor + 1)
}

pub fn skip(pairs: &[TranslationPair], cursor: usize) -> usize {
    find_next_unverified(pairs, cursor + 1)
}

pub fn previous(cursor: usize) -> usize {
    cursor.saturating_sub(1)
}

pub fn can_go_previous(cursor: usize) -> bool {
    cursor > 0
}

pub fn select_index(pairs: &[TranslationPair], index: usize) -> Result<usize> {
    if index < pairs.len() {
        Ok(index)
    } else {
        Err(ReviewError::IndexOutOfRange {
            index,
            len: pairs.len(),
        })
    }
}
