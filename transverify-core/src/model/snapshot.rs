use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};
use crate::model::pair::TranslationPair;

/// Everything needed to resume a review: the pairs and where the reviewer was.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub pairs: Vec<TranslationPair>,

    #[serde(default, alias = "currentIndex")]
    pub cursor: usize,
}

impl SessionSnapshot {
    pub fn new(pairs: Vec<TranslationPair>, cursor: usize) -> Self {
        Self { pairs, cursor }
    }

    /// Ids must be exactly `0..n` in order.
    pub fn validate(&self) -> Result<()> {
        for (i, pair) in self.pairs.iter().enumerate() {
            if pair.id != i {
                return Err(ReviewError::PersistenceRead(format!(
                    "pair at position {i} has id {}",
                    pair.id
                )));
            }
        }
        Ok(())
    }

    /// Pull an out-of-range cursor back onto the last pair.
    pub fn clamp_cursor(&mut self) -> bool {
        let last = self.pairs.len().saturating_sub(1);
        if self.cursor > last {
            self.cursor = last;
            return true;
        }
        false
    }
}
