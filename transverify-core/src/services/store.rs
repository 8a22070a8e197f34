use serde::Serialize;

use crate::error::{Result, ReviewError};
use crate::model::pair::TranslationPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub verified: usize,
    pub total: usize,
    pub percent: u32,
}

/// Ordered, length-stable pair collection. `save` is the only mutation.
#[derive(Debug, Clone, Default)]
pub struct VerificationStore {
    pairs: Vec<TranslationPair>,
}

impl VerificationStore {
    pub fn new(pairs: Vec<TranslationPair>) -> Self {
        Self { pairs }
    }

    pub fn save(&mut self, index: usize, text: &str) -> Result<()> {
        let len = self.pairs.len();
        let pair = self
            .pairs
            .get_mut(index)
            .ok_or(ReviewError::IndexOutOfRange { index, len })?;

        pair.corrected = text.to_string();
        pair.verified = true;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&TranslationPair> {
        self.pairs.get(index)
    }

    pub fn pairs(&self) -> &[TranslationPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn verified_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.verified).count()
    }

    pub fn progress(&self) -> Progress {
        let verified = self.verified_count();
        let total = self.pairs.len();
        let percent = if total == 0 {
            0
        } else {
            (verified as f64 / total as f64 * 100.0).round() as u32
        };

        Progress {
            verified,
            total,
            percent,
        }
    }
}
