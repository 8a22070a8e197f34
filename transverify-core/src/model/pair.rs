use serde::{Deserialize, Serialize};

/// One aligned English/Arabic record plus its review state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationPair {
    pub id: usize,

    #[serde(default, alias = "en")]
    pub source: String,

    #[serde(default, alias = "ar")]
    pub candidate: String,

    #[serde(default, alias = "arVerified")]
    pub corrected: String,

    #[serde(default)]
    pub verified: bool,
}

impl TranslationPair {
    pub fn new(id: usize, source: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            candidate: candidate.into(),
            corrected: String::new(),
            verified: false,
        }
    }

    /// Text the editor should start from: the last correction, else the candidate.
    pub fn editable_text(&self) -> &str {
        if self.corrected.is_empty() {
            &self.candidate
        } else {
            &self.corrected
        }
    }
}
