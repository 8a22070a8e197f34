use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::pair::TranslationPair;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaIssue {
    pub id: usize,
    pub code: String,
    pub message: String,
}

fn arabic_letter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Arabic}").expect("arabic script pattern"))
}

pub fn run(pairs: &[TranslationPair]) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    for p in pairs {
        // only explicit reviewer decisions are linted
        if !p.verified {
            continue;
        }

        let corrected = p.corrected.trim();

        if corrected.is_empty() {
            issues.push(issue(p, "VERIFIED_EMPTY", "Verified with an empty correction"));
            continue;
        }

        if corrected == p.candidate.trim() {
            issues.push(issue(
                p,
                "UNCHANGED",
                "Correction is identical to the machine translation",
            ));
        }

        if !arabic_letter().is_match(corrected) {
            issues.push(issue(
                p,
                "NO_ARABIC_SCRIPT",
                "Correction contains no Arabic letters",
            ));
        }

        // The default export format cannot carry these characters.
        if p.corrected.contains(&[',', '"', '\n', '\r'][..]) {
            issues.push(issue(
                p,
                "UNSAFE_DELIMITER",
                "Correction contains a comma, double quote or line break",
            ));
        }
    }

    issues
}

fn issue(p: &TranslationPair, code: &str, message: &str) -> QaIssue {
    QaIssue {
        id: p.id,
        code: code.to_string(),
        message: message.to_string(),
    }
}
