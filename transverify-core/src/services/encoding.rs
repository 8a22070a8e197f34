use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::error::Result;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Decode raw file bytes into text, returning the name of the encoding used.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        let (text, _) = UTF_8.decode_without_bom_handling(rest);
        return (text.into_owned(), "utf-8-sig".into());
    }

    let encoding = guess(bytes);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            "input is not clean {}; undecodable bytes were replaced",
            encoding.name()
        );
    }

    (text.into_owned(), encoding.name().to_lowercase())
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path)?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    if bytes.starts_with(&UTF8_BOM) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    let encoding = guess(bytes);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // Arabic legacy code pages are easy to confuse
    if best == "windows-1256" {
        candidates.push(EncodingCandidate {
            name: "iso-8859-6".into(),
            confidence: (confidence - 0.10).max(0.0),
        });
    } else if best == "iso-8859-6" {
        candidates.push(EncodingCandidate {
            name: "windows-1256".into(),
            confidence: (confidence - 0.05).max(0.0),
        });
    }

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn guess(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}
