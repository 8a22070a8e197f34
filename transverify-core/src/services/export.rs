use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Dialect;
use crate::error::{Result, ReviewError};
use crate::model::pair::TranslationPair;
use crate::services::persistence::write_atomic;

pub const HEADERS: [&str; 3] = ["text", "text_verified", "verified"];
pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub text: String,
    pub text_verified: Option<String>,
    pub verified: bool,
}

/// What the sink produced for a download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub file_name: String,
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: usize,
}

/// Runtime file-save mechanism.
pub trait DownloadSink {
    fn download(&mut self, content: &str, file_name: &str) -> Result<Download>;
}

/// The reviewed corpus: one row per pair carrying the correction and its flag.
pub fn rows_from_pairs(pairs: &[TranslationPair]) -> Vec<ExportRow> {
    pairs
        .iter()
        .map(|p| ExportRow {
            text: p.corrected.clone(),
            text_verified: None,
            verified: p.verified,
        })
        .collect()
}

pub fn generate_csv(rows: &[ExportRow], dialect: Dialect) -> Result<String> {
    match dialect {
        Dialect::Naive => Ok(generate_naive(rows)),
        Dialect::Rfc4180 => generate_quoted(rows),
    }
}

fn generate_naive(rows: &[ExportRow]) -> String {
    let mut out: Vec<String> = Vec::with_capacity(rows.len() + 1);
    out.push(HEADERS.join(","));

    // No escaping: embedded quotes or commas break the row.
    for row in rows {
        out.push(format!(
            "\"{}\",\"{}\",\"{}\"",
            row.text,
            row.text_verified.as_deref().unwrap_or(""),
            flag(row.verified)
        ));
    }

    out.join("\n")
}

fn generate_quoted(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record([
            row.text.as_str(),
            row.text_verified.as_deref().unwrap_or(""),
            flag(row.verified),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| ReviewError::Io(e.into_error()))?;
    let body = String::from_utf8(body)
        .map_err(|e| ReviewError::InvalidRequest(format!("export is not UTF-8: {e}")))?;

    let mut out = HEADERS.join(",");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body.trim_end_matches('\n'));
    }
    Ok(out)
}

/// Read an export back. Fields missing from a row read as empty / `false`.
pub fn parse_export(content: &str, dialect: Dialect) -> Result<Vec<ExportRow>> {
    let records: Vec<Vec<String>> = match dialect {
        Dialect::Naive => content
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split(',').map(|v| unquote(v).to_string()).collect())
            .collect(),
        Dialect::Rfc4180 => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(content.as_bytes());
            let mut out = Vec::new();
            for record in reader.records() {
                out.push(record?.iter().map(str::to_string).collect());
            }
            out
        }
    };

    Ok(records
        .into_iter()
        .map(|fields| {
            let field = |i: usize| fields.get(i).cloned().unwrap_or_default();
            let text_verified = field(1);
            ExportRow {
                text: field(0),
                text_verified: (!text_verified.is_empty()).then_some(text_verified),
                verified: field(2) == "true",
            }
        })
        .collect())
}

fn flag(verified: bool) -> &'static str {
    if verified {
        "true"
    } else {
        "false"
    }
}

fn unquote(v: &str) -> &str {
    v.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(v)
}

/// Writes downloads into a fixed directory.
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for FileDownloadSink {
    fn download(&mut self, content: &str, file_name: &str) -> Result<Download> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReviewError::InvalidRequest(format!("bad file name {file_name:?}")))?
            .to_string();

        let path = self.dir.join(&file_name);
        write_atomic(&path, content.as_bytes())?;
        tracing::info!("exported {} bytes to {}", content.len(), path.display());

        Ok(Download {
            file_name,
            path,
            mime: CSV_MIME,
            bytes: content.len(),
        })
    }
}
