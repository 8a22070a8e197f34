use std::path::Path;

use serde::Serialize;

use crate::config::Dialect;
use crate::error::{Result, ReviewError};
use crate::services::encoding;

/// Emitted after every completed chunk of an ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractProgress {
    pub rows_loaded: usize,
    pub chunk: usize,
}

/// Lazy sequence of one column's cells, one item per data row.
pub struct RowStream<'a> {
    column: usize,
    inner: Inner<'a>,
}

enum Inner<'a> {
    Naive(std::str::Lines<'a>),
    Quoted(csv::StringRecordsIntoIter<&'a [u8]>),
}

impl Iterator for RowStream<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Naive(lines) => loop {
                let line = lines.next()?;
                if line.trim().is_empty() {
                    continue;
                }
                let cell = line
                    .split(',')
                    .nth(self.column)
                    .map(str::trim)
                    .unwrap_or("");
                return Some(Ok(cell.to_string()));
            },
            Inner::Quoted(records) => loop {
                let record = match records.next()? {
                    Ok(r) => r,
                    Err(e) => return Some(Err(ReviewError::Csv(e))),
                };
                // blank or whitespace-only line; `,` is still a record
                if record.len() == 1 && record.get(0) == Some("") {
                    continue;
                }
                let cell = record.get(self.column).unwrap_or("");
                return Some(Ok(cell.to_string()));
            },
        }
    }
}

/// Locate `column` in the header row and return a stream over its cells.
///
/// The header is checked eagerly, so a missing column fails before any row
/// is produced.
pub fn extract_rows<'a>(text: &'a str, column: &str, dialect: Dialect) -> Result<RowStream<'a>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let wanted = column.trim().to_lowercase();

    match dialect {
        Dialect::Naive => {
            let mut lines = text.lines();
            let header = lines.find(|l| !l.trim().is_empty()).unwrap_or("");
            let index = header
                .split(',')
                .position(|h| h.trim().to_lowercase() == wanted)
                .ok_or_else(|| schema_error(column))?;

            Ok(RowStream {
                column: index,
                inner: Inner::Naive(lines),
            })
        }
        Dialect::Rfc4180 => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(text.as_bytes());

            let index = reader
                .headers()?
                .iter()
                .position(|h| h.to_lowercase() == wanted)
                .ok_or_else(|| schema_error(column))?;

            Ok(RowStream {
                column: index,
                inner: Inner::Quoted(reader.into_records()),
            })
        }
    }
}

/// Drain `rows` into one ordered buffer, reporting after each chunk.
pub fn collect_chunked<I, F>(rows: I, chunk_size: usize, mut on_chunk: F) -> Result<Vec<String>>
where
    I: Iterator<Item = Result<String>>,
    F: FnMut(ExtractProgress),
{
    let chunk_size = chunk_size.max(1);
    let mut out = Vec::new();
    let mut chunk = 0usize;

    for row in rows {
        out.push(row?);
        if out.len() % chunk_size == 0 {
            chunk += 1;
            on_chunk(ExtractProgress {
                rows_loaded: out.len(),
                chunk,
            });
        }
    }

    if out.len() % chunk_size != 0 {
        on_chunk(ExtractProgress {
            rows_loaded: out.len(),
            chunk: chunk + 1,
        });
    }

    Ok(out)
}

/// Read, decode and extract a whole file. Returns the rows and the encoding used.
pub fn load_file<F>(
    path: &Path,
    column: &str,
    dialect: Dialect,
    chunk_size: usize,
    on_chunk: F,
) -> Result<(Vec<String>, String)>
where
    F: FnMut(ExtractProgress),
{
    let bytes = std::fs::read(path)?;
    let (text, encoding_name) = encoding::decode_bytes(&bytes);

    let stream = extract_rows(&text, column, dialect)?;
    let rows = collect_chunked(stream, chunk_size, on_chunk)?;

    tracing::info!(
        "loaded {} rows from {} ({encoding_name})",
        rows.len(),
        path.display()
    );

    Ok((rows, encoding_name))
}

fn schema_error(column: &str) -> ReviewError {
    ReviewError::Schema {
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(text: &str) -> Result<Vec<String>> {
        extract_rows(text, "text", Dialect::Naive)?.collect()
    }

    #[test]
    fn picks_text_column_case_insensitively() {
        let rows = naive("id, TEXT ,lang\n1, hello ,en\n2,world,en\n").unwrap();
        assert_eq!(rows, vec!["hello", "world"]);
    }

    #[test]
    fn missing_cell_becomes_empty_string() {
        let rows = naive("id,lang,text\n1,en\n2,en,world").unwrap();
        assert_eq!(rows, vec!["", "world"]);
    }

    #[test]
    fn skips_blank_lines_and_crlf() {
        let rows = naive("\u{feff}text\r\nمرحبا\r\n\r\n   \r\nعالم\r\n").unwrap();
        assert_eq!(rows, vec!["مرحبا", "عالم"]);
    }

    #[test]
    fn missing_column_fails_before_any_row() {
        let result = extract_rows("id,body\n1,hello\n", "text", Dialect::Naive);
        match result {
            Err(ReviewError::Schema { column }) => assert_eq!(column, "text"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected schema error"),
        }
    }

    #[test]
    fn empty_input_is_a_schema_error() {
        assert!(matches!(naive(""), Err(ReviewError::Schema { .. })));
        assert!(matches!(
            extract_rows("", "text", Dialect::Rfc4180).map(|_| ()),
            Err(ReviewError::Schema { .. })
        ));
    }

    #[test]
    fn naive_dialect_splits_inside_quotes() {
        let rows = naive("text,id\n\"a, b\",1\n").unwrap();
        assert_eq!(rows, vec!["\"a"]);
    }

    #[test]
    fn rfc4180_dialect_honours_quotes() {
        let rows: Vec<String> = extract_rows("Text,id\n\"a, b\",1\n\n plain ,2\n", "text", Dialect::Rfc4180)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec!["a, b", "plain"]);
    }

    #[test]
    fn dialects_agree_on_rows_with_empty_cells() {
        let text = "id,text\n1,hello\n,\n   \n3,bye\n";
        let naive_rows = naive(text).unwrap();
        let quoted_rows: Vec<String> = extract_rows(text, "text", Dialect::Rfc4180)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(naive_rows, vec!["hello", "", "bye"]);
        assert_eq!(quoted_rows, naive_rows);
    }

    #[test]
    fn chunked_collection_matches_single_pass() {
        let mut text = String::from("text\n");
        for i in 0..23 {
            text.push_str(&format!("row {i}\n"));
        }

        let single: Vec<String> = naive(&text).unwrap();

        let mut progress = Vec::new();
        let chunked = collect_chunked(
            extract_rows(&text, "text", Dialect::Naive).unwrap(),
            5,
            |p| progress.push(p),
        )
        .unwrap();

        assert_eq!(single, chunked);
        assert_eq!(progress.len(), 5);
        assert_eq!(progress[0], ExtractProgress { rows_loaded: 5, chunk: 1 });
        assert_eq!(progress[4], ExtractProgress { rows_loaded: 23, chunk: 5 });
    }

    #[test]
    fn exact_multiple_does_not_emit_trailing_chunk() {
        let rows = (0..4).map(|i| Ok(i.to_string()));
        let mut calls = 0;
        let out = collect_chunked(rows, 2, |_| calls += 1).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(calls, 2);
    }

    #[test]
    fn load_file_decodes_and_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arabic.csv");
        std::fs::write(&path, "\u{feff}text\nمرحبا\nعالم\n").unwrap();

        let (rows, encoding) = load_file(&path, "text", Dialect::Naive, 500, |_| {}).unwrap();
        assert_eq!(rows, vec!["مرحبا", "عالم"]);
        assert_eq!(encoding, "utf-8-sig");
    }
}
