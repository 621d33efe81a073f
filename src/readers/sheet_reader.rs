use crate::error::{ProcessingError, Result};
use crate::models::{normalize_column_name, RawRow, RowSet};
use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::{debug, warn};

pub struct SheetReader {
    delimiter: u8,
}

impl SheetReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Parse delimited text into rows keyed by normalized header names
    pub fn ingest(&self, source_text: &str) -> Result<RowSet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source_text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect();

        let mut rows = Vec::new();
        for record_result in reader.records() {
            let record = record_result?;

            // Short rows are padded with empty cells, extra cells are ignored
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), record.get(i).unwrap_or_default().to_string()))
                .collect();

            rows.push(RawRow::new(fields));
        }

        debug!(columns = headers.len(), rows = rows.len(), "Sheet ingested");

        Ok(RowSet::new(headers, rows))
    }

    /// Decode a fetched body. A BOM wins; otherwise UTF-8, falling back to
    /// Windows-1252 for spreadsheets exported with a legacy code page.
    pub fn decode_sheet_bytes(bytes: &[u8]) -> String {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            return text.into_owned();
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                warn!("Sheet body is not valid UTF-8, decoding as Windows-1252");
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
                text.into_owned()
            }
        }
    }
}

impl Default for SheetReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail with `MissingColumns` unless every required column is present.
///
/// `missing` lists the absent names in the order they were requested,
/// `found` is the header list exactly as ingested.
pub fn require_columns<S: AsRef<str>>(rows: RowSet, required: &[S]) -> Result<RowSet> {
    check_columns(&rows, required)?;
    Ok(rows)
}

/// Borrowing form of [`require_columns`] for row sets shared through a cache.
pub fn check_columns<S: AsRef<str>>(rows: &RowSet, required: &[S]) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();

    for name in required {
        let name = normalize_column_name(name.as_ref());
        if !rows.has_column(&name) && !missing.contains(&name) {
            missing.push(name);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProcessingError::MissingColumns {
            missing,
            found: rows.headers.clone(),
        })
    }
}
