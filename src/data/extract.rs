//! Read the single tabular entry out of a source archive.
//!
//! Every cell stays text: sources format ids and dates inconsistently, so nothing is coerced here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::data::error::ExtractError;

pub const DEFAULT_ENTRY_EXTENSION: &str = ".csv";

/// Untyped table as found in the archive: header row plus rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Name of the archive member the table was read from.
    pub entry_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Open `archive_path` and parse the tabular entry whose name ends in `extension`.
pub fn extract(archive_path: &Path, extension: &str) -> Result<RawTable, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let entry_name = select_entry(&mut archive, extension)?;
    let mut bytes = Vec::new();
    archive.by_name(&entry_name)?.read_to_end(&mut bytes)?;

    tracing::debug!(
        archive = %archive_path.display(),
        entry = %entry_name,
        bytes = bytes.len(),
        "read tabular entry"
    );
    parse_table(&entry_name, &bytes)
}

/// Lexicographically first regular file whose name ends in `extension` (case-insensitive).
fn select_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    extension: &str,
) -> Result<String, ExtractError> {
    let wanted = extension.to_lowercase();
    let mut candidates = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().to_lowercase().ends_with(&wanted) {
            candidates.push(entry.name().to_string());
        }
    }
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::EntryNotFound {
            extension: extension.to_string(),
        })
}

/// Parse entry bytes as delimited text. Comma unless the header line is semicolon-heavy.
pub fn parse_table(entry_name: &str, bytes: &[u8]) -> Result<RawTable, ExtractError> {
    let text = decode_text(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let csv_err = |source| ExtractError::Csv {
        entry: entry_name.to_string(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ExtractError::Shape {
            entry: entry_name.to_string(),
            reason: "missing header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(ExtractError::Shape {
                entry: entry_name.to_string(),
                reason: format!(
                    "line {line} has {} fields, header has {}",
                    record.len(),
                    headers.len()
                ),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable {
        entry_name: entry_name.to_string(),
        headers,
        rows,
    })
}

/// UTF-8 (BOM stripped) when valid, Latin-1 otherwise.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
