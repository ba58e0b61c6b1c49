//! Download format for query results: `;`-separated, header row, UTF-8 with a byte-order mark
//! (spreadsheet software in pt-BR locales opens this without an import dialog).

use thiserror::Error;

use crate::query::profile::HistoryRow;
use crate::query::RosterRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const SEARCH_EXPORT_FILE_NAME: &str = "resultado_bid_consulta.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv: {0}")]
    Io(#[from] std::io::Error),
}

/// A fixed-column row that can be exported. Nulls are written as empty cells.
pub trait ExportRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<&str>;
}

impl ExportRow for RosterRow {
    fn headers() -> &'static [&'static str] {
        &RosterRow::COLUMNS
    }

    fn cells(&self) -> Vec<&str> {
        [
            &self.full_name,
            &self.nickname,
            &self.team,
            &self.age,
            &self.birth_date,
            &self.contract_id,
            &self.start_date,
            &self.record_date,
            &self.registration_id,
            &self.federation_id,
        ]
        .into_iter()
        .map(|cell| cell.as_deref().unwrap_or(""))
        .collect()
    }
}

impl ExportRow for HistoryRow {
    fn headers() -> &'static [&'static str] {
        &HistoryRow::COLUMNS
    }

    fn cells(&self) -> Vec<&str> {
        [
            &self.team,
            &self.contract_id,
            &self.start_date,
            &self.record_date,
            &self.registration_id,
            &self.federation_id,
            &self.age,
            &self.birth_date,
            &self.nickname,
        ]
        .into_iter()
        .map(|cell| cell.as_deref().unwrap_or(""))
        .collect()
    }
}

/// Serialize rows with a header line even when `rows` is empty.
pub fn to_semicolon_csv<R: ExportRow>(rows: &[R]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(UTF8_BOM.to_vec());
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))
}

/// `historico_<NAME>.csv` with spaces and path separators replaced by underscores.
pub fn history_file_name(full_name: &str) -> String {
    let stem: String = full_name
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("historico_{stem}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_bom_header_and_semicolons() {
        let rows = vec![RosterRow {
            full_name: Some("ANA SILVA".to_string()),
            team: Some("Lions; B".to_string()),
            ..RosterRow::default()
        }];
        let bytes = to_semicolon_csv(&rows).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("full_name;nickname;team;age;birth_date;contract_id;start_date;record_date;registration_id;federation_id")
        );
        assert_eq!(lines.next(), Some("ANA SILVA;;\"Lions; B\";;;;;;;"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_result_still_has_header() {
        let bytes = to_semicolon_csv::<HistoryRow>(&[]).unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text.trim_end(),
            "team;contract_id;start_date;record_date;registration_id;federation_id;age;birth_date;nickname"
        );
    }

    #[test]
    fn history_file_name_replaces_spaces() {
        assert_eq!(history_file_name("ANA DA SILVA"), "historico_ANA_DA_SILVA.csv");
    }
}
