//! Map raw source headers onto the canonical BID schema.
//!
//! Header matching is substring membership (whole tokens for short English synonyms) over a
//! lower-cased, accent-folded header, tested against [HEADER_RULES] in declaration order. The first rule that matches wins, even when a later
//! rule would be "more specific" (e.g. "data de nascimento" is a birth date because the birth rule is
//! declared before the generic date rule).
//!
//! Raw columns that match no rule are dropped. This is lossy on purpose: a new header variant is not
//! preserved anywhere until a rule is added for it.

use serde::Serialize;

use crate::data::extract::RawTable;
use crate::data::record::{CanonicalField, CanonicalRecord};

#[derive(Debug, Clone, Copy)]
enum Needles {
    /// Every fragment must appear somewhere in the header.
    AllOf(&'static [&'static str]),
    /// Any fragment anywhere, or any word as a whole token. Short English synonyms are words so that
    /// "percentage" is not an age and "timestamp" is not a team.
    AnyOf {
        fragments: &'static [&'static str],
        words: &'static [&'static str],
    },
}

impl Needles {
    fn matches(&self, header: &str) -> bool {
        match self {
            Self::AllOf(needles) => needles.iter().all(|n| header.contains(n)),
            Self::AnyOf { fragments, words } => {
                fragments.iter().any(|n| header.contains(n))
                    || header
                        .split(|ch: char| !ch.is_alphanumeric())
                        .any(|token| words.contains(&token))
            }
        }
    }
}

const fn any(
    fragments: &'static [&'static str],
    words: &'static [&'static str],
) -> Needles {
    Needles::AnyOf { fragments, words }
}

/// Ordered synonym rules. Order is significant.
const HEADER_RULES: &[(CanonicalField, Needles)] = &[
    (CanonicalField::FullName, Needles::AllOf(&["nome", "completo"])),
    (CanonicalField::Nickname, any(&["apelido", "nickname", "alcunha"], &[])),
    (CanonicalField::BirthDate, any(&["nasc", "birth"], &[])),
    (CanonicalField::Age, any(&["idade"], &["age"])),
    (CanonicalField::Team, any(&["clube", "equipe"], &["time", "team"])),
    (CanonicalField::StartDate, any(&["inicio"], &["start"])),
    (CanonicalField::RegistrationId, any(&["inscri", "registration"], &[])),
    (CanonicalField::ContractId, any(&["contrato", "contract"], &[])),
    (CanonicalField::FederationId, any(&["cbf", "federa"], &[])),
    (CanonicalField::RecordDate, any(&["data"], &["date", "record"])),
    (CanonicalField::FullName, any(&["nome", "jogador", "atleta"], &["name"])),
];

/// Lower-case, trim and fold the Latin accents that show up in Portuguese headers.
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect()
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// First canonical field whose rule matches the header, if any.
pub fn match_header(header: &str) -> Option<CanonicalField> {
    let normalized = normalize_header(header);
    HEADER_RULES
        .iter()
        .find(|(_, needles)| needles.matches(&normalized))
        .map(|(field, _)| *field)
}

/// Resolved header layout of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderMapping {
    /// `(raw column index, canonical field)` for every kept column.
    pub columns: Vec<(usize, CanonicalField)>,
    /// Raw headers that matched no rule, or lost to an earlier column for the same field.
    pub dropped: Vec<String>,
}

impl HeaderMapping {
    pub fn field_for(&self, column: usize) -> Option<CanonicalField> {
        self.columns
            .iter()
            .find(|(index, _)| *index == column)
            .map(|(_, field)| *field)
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.columns.iter().any(|(_, f)| *f == field)
    }
}

/// Map each raw header. When two headers resolve to the same field the leftmost one wins.
pub fn map_headers(headers: &[String]) -> HeaderMapping {
    let mut mapping = HeaderMapping::default();
    for (index, header) in headers.iter().enumerate() {
        match match_header(header) {
            Some(field) if mapping.is_mapped(field) => {
                tracing::debug!(header = %header, %field, "duplicate canonical column dropped");
                mapping.dropped.push(header.clone());
            }
            Some(field) => mapping.columns.push((index, field)),
            None => mapping.dropped.push(header.clone()),
        }
    }
    mapping
}

/// Project a raw table onto canonical records. Empty cells become `None`; `source_file` is left unset.
pub fn normalize(table: &RawTable) -> Vec<CanonicalRecord> {
    let mapping = map_headers(&table.headers);
    normalize_with(table, &mapping)
}

pub fn normalize_with(table: &RawTable, mapping: &HeaderMapping) -> Vec<CanonicalRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let mut record = CanonicalRecord::default();
            for (index, field) in &mapping.columns {
                let value = row
                    .get(*index)
                    .filter(|cell| !cell.is_empty())
                    .cloned();
                record.set(*field, value);
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            entry_name: "bid.csv".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn original_column_names_map_to_every_field() {
        let headers = [
            "nome_completo",
            "inscricao",
            "contrato",
            "data",
            "inicio",
            "cbf",
            "apelido",
            "nascimento",
            "time",
            "idade",
        ];
        let fields: Vec<Option<CanonicalField>> =
            headers.iter().map(|h| match_header(h)).collect();
        let expected: Vec<Option<CanonicalField>> =
            CanonicalField::ALL.iter().copied().map(Some).collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn english_canonical_names_map_to_themselves() {
        for field in CanonicalField::ALL {
            assert_eq!(match_header(field.as_str()), Some(field), "{field}");
        }
    }

    #[test]
    fn portuguese_display_headers_with_accents() {
        assert_eq!(match_header(" Nome Completo "), Some(CanonicalField::FullName));
        assert_eq!(match_header("Clube"), Some(CanonicalField::Team));
        assert_eq!(match_header("Início"), Some(CanonicalField::StartDate));
        assert_eq!(match_header("Nº Inscrição"), Some(CanonicalField::RegistrationId));
        assert_eq!(match_header("Equipe"), Some(CanonicalField::Team));
    }

    #[test]
    fn declaration_order_resolves_overlaps() {
        assert_eq!(match_header("Data de Nascimento"), Some(CanonicalField::BirthDate));
        assert_eq!(match_header("Data Início"), Some(CanonicalField::StartDate));
        assert_eq!(match_header("Data"), Some(CanonicalField::RecordDate));
    }

    #[test]
    fn short_english_synonyms_match_whole_words_only() {
        assert_eq!(match_header("Agente"), None);
        assert_eq!(match_header("Percentage"), None);
        assert_eq!(match_header("Timestamp"), None);
        assert_eq!(match_header("Player Age"), Some(CanonicalField::Age));
        assert_eq!(match_header("Time Atual"), Some(CanonicalField::Team));
        assert_eq!(match_header("current_team"), Some(CanonicalField::Team));
        assert_eq!(match_header("Start Date"), Some(CanonicalField::StartDate));
    }

    #[test]
    fn unknown_headers_are_dropped() {
        let mapping = map_headers(&["Nome Completo".to_string(), "Observação".to_string()]);
        assert_eq!(mapping.columns, vec![(0, CanonicalField::FullName)]);
        assert_eq!(mapping.dropped, vec!["Observação".to_string()]);
    }

    #[test]
    fn leftmost_duplicate_wins() {
        let mapping = map_headers(&["Time".to_string(), "Clube".to_string()]);
        assert_eq!(mapping.field_for(0), Some(CanonicalField::Team));
        assert_eq!(mapping.field_for(1), None);
        assert_eq!(mapping.dropped, vec!["Clube".to_string()]);
    }

    #[test]
    fn missing_columns_are_null_and_values_stay_text() {
        let raw = table(
            &["Nome Completo", "Clube", "Início", "Extra"],
            &[&["ANA SILVA", "Lions", "01/02/2020", "x"], &["JOAO", "", "0012", "y"]],
        );
        let records = normalize(&raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name.as_deref(), Some("ANA SILVA"));
        assert_eq!(records[0].team.as_deref(), Some("Lions"));
        assert_eq!(records[0].start_date.as_deref(), Some("01/02/2020"));
        assert_eq!(records[0].registration_id, None);
        assert_eq!(records[0].contract_id, None);
        assert_eq!(records[0].source_file, None);
        assert_eq!(records[1].team, None);
        assert_eq!(records[1].start_date.as_deref(), Some("0012"));
    }
}
