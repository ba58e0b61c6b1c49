//! Read-only roster backed by one pre-normalized SQLite table.
//!
//! The table already uses the canonical column names, so this path skips header mapping and the
//! archive cache. SQLite's `lower()` only folds ASCII, so case-insensitive matching of accented
//! letters can differ from the in-memory engine.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use thiserror::Error;

use crate::query::{effective_team_filter, RosterRow};

pub const DEFAULT_SQLITE_TABLE: &str = "bid";

const ROW_COLUMNS: &str = "full_name, nickname, team, age, birth_date, contract_id, start_date, \
                           record_date, registration_id, federation_id";

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

#[derive(Debug)]
pub struct SqliteRoster {
    conn: Connection,
    table: String,
}

impl SqliteRoster {
    /// Open `path` read-only. The table name is interpolated into SQL, so it must be a plain identifier.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, SqliteError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::from_connection(conn, table)
    }

    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, SqliteError> {
        if !is_identifier(table) {
            return Err(SqliteError::InvalidTable(table.to_string()));
        }
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn distinct_teams(&self) -> Result<Vec<String>, SqliteError> {
        let sql = format!(
            "SELECT DISTINCT trim(team, char(32, 9, 10, 13)) FROM {} \
             WHERE team IS NOT NULL AND trim(team, char(32, 9, 10, 13)) <> '' ORDER BY 1",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let teams = stmt
            .query_map([], |row| text_at(row, 0).map(Option::unwrap_or_default))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    pub fn search(
        &self,
        name_query: &str,
        team_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RosterRow>, SqliteError> {
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE (?1 = '' OR instr(lower(full_name), lower(?1)) > 0 \
                    OR instr(lower(nickname), lower(?1)) > 0) \
               AND (?2 IS NULL OR team = ?2) \
             ORDER BY full_name IS NULL, full_name, rowid \
             LIMIT ?3",
            ROW_COLUMNS, self.table
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let team = effective_team_filter(team_filter);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![name_query.trim(), team, limit], roster_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn player_details(&self, name_fragment: &str) -> Result<Vec<RosterRow>, SqliteError> {
        let sql = format!(
            "SELECT {} FROM {} \
             WHERE instr(lower(full_name), lower(?1)) > 0 \
             ORDER BY full_name IS NULL, full_name, \
                      record_date IS NULL, record_date, \
                      start_date IS NULL, start_date, rowid",
            ROW_COLUMNS, self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![name_fragment.trim()], roster_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<usize, SqliteError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn roster_row(row: &Row<'_>) -> rusqlite::Result<RosterRow> {
    Ok(RosterRow {
        full_name: text_at(row, 0)?,
        nickname: text_at(row, 1)?,
        team: text_at(row, 2)?,
        age: text_at(row, 3)?,
        birth_date: text_at(row, 4)?,
        contract_id: text_at(row, 5)?,
        start_date: text_at(row, 6)?,
        record_date: text_at(row, 7)?,
        registration_id: text_at(row, 8)?,
        federation_id: text_at(row, 9)?,
    })
}

/// Any storage class read back as text; numeric cells in a loosely typed table are not an error.
fn text_at(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(index)? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_validated() {
        assert!(is_identifier("bid"));
        assert!(is_identifier("_bid_2024"));
        assert!(!is_identifier("bid; DROP TABLE bid"));
        assert!(!is_identifier("2024"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn rejects_bad_table_before_querying() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteRoster::from_connection(conn, "bid x").unwrap_err();
        assert!(matches!(err, SqliteError::InvalidTable(_)));
    }
}
