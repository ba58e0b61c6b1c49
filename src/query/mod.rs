//! Read-only roster queries over a merged [Dataset].
//!
//! All functions are pure: they borrow the dataset and return owned rows, so results can be cached
//! and shared without copying.

pub mod cache;
pub mod export_csv;
pub mod profile;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::dataset::Dataset;
use crate::data::record::CanonicalRecord;

pub use cache::QueryCache;
pub use profile::{player_profiles, HistoryRow, PlayerProfile};

/// Team filter value meaning "do not filter by team".
pub const ALL_TEAMS: &str = "Todos";

/// Fixed output projection for search and detail results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterRow {
    pub full_name: Option<String>,
    pub nickname: Option<String>,
    pub team: Option<String>,
    pub age: Option<String>,
    pub birth_date: Option<String>,
    pub contract_id: Option<String>,
    pub start_date: Option<String>,
    pub record_date: Option<String>,
    pub registration_id: Option<String>,
    pub federation_id: Option<String>,
}

impl RosterRow {
    pub const COLUMNS: [&'static str; 10] = [
        "full_name",
        "nickname",
        "team",
        "age",
        "birth_date",
        "contract_id",
        "start_date",
        "record_date",
        "registration_id",
        "federation_id",
    ];
}

impl From<&CanonicalRecord> for RosterRow {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            nickname: record.nickname.clone(),
            team: record.team.clone(),
            age: record.age.clone(),
            birth_date: record.birth_date.clone(),
            contract_id: record.contract_id.clone(),
            start_date: record.start_date.clone(),
            record_date: record.record_date.clone(),
            registration_id: record.registration_id.clone(),
            federation_id: record.federation_id.clone(),
        }
    }
}

/// Caller-side input problems. The engine never raises these; CLI and server check before querying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryInputError {
    #[error("enter at least part of the player's name")]
    EmptyName,

    #[error("limit {limit} is outside the allowed range {min}..={max}")]
    LimitOutOfRange { limit: usize, min: usize, max: usize },
}

/// Reject a blank detail lookup; returns the trimmed fragment.
pub fn validate_detail_name(name: &str) -> Result<&str, QueryInputError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(QueryInputError::EmptyName)
    } else {
        Ok(trimmed)
    }
}

/// `None` when the filter is absent, blank or the all-teams sentinel.
pub fn effective_team_filter(team_filter: Option<&str>) -> Option<&str> {
    team_filter.filter(|team| !team.is_empty() && *team != ALL_TEAMS)
}

/// Distinct trimmed, non-empty team names in ascending code-point order.
pub fn distinct_teams(dataset: &Dataset) -> Vec<String> {
    dataset
        .records()
        .iter()
        .filter_map(|record| record.team.as_deref())
        .map(str::trim)
        .filter(|team| !team.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Name/nickname substring search with optional exact team filter, sorted by full name, truncated.
///
/// A blank `name_query` and an absent or sentinel `team_filter` return the whole dataset.
pub fn search(
    dataset: &Dataset,
    name_query: &str,
    team_filter: Option<&str>,
    limit: usize,
) -> Vec<RosterRow> {
    let needle = name_query.trim().to_lowercase();
    let team = effective_team_filter(team_filter);

    let mut rows: Vec<RosterRow> = dataset
        .records()
        .iter()
        .filter(|record| {
            needle.is_empty()
                || contains_ci(record.full_name.as_deref(), &needle)
                || contains_ci(record.nickname.as_deref(), &needle)
        })
        .filter(|record| team.map_or(true, |team| record.team.as_deref() == Some(team)))
        .map(RosterRow::from)
        .collect();

    rows.sort_by(|a, b| cmp_nulls_last(a.full_name.as_deref(), b.full_name.as_deref()));
    rows.truncate(limit);
    rows
}

/// Every record whose full name contains `name_fragment`, ordered by
/// `(full_name, record_date, start_date)` so one player's history reads chronologically.
///
/// An empty fragment is passed through and matches every row that has a full name; callers are
/// expected to reject it first (see [validate_detail_name]).
pub fn player_details(dataset: &Dataset, name_fragment: &str) -> Vec<RosterRow> {
    let needle = name_fragment.trim().to_lowercase();

    let mut rows: Vec<RosterRow> = dataset
        .records()
        .iter()
        .filter(|record| contains_ci(record.full_name.as_deref(), &needle))
        .map(RosterRow::from)
        .collect();

    rows.sort_by(|a, b| {
        cmp_nulls_last(a.full_name.as_deref(), b.full_name.as_deref())
            .then_with(|| cmp_nulls_last(a.record_date.as_deref(), b.record_date.as_deref()))
            .then_with(|| cmp_nulls_last(a.start_date.as_deref(), b.start_date.as_deref()))
    });
    rows
}

/// Case-insensitive containment; a missing value never matches.
fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.map_or(false, |value| value.to_lowercase().contains(needle_lower))
}

/// Ascending order with nulls after every value.
pub(crate) fn cmp_nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
