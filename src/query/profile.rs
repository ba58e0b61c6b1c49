//! Per-player grouping of detail rows for the history view.

use serde::Serialize;

use crate::query::RosterRow;

/// One registration in a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub team: Option<String>,
    pub contract_id: Option<String>,
    pub start_date: Option<String>,
    pub record_date: Option<String>,
    pub registration_id: Option<String>,
    pub federation_id: Option<String>,
    pub age: Option<String>,
    pub birth_date: Option<String>,
    pub nickname: Option<String>,
}

impl HistoryRow {
    pub const COLUMNS: [&'static str; 9] = [
        "team",
        "contract_id",
        "start_date",
        "record_date",
        "registration_id",
        "federation_id",
        "age",
        "birth_date",
        "nickname",
    ];
}

impl From<&RosterRow> for HistoryRow {
    fn from(row: &RosterRow) -> Self {
        Self {
            team: row.team.clone(),
            contract_id: row.contract_id.clone(),
            start_date: row.start_date.clone(),
            record_date: row.record_date.clone(),
            registration_id: row.registration_id.clone(),
            federation_id: row.federation_id.clone(),
            age: row.age.clone(),
            birth_date: row.birth_date.clone(),
            nickname: row.nickname.clone(),
        }
    }
}

/// Everything recorded for one exact full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerProfile {
    pub full_name: String,
    pub nicknames: Vec<String>,
    pub teams: Vec<String>,
    pub ages: Vec<String>,
    pub birth_dates: Vec<String>,
    pub history: Vec<HistoryRow>,
}

/// Group detail rows by exact full name, in order of first appearance. Distinct value lists keep
/// first-appearance order and skip nulls. Rows without a full name are ignored.
pub fn player_profiles(rows: &[RosterRow]) -> Vec<PlayerProfile> {
    let mut profiles: Vec<PlayerProfile> = Vec::new();

    for row in rows {
        let Some(name) = row.full_name.as_deref() else {
            continue;
        };
        let index = match profiles.iter().position(|p| p.full_name == name) {
            Some(index) => index,
            None => {
                profiles.push(PlayerProfile {
                    full_name: name.to_string(),
                    nicknames: Vec::new(),
                    teams: Vec::new(),
                    ages: Vec::new(),
                    birth_dates: Vec::new(),
                    history: Vec::new(),
                });
                profiles.len() - 1
            }
        };
        let profile = &mut profiles[index];
        push_distinct(&mut profile.nicknames, row.nickname.as_deref());
        push_distinct(&mut profile.teams, row.team.as_deref());
        push_distinct(&mut profile.ages, row.age.as_deref());
        push_distinct(&mut profile.birth_dates, row.birth_date.as_deref());
        profile.history.push(HistoryRow::from(row));
    }

    profiles
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value {
        if !values.iter().any(|existing| existing == value) {
            values.push(value.to_string());
        }
    }
}
