//! Canonical BID record shape shared by every source.
//! Sources disagree on header names; after normalization every row has exactly these fields.

use serde::{Deserialize, Serialize};

/// The ten source-mappable canonical fields, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    FullName,
    RegistrationId,
    ContractId,
    RecordDate,
    StartDate,
    FederationId,
    Nickname,
    BirthDate,
    Team,
    Age,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::FullName,
        CanonicalField::RegistrationId,
        CanonicalField::ContractId,
        CanonicalField::RecordDate,
        CanonicalField::StartDate,
        CanonicalField::FederationId,
        CanonicalField::Nickname,
        CanonicalField::BirthDate,
        CanonicalField::Team,
        CanonicalField::Age,
    ];

    /// Column name used in exports, the SQLite variant and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::RegistrationId => "registration_id",
            Self::ContractId => "contract_id",
            Self::RecordDate => "record_date",
            Self::StartDate => "start_date",
            Self::FederationId => "federation_id",
            Self::Nickname => "nickname",
            Self::BirthDate => "birth_date",
            Self::Team => "team",
            Self::Age => "age",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the merged dataset. All fields are raw text; `None` means the source had no value
/// (empty cell) or no column for the field at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub full_name: Option<String>,
    pub registration_id: Option<String>,
    pub contract_id: Option<String>,
    pub record_date: Option<String>,
    pub start_date: Option<String>,
    pub federation_id: Option<String>,
    pub nickname: Option<String>,
    pub birth_date: Option<String>,
    pub team: Option<String>,
    pub age: Option<String>,
    /// Basename of the archive the row came from. Set at ingestion; audit only, never searched.
    pub source_file: Option<String>,
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        let value = match field {
            CanonicalField::FullName => &self.full_name,
            CanonicalField::RegistrationId => &self.registration_id,
            CanonicalField::ContractId => &self.contract_id,
            CanonicalField::RecordDate => &self.record_date,
            CanonicalField::StartDate => &self.start_date,
            CanonicalField::FederationId => &self.federation_id,
            CanonicalField::Nickname => &self.nickname,
            CanonicalField::BirthDate => &self.birth_date,
            CanonicalField::Team => &self.team,
            CanonicalField::Age => &self.age,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: CanonicalField, value: Option<String>) {
        let slot = match field {
            CanonicalField::FullName => &mut self.full_name,
            CanonicalField::RegistrationId => &mut self.registration_id,
            CanonicalField::ContractId => &mut self.contract_id,
            CanonicalField::RecordDate => &mut self.record_date,
            CanonicalField::StartDate => &mut self.start_date,
            CanonicalField::FederationId => &mut self.federation_id,
            CanonicalField::Nickname => &mut self.nickname,
            CanonicalField::BirthDate => &mut self.birth_date,
            CanonicalField::Team => &mut self.team,
            CanonicalField::Age => &mut self.age,
        };
        *slot = value;
    }
}
