//! Patient records and the inputs used to create and update them.

use crate::constants::DATE_FORMAT;
use crate::NonEmptyText;
use api_shared::dto;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Internal patient identifier.
///
/// Always rendered in canonical form: 32 lowercase hex characters without hyphens, the same
/// value as `Uuid::new_v4().simple().to_string()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatientId(Uuid);

impl PatientId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are refused rather than normalised, so two strings
    /// naming the same patient always compare equal.
    pub fn parse(input: &str) -> Option<Self> {
        if !Self::is_canonical(input) {
            return None;
        }
        Uuid::parse_str(input).ok().map(Self)
    }

    /// Parses a stored identifier: the canonical form or the lowercase hyphenated
    /// `8-4-4-4-12` form, which is normalised to canonical.
    pub fn parse_stored(input: &str) -> Option<Self> {
        Self::parse(input).or_else(|| {
            let hyphenated = input.len() == 36
                && input.bytes().enumerate().all(|(i, b)| match i {
                    8 | 13 | 18 | 23 => b == b'-',
                    _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
                });
            if !hyphenated {
                return None;
            }
            Uuid::parse_str(input).ok().map(Self)
        })
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::parse_stored(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "patient id must be 32 lowercase hex characters or a hyphenated uuid, got '{s}'"
            ))
        })
    }
}

/// A registered patient.
///
/// Optional contact fields are stored as empty strings when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: PatientId,
    pub national_id: String,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub registration_date: NaiveDate,
}

/// Raw fields for a new patient, exactly as received.
///
/// A field is considered missing when it is absent or blank.
#[derive(Clone, Debug, Default)]
pub struct NewPatient {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewPatient {
    /// True if no field at all was supplied.
    pub fn is_empty(&self) -> bool {
        [
            &self.national_id,
            &self.first_name,
            &self.last_name,
            &self.birth_date,
            &self.phone,
            &self.email,
            &self.address,
        ]
        .iter()
        .all(|f| f.is_none())
    }
}

/// Partial update for a patient. `None` and blank values leave the stored field untouched.
#[derive(Clone, Debug, Default)]
pub struct PatientPatch {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Returns the value if present and not blank.
pub(crate) fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

impl From<dto::CreatePatientReq> for NewPatient {
    fn from(req: dto::CreatePatientReq) -> Self {
        Self {
            national_id: req.national_id,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            phone: req.phone,
            email: req.email,
            address: req.address,
        }
    }
}

impl From<dto::UpdatePatientReq> for PatientPatch {
    fn from(req: dto::UpdatePatientReq) -> Self {
        Self {
            national_id: req.national_id,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            phone: req.phone,
            email: req.email,
            address: req.address,
        }
    }
}

impl From<&PatientRecord> for dto::Patient {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id.to_string(),
            national_id: record.national_id.clone(),
            first_name: record.first_name.to_string(),
            last_name: record.last_name.to_string(),
            birth_date: record.birth_date.format(DATE_FORMAT).to_string(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            address: record.address.clone(),
            registration_date: record.registration_date.format(DATE_FORMAT).to_string(),
        }
    }
}
