//! Exam definitions and sequential exam ids.

use crate::constants::{ABBREVIATION_LEN, EXAM_ID_PREFIX, EXAM_ID_WIDTH};
use crate::{NonEmptyText, RegistryError, RegistryResult};
use api_shared::dto;
use lab_types::FixedText;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-character external key of an exam.
pub type Abbreviation = FixedText<ABBREVIATION_LEN>;

/// Sequential exam id, rendered as `ex-<n>` zero-padded to at least three digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExamCode(u32);

impl ExamCode {
    /// The id assigned to the first exam of an empty catalog.
    pub const FIRST: ExamCode = ExamCode(1);

    pub fn new(sequence: u32) -> Self {
        Self(sequence)
    }

    /// Parses `ex-<digits>`. Any digit count is accepted, so ids written by hand
    /// (`ex-7`, `ex-1000`) keep their numeric value.
    pub fn parse(input: &str) -> RegistryResult<Self> {
        input
            .strip_prefix(EXAM_ID_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(Self)
            .ok_or_else(|| RegistryError::InvalidExamId(input.to_string()))
    }

    pub fn sequence(self) -> u32 {
        self.0
    }

    /// The following id, or `None` once the sequence space is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ExamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{EXAM_ID_PREFIX}{:0width$}", self.0, width = EXAM_ID_WIDTH)
    }
}

impl Serialize for ExamCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExamCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ExamCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Derives the id for the next exam from the current catalog contents.
///
/// Returns `ex-001` for an empty catalog; otherwise the highest assigned sequence plus one.
/// Gaps left by deletions below the maximum are never refilled.
///
/// # Errors
///
/// Returns [`RegistryError::ExamIdExhausted`] if the highest id is already `u32::MAX`.
pub fn next_exam_id<'a, I>(existing: I) -> RegistryResult<ExamCode>
where
    I: IntoIterator<Item = &'a ExamDefinition>,
{
    match existing.into_iter().map(|exam| exam.id).max() {
        None => Ok(ExamCode::FIRST),
        Some(max) => max
            .next()
            .ok_or_else(|| RegistryError::ExamIdExhausted(max.to_string())),
    }
}

/// A catalogued lab exam.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDefinition {
    pub id: ExamCode,
    pub name: NonEmptyText,
    pub abbreviation: Abbreviation,
    pub area: NonEmptyText,
    pub price: f64,
    pub sample_type: NonEmptyText,
    /// Measured analytes. Opaque to the catalog, but never empty.
    pub parameters: Vec<serde_json::Value>,
}

/// Raw fields for a new exam, exactly as received.
#[derive(Clone, Debug, Default)]
pub struct NewExam {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub area: Option<String>,
    pub price: Option<f64>,
    pub sample_type: Option<String>,
    pub parameters: Option<Vec<serde_json::Value>>,
}

impl From<dto::CreateExamReq> for NewExam {
    fn from(req: dto::CreateExamReq) -> Self {
        Self {
            name: req.name,
            abbreviation: req.abbreviation,
            area: req.area,
            price: req.price,
            sample_type: req.sample_type,
            parameters: req.parameters,
        }
    }
}

impl From<&ExamDefinition> for dto::Exam {
    fn from(exam: &ExamDefinition) -> Self {
        Self {
            id: exam.id.to_string(),
            name: exam.name.to_string(),
            abbreviation: exam.abbreviation.to_string(),
            area: exam.area.to_string(),
            price: exam.price,
            sample_type: exam.sample_type.to_string(),
            parameters: exam.parameters.clone(),
        }
    }
}
