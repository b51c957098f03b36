use crate::validation::NationalIdPolicy;

/// Classification of a [`RegistryError`], used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

/// Structured failure returned by every registry, catalog and service operation.
///
/// The `Display` output is the human-readable detail; [`RegistryError::label`] is the short
/// error label and [`RegistryError::kind`] the status classification.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    // Validation
    #[error("Send the {0} data as a JSON object")]
    EmptyBody(&'static str),
    #[error("Send the national id, for example V-12345678")]
    MissingNationalId,
    #[error("Expected format {}", .0.example())]
    InvalidNationalId(NationalIdPolicy),
    #[error("Expected format {}", NationalIdPolicy::Boundary.example())]
    InvalidUrlNationalId,
    #[error("Expected format {}", NationalIdPolicy::Boundary.example())]
    InvalidNewNationalId,
    #[error("Missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{field} must use the YYYY-MM-DD format and be a real calendar date, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("start ({start}) must be on or before end ({end})")]
    InvalidDateRange { start: String, end: String },
    #[error("Use a valid address such as user@domain.com")]
    InvalidEmail,
    #[error("Use a carrier prefix (0412, 0414, 0416, 0422, 0424, 0426) or an 02xx area code followed by 7 digits")]
    InvalidPhone,
    #[error("The id must have exactly {0} characters")]
    InvalidPatientId(usize),
    #[error("The abbreviation must have exactly {0} characters, for example GLU (glucose)")]
    InvalidAbbreviation(usize),
    #[error("Exam ids look like ex-001, got '{0}'")]
    InvalidExamId(String),

    // Not found
    #[error("No patient with national id {0}")]
    PatientNotFound(String),
    #[error("No patient with an id starting with {0}")]
    PatientIdNotFound(String),
    #[error("No exam with abbreviation {0}")]
    ExamNotFound(String),

    // Conflict
    #[error("National id {0} is already registered")]
    DuplicateNationalId(String),
    #[error("Abbreviation {0} is already registered (check whether the exam already exists)")]
    DuplicateAbbreviation(String),
    #[error("Patient id {0} is already in use")]
    DuplicatePatientId(String),
    #[error("Exam id {0} is already in use")]
    DuplicateExamId(String),

    // Internal
    #[error("The patient with national id {0} could not be updated")]
    UpdateFailed(String),
    #[error("No exam ids left after {0}")]
    ExamIdExhausted(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read seed file {path}: {source}", path = path.display())]
    SeedRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedParse(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        use RegistryError::*;
        match self {
            EmptyBody(_)
            | MissingNationalId
            | InvalidNationalId(_)
            | InvalidUrlNationalId
            | InvalidNewNationalId
            | MissingFields(_)
            | InvalidDate { .. }
            | InvalidDateRange { .. }
            | InvalidEmail
            | InvalidPhone
            | InvalidPatientId(_)
            | InvalidAbbreviation(_)
            | InvalidExamId(_) => ErrorKind::Validation,
            PatientNotFound(_) | PatientIdNotFound(_) | ExamNotFound(_) => ErrorKind::NotFound,
            DuplicateNationalId(_)
            | DuplicateAbbreviation(_)
            | DuplicatePatientId(_)
            | DuplicateExamId(_) => ErrorKind::Conflict,
            UpdateFailed(_)
            | ExamIdExhausted(_)
            | InvalidConfig(_)
            | SeedRead { .. }
            | SeedParse(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Short label naming the violated rule.
    pub fn label(&self) -> &'static str {
        use RegistryError::*;
        match self {
            EmptyBody(_) => "Request body required",
            MissingNationalId => "National id required",
            InvalidNationalId(_) => "Invalid national id",
            InvalidUrlNationalId => "Invalid national id in URL",
            InvalidNewNationalId => "Invalid new national id",
            MissingFields(_) => "Missing required fields",
            InvalidDate { .. } => "Invalid date",
            InvalidDateRange { .. } => "Invalid date range",
            InvalidEmail => "Invalid email",
            InvalidPhone => "Invalid phone",
            InvalidPatientId(_) => "Invalid id",
            InvalidAbbreviation(_) => "Invalid abbreviation",
            InvalidExamId(_) => "Invalid exam id",
            PatientNotFound(_) | PatientIdNotFound(_) => "Patient not found",
            ExamNotFound(_) => "Exam not found",
            DuplicateNationalId(_) => "Duplicate national id",
            DuplicateAbbreviation(_) => "Duplicate abbreviation",
            DuplicatePatientId(_) => "Duplicate patient id",
            DuplicateExamId(_) => "Duplicate exam id",
            UpdateFailed(_) => "Update failed",
            ExamIdExhausted(_) => "Exam ids exhausted",
            InvalidConfig(_) => "Invalid configuration",
            SeedRead { .. } | SeedParse(_) => "Seed data unavailable",
        }
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
