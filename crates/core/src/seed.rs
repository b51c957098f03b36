//! Initial data for the registries.
//!
//! A seed file is JSON (or YAML, chosen by a `.yaml`/`.yml` extension) shaped as
//!
//! ```text
//! { "patients": [PatientRecord...], "exams": [ExamDefinition...] }
//! ```
//!
//! Either list may be omitted. Entries are decoded one by one and go through the registries'
//! `restore` operations, so a malformed or conflicting entry is skipped (and logged) without
//! affecting the rest of the file. Only an unreadable or unparseable file is an error.

use crate::error::{RegistryError, RegistryResult};
use crate::exam::ExamDefinition;
use crate::patient::PatientRecord;
use crate::repositories::{ExamCatalog, PatientRegistry};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Raw seed contents. Entries are kept undecoded so each can fail on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub patients: Vec<serde_json::Value>,
    pub exams: Vec<serde_json::Value>,
}

/// Outcome of applying a seed file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub patients_loaded: usize,
    pub patients_skipped: usize,
    pub exams_loaded: usize,
    pub exams_skipped: usize,
}

impl SeedReport {
    pub fn loaded(&self) -> usize {
        self.patients_loaded + self.exams_loaded
    }

    pub fn skipped(&self) -> usize {
        self.patients_skipped + self.exams_skipped
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SeedFormat {
    Json,
    Yaml,
}

impl SeedFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SeedFormat::Yaml
            }
            _ => SeedFormat::Json,
        }
    }
}

/// Reads and parses a seed file without touching any registry.
///
/// # Errors
///
/// Returns [`RegistryError::SeedRead`] if the file cannot be read and
/// [`RegistryError::SeedParse`] if it is not a JSON/YAML document of the expected shape.
pub fn read_seed_file(path: &Path) -> RegistryResult<SeedData> {
    let contents = fs::read_to_string(path).map_err(|source| RegistryError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;

    match SeedFormat::from_path(path) {
        SeedFormat::Json => {
            serde_json::from_str(&contents).map_err(|e| RegistryError::SeedParse(e.to_string()))
        }
        SeedFormat::Yaml => {
            serde_yaml::from_str(&contents).map_err(|e| RegistryError::SeedParse(e.to_string()))
        }
    }
}

/// Restores every acceptable entry of `seed` into the given registries.
pub async fn apply_seed(
    seed: SeedData,
    patients: &PatientRegistry,
    exams: &ExamCatalog,
) -> SeedReport {
    let mut report = SeedReport::default();

    for (index, entry) in seed.patients.into_iter().enumerate() {
        match decode::<PatientRecord>(entry) {
            Ok(record) => match patients.restore(record).await {
                Ok(()) => report.patients_loaded += 1,
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping seed patient");
                    report.patients_skipped += 1;
                }
            },
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping seed patient");
                report.patients_skipped += 1;
            }
        }
    }

    for (index, entry) in seed.exams.into_iter().enumerate() {
        match decode::<ExamDefinition>(entry) {
            Ok(exam) => match exams.restore(exam).await {
                Ok(()) => report.exams_loaded += 1,
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping seed exam");
                    report.exams_skipped += 1;
                }
            },
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping seed exam");
                report.exams_skipped += 1;
            }
        }
    }

    report
}

/// Reads `path` and restores its contents into the given registries.
///
/// # Errors
///
/// See [`read_seed_file`]. Individual bad entries are not errors.
pub async fn load_seed_file(
    path: &Path,
    patients: &PatientRegistry,
    exams: &ExamCatalog,
) -> RegistryResult<SeedReport> {
    let seed = read_seed_file(path)?;
    let report = apply_seed(seed, patients, exams).await;

    tracing::info!(
        path = %path.display(),
        patients = report.patients_loaded,
        exams = report.exams_loaded,
        skipped = report.skipped(),
        "seed data loaded"
    );
    Ok(report)
}

fn decode<T: DeserializeOwned>(entry: serde_json::Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const JSON_SEED: &str = r#"{
        "patients": [
            {
                "id": "550e8400e29b41d4a716446655440000",
                "nationalId": "V-12345678",
                "firstName": "Ana",
                "lastName": "Pérez",
                "birthDate": "1990-05-01",
                "email": "ana@lab.com",
                "registrationDate": "2024-01-10"
            },
            {
                "id": "not-a-uuid",
                "nationalId": "V-7654321",
                "firstName": "Luis",
                "lastName": "Mora",
                "birthDate": "1985-07-09",
                "registrationDate": "2024-01-11"
            },
            {
                "id": "660e8400e29b41d4a716446655440000",
                "nationalId": "V-12345678",
                "firstName": "Eva",
                "lastName": "Rojas",
                "birthDate": "1970-01-01",
                "registrationDate": "2024-01-12"
            }
        ],
        "exams": [
            {
                "id": "ex-002",
                "name": "Glucosa",
                "abbreviation": "GLU",
                "area": "Química",
                "price": 5.5,
                "sampleType": "Suero",
                "parameters": [{"name": "Glucosa", "unit": "mg/dL"}]
            },
            {
                "id": "ex-003",
                "name": "Colesterol",
                "abbreviation": "COLT",
                "area": "Química",
                "price": 6,
                "sampleType": "Suero",
                "parameters": [{"name": "Colesterol"}]
            }
        ]
    }"#;

    fn seed_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write seed");
        file
    }

    #[tokio::test]
    async fn json_seed_loads_valid_entries_and_skips_the_rest() {
        let file = seed_file(".json", JSON_SEED);
        let patients = PatientRegistry::new();
        let exams = ExamCatalog::new();

        let report = load_seed_file(file.path(), &patients, &exams)
            .await
            .expect("seed should load");

        assert_eq!(
            report,
            SeedReport {
                patients_loaded: 1,
                patients_skipped: 2,
                exams_loaded: 1,
                exams_skipped: 1,
            }
        );

        let ana = patients.find_by_national_id("V-12345678").await.unwrap();
        assert_eq!(ana.id.to_string(), "550e8400e29b41d4a716446655440000");
        assert_eq!(ana.first_name.as_str(), "Ana");

        let created = exams
            .create(crate::exam::NewExam {
                name: Some("Urea".into()),
                abbreviation: Some("URE".into()),
                area: Some("Química".into()),
                price: Some(4.0),
                sample_type: Some("Suero".into()),
                parameters: Some(vec![serde_json::json!({"name": "Urea"})]),
            })
            .await
            .unwrap();
        assert_eq!(created.id.to_string(), "ex-003");
    }

    #[tokio::test]
    async fn yaml_seed_is_detected_by_extension() {
        let yaml = "\
patients:
  - id: '770e8400e29b41d4a716446655440000'
    nationalId: E-1234567
    firstName: Rosa
    lastName: Díaz
    birthDate: '2000-02-29'
    phone: '0212-1234567'
    registrationDate: '2024-02-01'
";
        let file = seed_file(".yml", yaml);
        let patients = PatientRegistry::new();
        let exams = ExamCatalog::new();

        let report = load_seed_file(file.path(), &patients, &exams).await.unwrap();

        assert_eq!(report.patients_loaded, 1);
        assert_eq!(report.exams_loaded, 0);
        let rosa = patients.find_by_national_id("E-1234567").await.unwrap();
        assert_eq!(rosa.phone, "0212-1234567");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RegistryError::SeedRead { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = seed_file(".json", "{ \"patients\": 42 }");
        let err = read_seed_file(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::SeedParse(_)));
    }

    #[test]
    fn empty_object_is_an_empty_seed() {
        let file = seed_file(".json", "{}");
        let seed = read_seed_file(file.path()).unwrap();
        assert!(seed.patients.is_empty());
        assert!(seed.exams.is_empty());
    }
}
