//! Request and response bodies.
//!
//! Field names are camelCase on the wire. Request bodies carry every field as optional so
//! that presence checks run in the core services (which report *all* missing fields at
//! once) instead of failing inside JSON deserialisation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body rendered for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Short label naming the violated rule.
    pub error: String,
    /// Human-readable explanation.
    pub detalle: String,
}

// ============================================================================
// PATIENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub registration_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePatientReq {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial update. Omitted (or blank) fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePatientReq {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<Patient>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountPatientsRes {
    pub count: usize,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LatestPatientsQuery {
    /// Maximum number of patients to return. Defaults to the configured limit.
    pub n: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct RegistrationRangeQuery {
    /// First registration day, `YYYY-MM-DD`.
    pub start: String,
    /// Last registration day (inclusive), `YYYY-MM-DD`.
    pub end: String,
}

// ============================================================================
// EXAMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub area: String,
    pub price: f64,
    pub sample_type: String,
    #[schema(value_type = Vec<Object>)]
    pub parameters: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExamReq {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub area: Option<String>,
    pub price: Option<f64>,
    pub sample_type: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub parameters: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListExamsRes {
    pub exams: Vec<Exam>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_patient_req_accepts_partial_body() {
        let req: CreatePatientReq =
            serde_json::from_str(r#"{"nationalId":"V-12345678","firstName":"Ana"}"#)
                .expect("partial body should deserialise");
        assert_eq!(req.national_id.as_deref(), Some("V-12345678"));
        assert_eq!(req.first_name.as_deref(), Some("Ana"));
        assert!(req.birth_date.is_none());
    }

    #[test]
    fn patient_serialises_camel_case() {
        let patient = Patient {
            id: "abc".into(),
            national_id: "V-1234567".into(),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            birth_date: "1990-05-01".into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            registration_date: "2024-01-31".into(),
        };
        let json = serde_json::to_value(&patient).expect("serialise");
        assert_eq!(json["nationalId"], "V-1234567");
        assert_eq!(json["registrationDate"], "2024-01-31");
    }

    #[test]
    fn create_exam_req_reads_sample_type() {
        let req: CreateExamReq = serde_json::from_str(
            r#"{"abbreviation":"GLU","sampleType":"Suero","price":5.5,"parameters":[{"name":"Glucosa"}]}"#,
        )
        .expect("deserialise");
        assert_eq!(req.sample_type.as_deref(), Some("Suero"));
        assert_eq!(req.price, Some(5.5));
        assert_eq!(req.parameters.map(|p| p.len()), Some(1));
    }
}
