//! # API REST
//!
//! REST API implementation for the lab back office.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, error bodies)
//!
//! Uses `api-shared` for wire types and `lab-core` for everything else.

#![warn(rust_2018_idioms)]

use api_shared::{dto, HealthService};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use lab_core::{
    seed, CoreConfig, ExamCatalog, ExamService, PatientRegistry, PatientService, RegistryError,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ============================================================================
// STATE
// ============================================================================

/// Application state for the REST API server
///
/// Holds the request-facing services. Both wrap shared registries, so cloning the state is
/// cheap and every handler sees the same collections.
#[derive(Clone)]
pub struct AppState {
    pub patients: PatientService,
    pub exams: ExamService,
}

impl AppState {
    /// Creates state over empty registries.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            patients: PatientService::new(cfg, PatientRegistry::new()),
            exams: ExamService::new(ExamCatalog::new()),
        }
    }

    /// Creates state and restores the configured seed file, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed file cannot be read or parsed.
    pub async fn bootstrap(cfg: Arc<CoreConfig>) -> Result<Self, RegistryError> {
        let state = Self::new(cfg.clone());
        if let Some(path) = cfg.seed_file() {
            seed::load_seed_file(path, state.patients.registry(), state.exams.catalog()).await?;
        }
        Ok(state)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error returned by handlers, rendered as `{ "error": ..., "detalle": ... }`.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Body(JsonRejection),
    Query(QueryRejection),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Registry(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                (
                    status,
                    dto::ErrorRes {
                        error: err.label().into(),
                        detalle: err.to_string(),
                    },
                )
            }
            ApiError::Body(rejection) => (
                rejection.status(),
                dto::ErrorRes {
                    error: "Invalid request body".into(),
                    detalle: rejection.body_text(),
                },
            ),
            ApiError::Query(rejection) => (
                rejection.status(),
                dto::ErrorRes {
                    error: "Invalid query".into(),
                    detalle: rejection.body_text(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwraps a JSON body. A request without a JSON content type counts as an empty body.
fn json_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ApiError::Body(rejection)),
    }
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(ApiError::Query)
}

// ============================================================================
// ROUTER
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        count_patients,
        latest_patients,
        registered_patients,
        find_patient_by_id,
        get_patient,
        update_patient,
        delete_patient,
        list_exams,
        create_exam,
        get_exam,
        delete_exam,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::Patient,
        dto::CreatePatientReq,
        dto::UpdatePatientReq,
        dto::ListPatientsRes,
        dto::CountPatientsRes,
        dto::Exam,
        dto::CreateExamReq,
        dto::ListExamsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the application router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/count", get(count_patients))
        .route("/patients/latest", get(latest_patients))
        .route("/patients/registered", get(registered_patients))
        .route("/patients/id/:id", get(find_patient_by_id))
        .route(
            "/patients/:national_id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/exams", get(list_exams).post(create_exam))
        .route("/exams/:abbreviation", get(get_exam).delete(delete_exam))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until the server fails.
///
/// # Errors
/// Returns an error if:
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Lab REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn patient_list(records: &[lab_core::PatientRecord]) -> dto::ListPatientsRes {
    dto::ListPatientsRes {
        patients: records.iter().map(dto::Patient::from).collect(),
    }
}

// ============================================================================
// HEALTH
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

// ============================================================================
// PATIENTS
// ============================================================================

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients in registration order", body = dto::ListPatientsRes)
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<dto::ListPatientsRes> {
    let patients = state.patients.list_all().await;
    Json(patient_list(&patients))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = dto::CreatePatientReq,
    responses(
        (status = 201, description = "Patient registered", body = dto::Patient),
        (status = 400, description = "Missing or malformed fields", body = dto::ErrorRes),
        (status = 409, description = "National id already registered", body = dto::ErrorRes)
    )
)]
/// Register a new patient
///
/// The registration date and internal id are assigned by the server.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<dto::CreatePatientReq>, JsonRejection>,
) -> Result<(StatusCode, Json<dto::Patient>), ApiError> {
    let req = json_body(payload)?;
    let record = state.patients.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(dto::Patient::from(&record))))
}

#[utoipa::path(
    get,
    path = "/patients/count",
    responses(
        (status = 200, description = "Number of registered patients", body = dto::CountPatientsRes)
    )
)]
#[axum::debug_handler]
async fn count_patients(State(state): State<AppState>) -> Json<dto::CountPatientsRes> {
    Json(dto::CountPatientsRes {
        count: state.patients.count().await,
    })
}

#[utoipa::path(
    get,
    path = "/patients/latest",
    params(dto::LatestPatientsQuery),
    responses(
        (status = 200, description = "Most recently registered patients first", body = dto::ListPatientsRes),
        (status = 400, description = "Malformed query string", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn latest_patients(
    State(state): State<AppState>,
    query: Result<Query<dto::LatestPatientsQuery>, QueryRejection>,
) -> Result<Json<dto::ListPatientsRes>, ApiError> {
    let query = query_params(query)?;
    let patients = state.patients.latest(query.n).await;
    Ok(Json(patient_list(&patients)))
}

#[utoipa::path(
    get,
    path = "/patients/registered",
    params(dto::RegistrationRangeQuery),
    responses(
        (status = 200, description = "Patients registered in the range", body = dto::ListPatientsRes),
        (status = 400, description = "Malformed or inverted dates", body = dto::ErrorRes)
    )
)]
/// Patients registered between two dates, both days inclusive
#[axum::debug_handler]
async fn registered_patients(
    State(state): State<AppState>,
    query: Result<Query<dto::RegistrationRangeQuery>, QueryRejection>,
) -> Result<Json<dto::ListPatientsRes>, ApiError> {
    let query = query_params(query)?;
    let patients = state
        .patients
        .registered_between(&query.start, &query.end)
        .await?;
    Ok(Json(patient_list(&patients)))
}

#[utoipa::path(
    get,
    path = "/patients/id/{id}",
    params(("id" = String, Path, description = "First five characters of the internal id")),
    responses(
        (status = 200, description = "Patient found", body = dto::Patient),
        (status = 400, description = "Id is not five characters long", body = dto::ErrorRes),
        (status = 404, description = "No id starts with the prefix", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn find_patient_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<dto::Patient>, ApiError> {
    let record = state.patients.find_by_id(&id).await?;
    Ok(Json(dto::Patient::from(&record)))
}

#[utoipa::path(
    get,
    path = "/patients/{national_id}",
    params(("national_id" = String, Path, description = "National id, e.g. V-12345678")),
    responses(
        (status = 200, description = "Patient found", body = dto::Patient),
        (status = 400, description = "Malformed national id", body = dto::ErrorRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
) -> Result<Json<dto::Patient>, ApiError> {
    let record = state.patients.find_by_national_id(&national_id).await?;
    Ok(Json(dto::Patient::from(&record)))
}

#[utoipa::path(
    put,
    path = "/patients/{national_id}",
    params(("national_id" = String, Path, description = "Current national id")),
    request_body = dto::UpdatePatientReq,
    responses(
        (status = 200, description = "Updated patient", body = dto::Patient),
        (status = 400, description = "Malformed fields", body = dto::ErrorRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes),
        (status = 409, description = "New national id already registered", body = dto::ErrorRes),
        (status = 500, description = "Update could not be applied", body = dto::ErrorRes)
    )
)]
/// Partially update a patient
///
/// Only supplied, non-blank fields change. The internal id and registration date never do.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
    payload: Result<Json<dto::UpdatePatientReq>, JsonRejection>,
) -> Result<Json<dto::Patient>, ApiError> {
    let req = json_body(payload)?;
    let record = state.patients.update(&national_id, req.into()).await?;
    Ok(Json(dto::Patient::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/patients/{national_id}",
    params(("national_id" = String, Path, description = "National id of the patient to remove")),
    responses(
        (status = 200, description = "Removed patient", body = dto::Patient),
        (status = 400, description = "Malformed national id", body = dto::ErrorRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    Path(national_id): Path<String>,
) -> Result<Json<dto::Patient>, ApiError> {
    let record = state.patients.delete(&national_id).await?;
    Ok(Json(dto::Patient::from(&record)))
}

// ============================================================================
// EXAMS
// ============================================================================

#[utoipa::path(
    get,
    path = "/exams",
    responses(
        (status = 200, description = "All catalogued exams", body = dto::ListExamsRes)
    )
)]
#[axum::debug_handler]
async fn list_exams(State(state): State<AppState>) -> Json<dto::ListExamsRes> {
    let exams = state.exams.list_all().await;
    Json(dto::ListExamsRes {
        exams: exams.iter().map(dto::Exam::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/exams",
    request_body = dto::CreateExamReq,
    responses(
        (status = 201, description = "Exam created", body = dto::Exam),
        (status = 400, description = "Bad abbreviation or missing fields", body = dto::ErrorRes),
        (status = 409, description = "Abbreviation already registered", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_exam(
    State(state): State<AppState>,
    payload: Result<Json<dto::CreateExamReq>, JsonRejection>,
) -> Result<(StatusCode, Json<dto::Exam>), ApiError> {
    let req = json_body(payload)?;
    let exam = state.exams.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(dto::Exam::from(&exam))))
}

#[utoipa::path(
    get,
    path = "/exams/{abbreviation}",
    params(("abbreviation" = String, Path, description = "Three-character abbreviation, e.g. GLU")),
    responses(
        (status = 200, description = "Exam found", body = dto::Exam),
        (status = 400, description = "Abbreviation is not three characters", body = dto::ErrorRes),
        (status = 404, description = "Exam not found", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_exam(
    State(state): State<AppState>,
    Path(abbreviation): Path<String>,
) -> Result<Json<dto::Exam>, ApiError> {
    let exam = state.exams.find(&abbreviation).await?;
    Ok(Json(dto::Exam::from(&exam)))
}

#[utoipa::path(
    delete,
    path = "/exams/{abbreviation}",
    params(("abbreviation" = String, Path, description = "Three-character abbreviation")),
    responses(
        (status = 200, description = "Removed exam", body = dto::Exam),
        (status = 400, description = "Abbreviation is not three characters", body = dto::ErrorRes),
        (status = 404, description = "Exam not found", body = dto::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_exam(
    State(state): State<AppState>,
    Path(abbreviation): Path<String>,
) -> Result<Json<dto::Exam>, ApiError> {
    let exam = state.exams.delete(&abbreviation).await?;
    Ok(Json(dto::Exam::from(&exam)))
}
