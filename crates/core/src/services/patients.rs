//! Patient request handling.

use crate::config::CoreConfig;
use crate::constants::PATIENT_ID_PREFIX_LEN;
use crate::error::{RegistryError, RegistryResult};
use crate::patient::{supplied, NewPatient, PatientPatch, PatientRecord};
use crate::repositories::PatientRegistry;
use crate::validation::{
    has_exact_length, is_valid_boundary_national_id, is_valid_email, parse_date,
    NationalIdPolicy,
};
use std::sync::Arc;

/// Service for patient requests.
///
/// Only `V-` national ids are accepted here; see [`NationalIdPolicy`].
#[derive(Clone)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    registry: PatientRegistry,
}

impl PatientService {
    /// Creates a new service over `registry`.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration (default limit for latest registrations)
    /// * `registry` - The patient registry to delegate to
    pub fn new(cfg: Arc<CoreConfig>, registry: PatientRegistry) -> Self {
        Self { cfg, registry }
    }

    pub fn registry(&self) -> &PatientRegistry {
        &self.registry
    }

    pub async fn list_all(&self) -> Vec<PatientRecord> {
        self.registry.list_all().await
    }

    pub async fn count(&self) -> usize {
        self.registry.count().await
    }

    /// Latest registrations, most recent first. `n` defaults to the configured limit.
    pub async fn latest(&self, n: Option<usize>) -> Vec<PatientRecord> {
        let n = n.unwrap_or_else(|| self.cfg.latest_limit());
        self.registry.latest_n(n).await
    }

    /// Patients registered between two `YYYY-MM-DD` dates, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed or inverted bounds.
    pub async fn registered_between(
        &self,
        start: &str,
        end: &str,
    ) -> RegistryResult<Vec<PatientRecord>> {
        self.registry
            .find_by_registration_date_range(start.trim(), end.trim())
            .await
            .inspect_err(log_rejection)
    }

    /// Finds a patient by national id.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::MissingNationalId`] if the input is blank
    /// - [`RegistryError::InvalidNationalId`] if it is not a `V-` national id
    /// - [`RegistryError::PatientNotFound`] if nobody holds it
    pub async fn find_by_national_id(&self, national_id: &str) -> RegistryResult<PatientRecord> {
        let result = async {
            let national_id = checked_national_id(national_id)?;
            self.registry
                .find_by_national_id(national_id)
                .await
                .ok_or_else(|| RegistryError::PatientNotFound(national_id.to_string()))
        }
        .await;
        result.inspect_err(log_rejection)
    }

    /// Finds a patient by the first five characters of its internal id.
    ///
    /// When several ids share the prefix, the earliest registered patient wins.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPatientId`] unless `id` has exactly five characters and
    /// [`RegistryError::PatientIdNotFound`] if no id starts with it.
    pub async fn find_by_id(&self, id: &str) -> RegistryResult<PatientRecord> {
        let result = async {
            if !has_exact_length(id, PATIENT_ID_PREFIX_LEN) {
                return Err(RegistryError::InvalidPatientId(PATIENT_ID_PREFIX_LEN));
            }
            self.registry
                .find_by_id_prefix(id)
                .await
                .ok_or_else(|| RegistryError::PatientIdNotFound(id.to_string()))
        }
        .await;
        result.inspect_err(log_rejection)
    }

    /// Registers a patient.
    ///
    /// Checks, in order: non-empty body, required fields (`nationalId`, `firstName`,
    /// `lastName`, `birthDate`, all reported together), `V-` national id format, national id
    /// not yet registered, birth date, email. The registry then repeats its own validation.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`RegistryError`].
    pub async fn create(&self, data: NewPatient) -> RegistryResult<PatientRecord> {
        let result = async {
            if data.is_empty() {
                return Err(RegistryError::EmptyBody("patient"));
            }

            let missing: Vec<&'static str> = [
                ("nationalId", &data.national_id),
                ("firstName", &data.first_name),
                ("lastName", &data.last_name),
                ("birthDate", &data.birth_date),
            ]
            .into_iter()
            .filter(|(_, value)| supplied(value).is_none())
            .map(|(field, _)| field)
            .collect();
            if !missing.is_empty() {
                return Err(RegistryError::MissingFields(missing));
            }

            let national_id = supplied(&data.national_id).unwrap_or_default().trim();
            if !is_valid_boundary_national_id(national_id) {
                return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Boundary));
            }
            if self.registry.find_by_national_id(national_id).await.is_some() {
                return Err(RegistryError::DuplicateNationalId(national_id.to_string()));
            }
            check_birth_date(&data.birth_date)?;
            check_email(&data.email)?;

            self.registry.create(data).await
        }
        .await;
        result.inspect_err(log_rejection)
    }

    /// Applies a partial update to the patient holding `national_id`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidUrlNationalId`] if `national_id` is not a `V-` national id
    /// - [`RegistryError::PatientNotFound`] if nobody holds it
    /// - [`RegistryError::InvalidNewNationalId`] / [`RegistryError::DuplicateNationalId`] for
    ///   a changed national id that is malformed or taken
    /// - a validation error for a malformed birth date or email
    /// - [`RegistryError::UpdateFailed`] if the patient vanished before the update applied
    pub async fn update(
        &self,
        national_id: &str,
        patch: PatientPatch,
    ) -> RegistryResult<PatientRecord> {
        let result = async {
            let national_id = national_id.trim();
            if !is_valid_boundary_national_id(national_id) {
                return Err(RegistryError::InvalidUrlNationalId);
            }
            if self.registry.find_by_national_id(national_id).await.is_none() {
                return Err(RegistryError::PatientNotFound(national_id.to_string()));
            }

            if let Some(new_national_id) = supplied(&patch.national_id).map(str::trim) {
                if new_national_id != national_id {
                    if !is_valid_boundary_national_id(new_national_id) {
                        return Err(RegistryError::InvalidNewNationalId);
                    }
                    if self
                        .registry
                        .find_by_national_id(new_national_id)
                        .await
                        .is_some()
                    {
                        return Err(RegistryError::DuplicateNationalId(
                            new_national_id.to_string(),
                        ));
                    }
                }
            }
            check_birth_date(&patch.birth_date)?;
            check_email(&patch.email)?;

            self.registry
                .update(national_id, patch)
                .await?
                .ok_or_else(|| RegistryError::UpdateFailed(national_id.to_string()))
        }
        .await;

        if let Err(RegistryError::UpdateFailed(id)) = &result {
            tracing::warn!(national_id = %id, "patient disappeared during update");
        }
        result.inspect_err(log_rejection)
    }

    /// Deletes the patient holding `national_id` and returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidNationalId`] for a malformed national id and
    /// [`RegistryError::PatientNotFound`] if nobody holds it.
    pub async fn delete(&self, national_id: &str) -> RegistryResult<PatientRecord> {
        let result = async {
            let national_id = national_id.trim();
            if !is_valid_boundary_national_id(national_id) {
                return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Boundary));
            }
            self.registry
                .delete(national_id)
                .await
                .ok_or_else(|| RegistryError::PatientNotFound(national_id.to_string()))
        }
        .await;
        result.inspect_err(log_rejection)
    }
}

fn checked_national_id(input: &str) -> RegistryResult<&str> {
    let national_id = input.trim();
    if national_id.is_empty() {
        return Err(RegistryError::MissingNationalId);
    }
    if !is_valid_boundary_national_id(national_id) {
        return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Boundary));
    }
    Ok(national_id)
}

/// Checks the date as sent, untrimmed, so it fails here exactly when the registry would.
fn check_birth_date(value: &Option<String>) -> RegistryResult<()> {
    match supplied(value) {
        Some(raw) if parse_date(raw).is_none() => Err(RegistryError::InvalidDate {
            field: "birthDate",
            value: raw.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_email(value: &Option<String>) -> RegistryResult<()> {
    match supplied(value) {
        Some(raw) if !is_valid_email(raw.trim()) => Err(RegistryError::InvalidEmail),
        _ => Ok(()),
    }
}

fn log_rejection(err: &RegistryError) {
    tracing::debug!(error = %err, label = err.label(), "patient request rejected");
}
