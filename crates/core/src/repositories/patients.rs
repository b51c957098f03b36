//! Patient registry.
//!
//! Owns the live patient collection and enforces every patient invariant on create, update,
//! delete and restore:
//!
//! - `nationalId` is unique across live records and matches the registry policy
//!   (`[VE]-` plus 6 to 8 digits)
//! - `id` is unique and never changes
//! - `registrationDate` is set once, at creation
//! - present optional fields (email, phone) satisfy their format
//!
//! ## Storage
//!
//! Records live in a `BTreeMap` keyed by an insertion sequence number, which gives the default
//! listing order for free. Two hash indexes (national id and internal id) point into it for
//! keyed lookups and uniqueness checks. The whole store sits behind a single `RwLock`: writes
//! are serialised per collection and readers never see a half-applied mutation.

use crate::constants::DEFAULT_LATEST_LIMIT;
use crate::error::{RegistryError, RegistryResult};
use crate::patient::{supplied, NewPatient, PatientId, PatientPatch, PatientRecord};
use crate::validation::{
    is_valid_email, is_valid_national_id, is_valid_phone, parse_date, NationalIdPolicy,
};
use crate::NonEmptyText;
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Debug, Default)]
struct PatientStore {
    next_seq: u64,
    records: BTreeMap<u64, PatientRecord>,
    by_national_id: HashMap<String, u64>,
    by_id: HashMap<PatientId, u64>,
}

impl PatientStore {
    fn get(&self, national_id: &str) -> Option<(u64, &PatientRecord)> {
        let seq = *self.by_national_id.get(national_id)?;
        self.records.get(&seq).map(|record| (seq, record))
    }

    fn insert(&mut self, record: PatientRecord) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_national_id.insert(record.national_id.clone(), seq);
        self.by_id.insert(record.id, seq);
        self.records.insert(seq, record);
    }

    fn replace(&mut self, seq: u64, record: PatientRecord) {
        if let Some(old) = self.records.get(&seq) {
            if old.national_id != record.national_id {
                self.by_national_id.remove(&old.national_id);
                self.by_national_id.insert(record.national_id.clone(), seq);
            }
        }
        self.records.insert(seq, record);
    }

    fn remove(&mut self, national_id: &str) -> Option<PatientRecord> {
        let seq = self.by_national_id.remove(national_id)?;
        let record = self.records.remove(&seq)?;
        self.by_id.remove(&record.id);
        Some(record)
    }
}

/// Shared handle to the live patient collection.
///
/// Cloning is cheap and every clone sees the same records. Operations are `async` so a
/// persistent backend can add suspension points without changing signatures.
#[derive(Clone)]
pub struct PatientRegistry {
    store: Arc<RwLock<PatientStore>>,
    today: DateSource,
}

impl Default for PatientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientRegistry {
    /// Creates an empty registry that stamps registrations with the current UTC date.
    pub fn new() -> Self {
        Self::with_clock(|| Utc::now().date_naive())
    }

    /// Creates an empty registry using `today` as the source of registration dates.
    pub fn with_clock(today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        Self {
            store: Arc::new(RwLock::new(PatientStore::default())),
            today: Arc::new(today),
        }
    }

    /// Returns every live record in insertion order.
    pub async fn list_all(&self) -> Vec<PatientRecord> {
        self.store.read().await.records.values().cloned().collect()
    }

    /// Looks a patient up by national id.
    ///
    /// The input is trimmed but not format-checked: a malformed value simply finds nothing.
    pub async fn find_by_national_id(&self, national_id: &str) -> Option<PatientRecord> {
        let store = self.store.read().await;
        store
            .get(national_id.trim())
            .map(|(_, record)| record.clone())
    }

    /// Looks a patient up by its full internal id.
    pub async fn find_by_id(&self, id: &str) -> Option<PatientRecord> {
        let id = PatientId::parse(id)?;
        let store = self.store.read().await;
        let seq = store.by_id.get(&id)?;
        store.records.get(seq).cloned()
    }

    /// Returns the first record, in insertion order, whose id starts with `prefix`.
    pub async fn find_by_id_prefix(&self, prefix: &str) -> Option<PatientRecord> {
        if prefix.is_empty() {
            return None;
        }
        let store = self.store.read().await;
        store
            .records
            .values()
            .find(|record| record.id.to_string().starts_with(prefix))
            .cloned()
    }

    /// Registers a new patient.
    ///
    /// Rules are checked in a fixed order and the first violation is reported:
    ///
    /// 1. national id present
    /// 2. national id well formed (registry policy)
    /// 3. `firstName`, `lastName` and `birthDate` present (all missing fields reported together)
    /// 4. birth date is a real `YYYY-MM-DD` date
    /// 5. email and phone, when given, are well formed
    /// 6. national id not already registered
    ///
    /// Names, phone and address are trimmed; email is trimmed and lower-cased.
    ///
    /// # Errors
    ///
    /// Returns a validation [`RegistryError`] for rules 1-5 and
    /// [`RegistryError::DuplicateNationalId`] for rule 6.
    pub async fn create(&self, data: NewPatient) -> RegistryResult<PatientRecord> {
        let national_id = supplied(&data.national_id)
            .map(str::trim)
            .ok_or(RegistryError::MissingNationalId)?;
        if !is_valid_national_id(national_id) {
            return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Registry));
        }

        let first_name = NonEmptyText::new(data.first_name.as_deref().unwrap_or_default());
        let last_name = NonEmptyText::new(data.last_name.as_deref().unwrap_or_default());
        let birth_date = supplied(&data.birth_date);
        let (Ok(first_name), Ok(last_name), Some(birth_date)) = (&first_name, &last_name, birth_date)
        else {
            let mut missing = Vec::new();
            if first_name.is_err() {
                missing.push("firstName");
            }
            if last_name.is_err() {
                missing.push("lastName");
            }
            if birth_date.is_none() {
                missing.push("birthDate");
            }
            return Err(RegistryError::MissingFields(missing));
        };

        let birth_date = parse_date(birth_date).ok_or_else(|| RegistryError::InvalidDate {
            field: "birthDate",
            value: birth_date.to_string(),
        })?;
        let email = normalise_email(supplied(&data.email).unwrap_or_default())?;
        let phone = normalise_phone(supplied(&data.phone).unwrap_or_default())?;

        let mut record = PatientRecord {
            id: PatientId::new(),
            national_id: national_id.to_string(),
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            birth_date,
            phone,
            email,
            address: supplied(&data.address)
                .map(|a| a.trim().to_string())
                .unwrap_or_default(),
            registration_date: (self.today)(),
        };

        let mut store = self.store.write().await;
        if store.by_national_id.contains_key(&record.national_id) {
            return Err(RegistryError::DuplicateNationalId(record.national_id));
        }
        while store.by_id.contains_key(&record.id) {
            record.id = PatientId::new();
        }
        store.insert(record.clone());

        tracing::info!(patient_id = %record.id, "patient registered");
        Ok(record)
    }

    /// Applies a partial update to the patient currently holding `current_national_id`.
    ///
    /// Supplied fields overwrite the stored value (with the same trimming rules as
    /// [`create`](Self::create)); omitted or blank fields keep their value. `id` and
    /// `registrationDate` are never touched. Changing the national id re-validates it and
    /// checks it against every *other* record, so re-submitting the current value is a no-op.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no patient holds `current_national_id`.
    ///
    /// # Errors
    ///
    /// Returns a validation [`RegistryError`] for a malformed national id, birth date, email or
    /// phone, and [`RegistryError::DuplicateNationalId`] if the new national id is taken.
    pub async fn update(
        &self,
        current_national_id: &str,
        patch: PatientPatch,
    ) -> RegistryResult<Option<PatientRecord>> {
        let current = current_national_id.trim();
        let mut store = self.store.write().await;
        let Some((seq, mut updated)) = store.get(current).map(|(seq, r)| (seq, r.clone())) else {
            return Ok(None);
        };

        if let Some(new_national_id) = supplied(&patch.national_id).map(str::trim) {
            if new_national_id != current {
                if !is_valid_national_id(new_national_id) {
                    return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Registry));
                }
                if store
                    .by_national_id
                    .get(new_national_id)
                    .is_some_and(|&other| other != seq)
                {
                    return Err(RegistryError::DuplicateNationalId(
                        new_national_id.to_string(),
                    ));
                }
                updated.national_id = new_national_id.to_string();
            }
        }

        if let Some(raw) = supplied(&patch.birth_date) {
            updated.birth_date = parse_date(raw).ok_or_else(|| RegistryError::InvalidDate {
                field: "birthDate",
                value: raw.to_string(),
            })?;
        }
        if let Some(raw) = supplied(&patch.email) {
            updated.email = normalise_email(raw)?;
        }
        if let Some(raw) = supplied(&patch.phone) {
            updated.phone = normalise_phone(raw)?;
        }
        if let Ok(first_name) = NonEmptyText::new(patch.first_name.as_deref().unwrap_or_default()) {
            updated.first_name = first_name;
        }
        if let Ok(last_name) = NonEmptyText::new(patch.last_name.as_deref().unwrap_or_default()) {
            updated.last_name = last_name;
        }
        if let Some(address) = supplied(&patch.address) {
            updated.address = address.trim().to_string();
        }

        store.replace(seq, updated.clone());

        tracing::info!(patient_id = %updated.id, "patient updated");
        Ok(Some(updated))
    }

    /// Removes the patient holding `national_id` and returns it, or `None` if there is none.
    pub async fn delete(&self, national_id: &str) -> Option<PatientRecord> {
        let removed = self.store.write().await.remove(national_id.trim());
        if let Some(record) = &removed {
            tracing::info!(patient_id = %record.id, "patient deleted");
        }
        removed
    }

    /// Number of live records.
    pub async fn count(&self) -> usize {
        self.store.read().await.records.len()
    }

    /// Returns patients registered between `start` and `end`, both days inclusive.
    ///
    /// The end bound covers the whole end day, so a patient registered on `end` is included.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDate`] if either bound is malformed and
    /// [`RegistryError::InvalidDateRange`] if `start` is after `end`.
    pub async fn find_by_registration_date_range(
        &self,
        start: &str,
        end: &str,
    ) -> RegistryResult<Vec<PatientRecord>> {
        let from = parse_date(start).ok_or_else(|| RegistryError::InvalidDate {
            field: "start",
            value: start.to_string(),
        })?;
        let to = parse_date(end).ok_or_else(|| RegistryError::InvalidDate {
            field: "end",
            value: end.to_string(),
        })?;
        if from > to {
            return Err(RegistryError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let store = self.store.read().await;
        Ok(store
            .records
            .values()
            .filter(|record| (from..=to).contains(&record.registration_date))
            .cloned()
            .collect())
    }

    /// Returns up to `n` patients, most recently registered first.
    ///
    /// Patients registered on the same day keep their insertion order.
    pub async fn latest_n(&self, n: usize) -> Vec<PatientRecord> {
        let store = self.store.read().await;
        let mut records: Vec<&PatientRecord> = store.records.values().collect();
        records.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
        records.into_iter().take(n).cloned().collect()
    }

    /// [`latest_n`](Self::latest_n) with the default limit of five.
    pub async fn latest(&self) -> Vec<PatientRecord> {
        self.latest_n(DEFAULT_LATEST_LIMIT).await
    }

    /// Inserts an already-built record, keeping its `id` and `registrationDate`.
    ///
    /// Used to load seed data. The record must satisfy the same invariants as a created one;
    /// email and phone are normalised the way `create` normalises them.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed national id, email or phone, and a conflict
    /// if the id or national id is already present.
    pub async fn restore(&self, mut record: PatientRecord) -> RegistryResult<()> {
        if !is_valid_national_id(&record.national_id) {
            return Err(RegistryError::InvalidNationalId(NationalIdPolicy::Registry));
        }
        record.email = normalise_email(&record.email)?;
        record.phone = normalise_phone(&record.phone)?;

        let mut store = self.store.write().await;
        if store.by_id.contains_key(&record.id) {
            return Err(RegistryError::DuplicatePatientId(record.id.to_string()));
        }
        if store.by_national_id.contains_key(&record.national_id) {
            return Err(RegistryError::DuplicateNationalId(record.national_id));
        }
        store.insert(record);
        Ok(())
    }
}

fn normalise_email(raw: &str) -> RegistryResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(RegistryError::InvalidEmail);
    }
    Ok(email)
}

fn normalise_phone(raw: &str) -> RegistryResult<String> {
    let phone = raw.trim().to_string();
    if !phone.is_empty() && !is_valid_phone(&phone) {
        return Err(RegistryError::InvalidPhone);
    }
    Ok(phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    /// Registry whose clock can be moved by the test.
    fn registry_at(start: NaiveDate) -> (PatientRegistry, Arc<Mutex<NaiveDate>>) {
        let clock = Arc::new(Mutex::new(start));
        let source = clock.clone();
        let registry = PatientRegistry::with_clock(move || *source.lock().unwrap());
        (registry, clock)
    }

    fn new_patient(national_id: &str) -> NewPatient {
        NewPatient {
            national_id: Some(national_id.into()),
            first_name: Some("  Ana ".into()),
            last_name: Some("Pérez".into()),
            birth_date: Some("1990-05-01".into()),
            phone: Some("0414-1234567".into()),
            email: Some(" Ana.Perez@Lab.COM ".into()),
            address: Some(" Av. Bolívar ".into()),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_registration_date() {
        let (registry, _) = registry_at(day(2024, 1, 15));

        let record = registry
            .create(new_patient("V-12345678"))
            .await
            .expect("create should succeed");

        assert!(PatientId::is_canonical(&record.id.to_string()));
        assert_eq!(record.registration_date, day(2024, 1, 15));
        assert_eq!(record.first_name.as_str(), "Ana");
        assert_eq!(record.email, "ana.perez@lab.com");
        assert_eq!(record.address, "Av. Bolívar");

        let found = registry
            .find_by_national_id("V-12345678")
            .await
            .expect("should be retrievable");
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn create_gives_every_patient_a_distinct_id() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let a = registry.create(new_patient("V-1111111")).await.unwrap();
        let b = registry.create(new_patient("V-2222222")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn create_accepts_foreign_national_ids() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let record = registry.create(new_patient("E-87654321")).await.unwrap();
        assert_eq!(record.national_id, "E-87654321");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_national_id() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        registry.create(new_patient("V-12345678")).await.unwrap();

        let err = registry
            .create(new_patient(" V-12345678 "))
            .await
            .expect_err("duplicate should fail");

        match err {
            RegistryError::DuplicateNationalId(ref id) => assert_eq!(id, "V-12345678"),
            other => panic!("expected DuplicateNationalId, got {other:?}"),
        }
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("V-12345678"));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn create_checks_rules_in_order() {
        let (registry, _) = registry_at(day(2024, 1, 15));

        let err = registry.create(NewPatient::default()).await.unwrap_err();
        assert!(matches!(err, RegistryError::MissingNationalId));

        let mut data = NewPatient {
            national_id: Some("X-12".into()),
            ..Default::default()
        };
        let err = registry.create(data.clone()).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidNationalId(NationalIdPolicy::Registry)));

        data.national_id = Some("V-12345678".into());
        data.first_name = Some("   ".into());
        data.birth_date = Some("2024-02-30".into());
        let err = registry.create(data.clone()).await.unwrap_err();
        match err {
            RegistryError::MissingFields(fields) => assert_eq!(fields, vec!["firstName", "lastName"]),
            other => panic!("expected MissingFields, got {other:?}"),
        }

        data.first_name = Some("Ana".into());
        data.last_name = Some("Pérez".into());
        let err = registry.create(data.clone()).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { field: "birthDate", .. }));

        data.birth_date = Some("2024-02-29".into());
        data.email = Some("not-an-email".into());
        let err = registry.create(data.clone()).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEmail));

        data.email = None;
        data.phone = Some("0800-1234567".into());
        let err = registry.create(data).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPhone));

        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn missing_fields_are_reported_together() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let err = registry
            .create(NewPatient {
                national_id: Some("V-12345678".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing: firstName, lastName, birthDate");
    }

    #[tokio::test]
    async fn find_by_id_matches_full_id_only() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let record = registry.create(new_patient("V-12345678")).await.unwrap();
        let id = record.id.to_string();

        assert_eq!(registry.find_by_id(&id).await, Some(record.clone()));
        assert_eq!(registry.find_by_id(&id[..5]).await, None);
        assert_eq!(registry.find_by_id(&id.to_uppercase()).await, None);
        assert_eq!(registry.find_by_id_prefix(&id[..5]).await, Some(record));
        assert_eq!(registry.find_by_id_prefix("").await, None);
    }

    #[tokio::test]
    async fn find_by_national_id_trims_input() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        registry.create(new_patient("V-12345678")).await.unwrap();
        assert!(registry.find_by_national_id("  V-12345678\n").await.is_some());
        assert!(registry.find_by_national_id("V-00000000").await.is_none());
    }

    #[tokio::test]
    async fn update_phone_only_leaves_everything_else_unchanged() {
        let (registry, clock) = registry_at(day(2024, 1, 15));
        let before = registry.create(new_patient("V-12345678")).await.unwrap();
        *clock.lock().unwrap() = day(2024, 6, 1);

        let after = registry
            .update(
                "V-12345678",
                PatientPatch {
                    phone: Some(" 0212-7654321 ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("patient exists");

        assert_eq!(after.phone, "0212-7654321");
        assert_eq!(
            PatientRecord {
                phone: before.phone.clone(),
                ..after.clone()
            },
            before
        );
    }

    #[tokio::test]
    async fn update_to_own_national_id_is_a_no_op() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let before = registry.create(new_patient("V-12345678")).await.unwrap();

        let after = registry
            .update(
                "V-12345678",
                PatientPatch {
                    national_id: Some("V-12345678".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("patient exists");

        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn update_rejects_national_id_of_another_patient() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        registry.create(new_patient("V-1111111")).await.unwrap();
        registry.create(new_patient("V-2222222")).await.unwrap();

        let err = registry
            .update(
                "V-1111111",
                PatientPatch {
                    national_id: Some("V-2222222".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateNationalId(ref id) if id == "V-2222222"));
        assert!(registry.find_by_national_id("V-1111111").await.is_some());
    }

    #[tokio::test]
    async fn update_moves_the_national_id_index() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let before = registry.create(new_patient("V-1111111")).await.unwrap();

        registry
            .update(
                "V-1111111",
                PatientPatch {
                    national_id: Some("E-3333333".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(registry.find_by_national_id("V-1111111").await.is_none());
        let moved = registry.find_by_national_id("E-3333333").await.unwrap();
        assert_eq!(moved.id, before.id);
        assert_eq!(registry.find_by_id(&before.id.to_string()).await.unwrap().national_id, "E-3333333");
    }

    #[tokio::test]
    async fn update_validates_supplied_fields() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        registry.create(new_patient("V-1111111")).await.unwrap();

        let err = registry
            .update(
                "V-1111111",
                PatientPatch {
                    national_id: Some("V-12".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidNationalId(_)));

        let err = registry
            .update(
                "V-1111111",
                PatientPatch {
                    birth_date: Some("1990-13-01".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { .. }));

        let err = registry
            .update(
                "V-1111111",
                PatientPatch {
                    email: Some("nope".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEmail));
    }

    #[tokio::test]
    async fn update_ignores_blank_fields() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let before = registry.create(new_patient("V-1111111")).await.unwrap();

        let after = registry
            .update(
                "V-1111111",
                PatientPatch {
                    first_name: Some("  ".into()),
                    email: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn update_of_unknown_patient_returns_none() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let result = registry
            .update("V-9999999", PatientPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_record_or_none() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let record = registry.create(new_patient("V-1111111")).await.unwrap();

        assert_eq!(registry.delete("V-9999999").await, None);
        assert_eq!(registry.delete("V-1111111").await, Some(record.clone()));
        assert_eq!(registry.count().await, 0);
        assert!(registry.find_by_id(&record.id.to_string()).await.is_none());

        // The national id is free again.
        registry.create(new_patient("V-1111111")).await.unwrap();
    }

    #[tokio::test]
    async fn list_all_keeps_insertion_order_after_deletes() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        for id in ["V-1111111", "V-2222222", "V-3333333"] {
            registry.create(new_patient(id)).await.unwrap();
        }
        registry.delete("V-2222222").await;
        registry.create(new_patient("V-4444444")).await.unwrap();

        let ids: Vec<String> = registry
            .list_all()
            .await
            .into_iter()
            .map(|r| r.national_id)
            .collect();
        assert_eq!(ids, ["V-1111111", "V-3333333", "V-4444444"]);
    }

    #[tokio::test]
    async fn registration_range_includes_whole_end_day() {
        let (registry, clock) = registry_at(day(2023, 12, 31));
        registry.create(new_patient("V-1000000")).await.unwrap();
        *clock.lock().unwrap() = day(2024, 1, 1);
        registry.create(new_patient("V-2000000")).await.unwrap();
        *clock.lock().unwrap() = day(2024, 1, 31);
        registry.create(new_patient("V-3000000")).await.unwrap();
        *clock.lock().unwrap() = day(2024, 2, 1);
        registry.create(new_patient("V-4000000")).await.unwrap();

        let found: Vec<String> = registry
            .find_by_registration_date_range("2024-01-01", "2024-01-31")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.national_id)
            .collect();

        assert_eq!(found, ["V-2000000", "V-3000000"]);
    }

    #[tokio::test]
    async fn registration_range_validates_bounds() {
        let (registry, _) = registry_at(day(2024, 1, 15));

        let err = registry
            .find_by_registration_date_range("2024-1-01", "2024-01-31")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { field: "start", .. }));

        let err = registry
            .find_by_registration_date_range("2024-01-01", "2024-02-30")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { field: "end", .. }));

        let err = registry
            .find_by_registration_date_range("2024-02-01", "2024-01-31")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDateRange { .. }));

        let same_day = registry
            .find_by_registration_date_range("2024-01-15", "2024-01-15")
            .await
            .unwrap();
        assert!(same_day.is_empty());
    }

    #[tokio::test]
    async fn latest_returns_most_recent_first_with_stable_ties() {
        let (registry, clock) = registry_at(day(2024, 1, 1));
        let days = [1, 3, 2, 7, 5, 7, 4];
        for (i, d) in days.iter().enumerate() {
            *clock.lock().unwrap() = day(2024, 1, *d);
            registry
                .create(new_patient(&format!("V-100000{i}")))
                .await
                .unwrap();
        }

        let latest = registry.latest().await;
        assert_eq!(latest.len(), 5);
        let order: Vec<&str> = latest.iter().map(|r| r.national_id.as_str()).collect();
        assert_eq!(
            order,
            ["V-1000003", "V-1000005", "V-1000004", "V-1000006", "V-1000001"]
        );
        assert!(latest
            .windows(2)
            .all(|w| w[0].registration_date >= w[1].registration_date));

        assert_eq!(registry.latest_n(10).await.len(), 7);
        assert!(registry.latest_n(0).await.is_empty());
    }

    #[tokio::test]
    async fn restore_keeps_id_and_registration_date() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let record = PatientRecord {
            id: PatientId::new(),
            national_id: "E-7654321".into(),
            first_name: NonEmptyText::new("Luis").unwrap(),
            last_name: NonEmptyText::new("Mora").unwrap(),
            birth_date: day(1980, 2, 2),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            registration_date: day(2020, 3, 3),
        };

        registry.restore(record.clone()).await.unwrap();
        assert_eq!(
            registry.find_by_national_id("E-7654321").await,
            Some(record.clone())
        );

        let err = registry.restore(record.clone()).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePatientId(_)));

        let err = registry
            .restore(PatientRecord {
                id: PatientId::new(),
                ..record.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateNationalId(_)));

        let err = registry
            .restore(PatientRecord {
                id: PatientId::new(),
                national_id: "V-1".into(),
                ..record
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidNationalId(_)));
    }

    #[tokio::test]
    async fn restore_normalises_contact_fields() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let record = PatientRecord {
            id: PatientId::new(),
            national_id: "V-12345678".into(),
            first_name: NonEmptyText::new("Ana").unwrap(),
            last_name: NonEmptyText::new("Pérez").unwrap(),
            birth_date: day(1990, 5, 1),
            phone: " 0414-1234567 ".into(),
            email: "Ana@Lab.COM ".into(),
            address: String::new(),
            registration_date: day(2023, 6, 1),
        };

        registry.restore(record).await.unwrap();
        let stored = registry.find_by_national_id("V-12345678").await.unwrap();
        assert_eq!(stored.email, "ana@lab.com");
        assert_eq!(stored.phone, "0414-1234567");

        let err = registry
            .restore(PatientRecord {
                id: PatientId::new(),
                national_id: "V-7654321".into(),
                email: "ana@".into(),
                ..stored
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEmail));
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_national_id_admit_one() {
        let (registry, _) = registry_at(day(2024, 1, 15));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.create(new_patient("V-5555555")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(registry.count().await, 1);
    }
}
