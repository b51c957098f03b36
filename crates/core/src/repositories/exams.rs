//! Exam catalog.
//!
//! Owns the live exam definitions. Abbreviations are the external key and are unique; ids come
//! from [`next_exam_id`] and are derived from the catalog contents under the write lock, so two
//! concurrent creates can never be handed the same id.

use crate::constants::ABBREVIATION_LEN;
use crate::error::{RegistryError, RegistryResult};
use crate::exam::{next_exam_id, Abbreviation, ExamCode, ExamDefinition, NewExam};
use crate::validation::has_exact_length;
use crate::NonEmptyText;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ExamStore {
    next_seq: u64,
    records: BTreeMap<u64, ExamDefinition>,
    by_abbreviation: HashMap<String, u64>,
}

impl ExamStore {
    fn get(&self, abbreviation: &str) -> Option<&ExamDefinition> {
        let seq = self.by_abbreviation.get(abbreviation)?;
        self.records.get(seq)
    }

    fn insert(&mut self, exam: ExamDefinition) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_abbreviation
            .insert(exam.abbreviation.as_str().to_owned(), seq);
        self.records.insert(seq, exam);
    }

    fn contains_id(&self, id: ExamCode) -> bool {
        self.records.values().any(|exam| exam.id == id)
    }
}

/// Shared handle to the live exam catalog.
#[derive(Clone, Debug, Default)]
pub struct ExamCatalog {
    store: Arc<RwLock<ExamStore>>,
}

impl ExamCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every live exam in insertion order.
    pub async fn list_all(&self) -> Vec<ExamDefinition> {
        self.store.read().await.records.values().cloned().collect()
    }

    /// Looks an exam up by its abbreviation (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidAbbreviation`] unless `abbreviation` has exactly three
    /// characters.
    pub async fn find_by_abbreviation(
        &self,
        abbreviation: &str,
    ) -> RegistryResult<Option<ExamDefinition>> {
        check_abbreviation(abbreviation)?;
        Ok(self.store.read().await.get(abbreviation).cloned())
    }

    /// Adds a new exam and assigns it the next sequential id.
    ///
    /// The abbreviation length is checked first, then presence of `name`, `abbreviation`,
    /// `area`, `price`, `sampleType` and `parameters` (an empty parameter list counts as
    /// missing), then uniqueness of the abbreviation.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidAbbreviation`] for a missing or wrong-length abbreviation
    /// - [`RegistryError::MissingFields`] listing every absent field
    /// - [`RegistryError::DuplicateAbbreviation`] if the abbreviation is taken
    /// - [`RegistryError::ExamIdExhausted`] if no further id can be generated
    pub async fn create(&self, data: NewExam) -> RegistryResult<ExamDefinition> {
        let abbreviation = Abbreviation::new(data.abbreviation.as_deref().unwrap_or_default())
            .map_err(|_| RegistryError::InvalidAbbreviation(ABBREVIATION_LEN))?;

        let name = NonEmptyText::new(data.name.as_deref().unwrap_or_default());
        let area = NonEmptyText::new(data.area.as_deref().unwrap_or_default());
        let sample_type = NonEmptyText::new(data.sample_type.as_deref().unwrap_or_default());
        let parameters = data.parameters.filter(|p| !p.is_empty());

        let (Ok(name), Ok(area), Some(price), Ok(sample_type), Some(parameters)) =
            (&name, &area, data.price, &sample_type, &parameters)
        else {
            let missing = [
                ("name", name.is_err()),
                ("area", area.is_err()),
                ("price", data.price.is_none()),
                ("sampleType", sample_type.is_err()),
                ("parameters", parameters.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            return Err(RegistryError::MissingFields(missing));
        };

        let mut store = self.store.write().await;
        if store.get(abbreviation.as_str()).is_some() {
            tracing::debug!(abbreviation = %abbreviation, "exam rejected: duplicate abbreviation");
            return Err(RegistryError::DuplicateAbbreviation(abbreviation.to_string()));
        }

        let exam = ExamDefinition {
            id: next_exam_id(store.records.values())?,
            name: name.clone(),
            abbreviation,
            area: area.clone(),
            price,
            sample_type: sample_type.clone(),
            parameters: parameters.clone(),
        };
        store.insert(exam.clone());

        tracing::info!(exam_id = %exam.id, abbreviation = %exam.abbreviation, "exam created");
        Ok(exam)
    }

    /// Removes the exam with `abbreviation` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidAbbreviation`] for a wrong-length abbreviation and
    /// [`RegistryError::ExamNotFound`] if no exam carries it.
    pub async fn delete(&self, abbreviation: &str) -> RegistryResult<ExamDefinition> {
        check_abbreviation(abbreviation)?;

        let mut store = self.store.write().await;
        let seq = store.by_abbreviation.remove(abbreviation);
        let removed = seq
            .and_then(|seq| store.records.remove(&seq))
            .ok_or_else(|| RegistryError::ExamNotFound(abbreviation.to_string()))?;

        tracing::info!(exam_id = %removed.id, abbreviation, "exam deleted");
        Ok(removed)
    }

    /// Inserts an already-built exam, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingFields`] for an empty parameter list and a conflict if
    /// the id or abbreviation is already present.
    pub async fn restore(&self, exam: ExamDefinition) -> RegistryResult<()> {
        if exam.parameters.is_empty() {
            return Err(RegistryError::MissingFields(vec!["parameters"]));
        }

        let mut store = self.store.write().await;
        if store.contains_id(exam.id) {
            return Err(RegistryError::DuplicateExamId(exam.id.to_string()));
        }
        if store.get(exam.abbreviation.as_str()).is_some() {
            return Err(RegistryError::DuplicateAbbreviation(
                exam.abbreviation.to_string(),
            ));
        }
        store.insert(exam);
        Ok(())
    }
}

fn check_abbreviation(abbreviation: &str) -> RegistryResult<()> {
    if has_exact_length(abbreviation, ABBREVIATION_LEN) {
        Ok(())
    } else {
        Err(RegistryError::InvalidAbbreviation(ABBREVIATION_LEN))
    }
}
