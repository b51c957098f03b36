//! Exam request handling.

use crate::error::{RegistryError, RegistryResult};
use crate::exam::{ExamDefinition, NewExam};
use crate::repositories::ExamCatalog;

/// Service for exam requests.
#[derive(Clone, Debug, Default)]
pub struct ExamService {
    catalog: ExamCatalog,
}

impl ExamService {
    pub fn new(catalog: ExamCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ExamCatalog {
        &self.catalog
    }

    pub async fn list_all(&self) -> Vec<ExamDefinition> {
        self.catalog.list_all().await
    }

    /// Finds an exam by abbreviation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidAbbreviation`] unless the abbreviation has three
    /// characters and [`RegistryError::ExamNotFound`] if no exam carries it.
    pub async fn find(&self, abbreviation: &str) -> RegistryResult<ExamDefinition> {
        self.catalog
            .find_by_abbreviation(abbreviation)
            .await
            .and_then(|found| {
                found.ok_or_else(|| RegistryError::ExamNotFound(abbreviation.to_string()))
            })
            .inspect_err(log_rejection)
    }

    /// Adds an exam to the catalog. All checks are the catalog's own.
    pub async fn create(&self, data: NewExam) -> RegistryResult<ExamDefinition> {
        self.catalog.create(data).await.inspect_err(log_rejection)
    }

    /// Removes an exam and returns it.
    pub async fn delete(&self, abbreviation: &str) -> RegistryResult<ExamDefinition> {
        self.catalog
            .delete(abbreviation)
            .await
            .inspect_err(log_rejection)
    }
}

fn log_rejection(err: &RegistryError) {
    tracing::debug!(error = %err, label = err.label(), "exam request rejected");
}
