//! Request-facing services.
//!
//! These sit between a transport (REST handler, CLI) and the registries. They repeat the cheap
//! shape checks up front so that malformed requests are rejected with request-shaped errors,
//! and turn "nothing there" outcomes into [`RegistryError`](crate::RegistryError) values with a
//! not-found classification. Business rules stay in the registries.

pub mod exams;
pub mod patients;

pub use exams::ExamService;
pub use patients::PatientService;
