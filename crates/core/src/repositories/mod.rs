//! In-memory record stores.
//!
//! Each store owns one collection and is the only code allowed to mutate it. Handles are cheap
//! to clone and share a single lock-protected collection.

pub mod exams;
pub mod patients;

pub use exams::ExamCatalog;
pub use patients::PatientRegistry;
