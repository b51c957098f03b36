//! # Lab Core
//!
//! Core business logic for the laboratory back office.
//!
//! This crate owns the live patient and exam collections and every rule that guards them:
//! - Stateless validators for national ids, dates, emails and phone numbers
//! - Sequential exam id generation (`ex-001`, `ex-002`, ...)
//! - [`PatientRegistry`] and [`ExamCatalog`], the only writers of their collections
//! - [`PatientService`] and [`ExamService`], the request-facing checks in front of them
//! - Startup configuration and seed-file loading
//!
//! **No API concerns**: HTTP servers, routing and response rendering belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod exam;
pub mod patient;
pub mod repositories;
pub mod seed;
pub mod services;
pub mod validation;

pub use config::CoreConfig;
pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use exam::{next_exam_id, Abbreviation, ExamCode, ExamDefinition, NewExam};
pub use lab_types::{FixedText, NonEmptyText, TextError};
pub use patient::{NewPatient, PatientId, PatientPatch, PatientRecord};
pub use repositories::{ExamCatalog, PatientRegistry};
pub use seed::{load_seed_file, read_seed_file, SeedData, SeedReport};
pub use services::{ExamService, PatientService};
pub use validation::NationalIdPolicy;
