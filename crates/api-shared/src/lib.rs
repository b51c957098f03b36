//! # API Shared
//!
//! Shared wire definitions for the laboratory APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module), with OpenAPI schemas
//! - The `{error, detalle}` error body rendered for every failed request
//! - Shared services like `HealthService`
//!
//! Used by `lab-core` (conversions to and from domain records) and `api-rest`.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
