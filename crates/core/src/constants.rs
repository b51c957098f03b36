//! Constants used throughout the lab core crate.
//!
//! Format rules, lengths and defaults live here so the validators, registries and
//! boundary services agree on them.

/// Identity-document prefixes accepted by the registries (nationals and foreigners).
pub const REGISTRY_NATIONAL_ID_PREFIXES: &[u8] = b"VE";

/// Identity-document prefixes accepted at the request boundary.
pub const BOUNDARY_NATIONAL_ID_PREFIXES: &[u8] = b"V";

/// Minimum number of digits after the national-id prefix.
pub const NATIONAL_ID_MIN_DIGITS: usize = 6;

/// Maximum number of digits after the national-id prefix.
pub const NATIONAL_ID_MAX_DIGITS: usize = 8;

/// Mobile carrier prefixes recognised in phone numbers.
pub const MOBILE_PREFIXES: &[&str] = &["0414", "0424", "0412", "0422", "0416", "0426"];

/// Number of subscriber digits after the carrier or area-code prefix.
pub const PHONE_SUBSCRIBER_DIGITS: usize = 7;

/// Length of the short patient-id prefix accepted by the find-by-id lookup.
pub const PATIENT_ID_PREFIX_LEN: usize = 5;

/// Length of an exam abbreviation.
pub const ABBREVIATION_LEN: usize = 3;

/// Prefix of every generated exam id.
pub const EXAM_ID_PREFIX: &str = "ex-";

/// Minimum zero-padded width of the exam id sequence.
pub const EXAM_ID_WIDTH: usize = 3;

/// Default number of records returned by the latest-registrations query.
pub const DEFAULT_LATEST_LIMIT: usize = 5;

/// Calendar date layout used for birth and registration dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
