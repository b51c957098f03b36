//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables,
//! which keeps behaviour consistent across multi-threaded runtimes and test harnesses.

use crate::constants::DEFAULT_LATEST_LIMIT;
use crate::{RegistryError, RegistryResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    latest_limit: usize,
    seed_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if `latest_limit` is zero.
    pub fn new(latest_limit: usize, seed_file: Option<PathBuf>) -> RegistryResult<Self> {
        if latest_limit == 0 {
            return Err(RegistryError::InvalidConfig(
                "latest limit must be greater than zero".into(),
            ));
        }

        Ok(Self {
            latest_limit,
            seed_file,
        })
    }

    /// Default number of records for the latest-registrations query.
    pub fn latest_limit(&self) -> usize {
        self.latest_limit
    }

    pub fn seed_file(&self) -> Option<&Path> {
        self.seed_file.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            latest_limit: DEFAULT_LATEST_LIMIT,
            seed_file: None,
        }
    }
}

/// Parse the latest-registrations limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_LATEST_LIMIT`].
///
/// # Errors
///
/// Returns [`RegistryError::InvalidConfig`] if the value is not a positive integer.
pub fn latest_limit_from_env_value(value: Option<String>) -> RegistryResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_LATEST_LIMIT),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(RegistryError::InvalidConfig(format!(
                "LAB_LATEST_LIMIT must be a positive integer, got '{v}'"
            ))),
        },
    }
}

/// Parse the optional seed-file path. Empty values mean "no seed file".
pub fn seed_file_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
