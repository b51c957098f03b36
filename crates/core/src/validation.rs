//! Input validation utilities.
//!
//! Stateless predicates over raw strings. Every function is total: it never panics and never
//! allocates an error, it only answers whether the input is acceptable. Callers decide which
//! [`RegistryError`](crate::RegistryError) to report.

use crate::constants::{
    BOUNDARY_NATIONAL_ID_PREFIXES, DATE_FORMAT, MOBILE_PREFIXES, NATIONAL_ID_MAX_DIGITS,
    NATIONAL_ID_MIN_DIGITS, PHONE_SUBSCRIBER_DIGITS, REGISTRY_NATIONAL_ID_PREFIXES,
};
use chrono::NaiveDate;

/// Which set of identity-document prefixes a national id is checked against.
///
/// The request boundary only admits `V-` documents while the registries also admit `E-`
/// (foreign residents). Records restored from seed data, or written by a trusted caller
/// that bypasses the boundary, may therefore carry an `E-` prefix that the REST lookups
/// will refuse. Both checks are kept on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationalIdPolicy {
    /// `[VE]-` followed by 6 to 8 digits.
    Registry,
    /// `V-` followed by 6 to 8 digits.
    Boundary,
}

impl NationalIdPolicy {
    fn prefixes(self) -> &'static [u8] {
        match self {
            NationalIdPolicy::Registry => REGISTRY_NATIONAL_ID_PREFIXES,
            NationalIdPolicy::Boundary => BOUNDARY_NATIONAL_ID_PREFIXES,
        }
    }

    /// Example shown to users when a national id is rejected.
    pub fn example(self) -> &'static str {
        match self {
            NationalIdPolicy::Registry => "V-12345678 or E-12345678 (6-8 digits)",
            NationalIdPolicy::Boundary => "V-12345678 (6-8 digits)",
        }
    }
}

/// Returns true if `s` is a national id under the registry policy (`^[VE]-\d{6,8}$`).
pub fn is_valid_national_id(s: &str) -> bool {
    national_id_matches(s, NationalIdPolicy::Registry)
}

/// Returns true if `s` is a national id under the stricter boundary policy (`^V-\d{6,8}$`).
pub fn is_valid_boundary_national_id(s: &str) -> bool {
    national_id_matches(s, NationalIdPolicy::Boundary)
}

/// Returns true if `s` satisfies the given national-id policy.
pub fn national_id_matches(s: &str, policy: NationalIdPolicy) -> bool {
    let bytes = s.as_bytes();
    let [prefix, b'-', digits @ ..] = bytes else {
        return false;
    };

    policy.prefixes().contains(prefix)
        && (NATIONAL_ID_MIN_DIGITS..=NATIONAL_ID_MAX_DIGITS).contains(&digits.len())
        && digits.iter().all(u8::is_ascii_digit)
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// The shape is checked before parsing so that unpadded forms such as `2024-1-5` are refused,
/// and chrono rejects out-of-range days and months (`2024-02-30`, `2024-13-40`) instead of
/// rolling them over.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let shape_ok = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Returns true if `s` is a well-formed, real calendar date.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Returns true if `s` is empty or looks like `local@domain.tld`.
///
/// Equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`: no whitespace anywhere, exactly one `@` with a
/// non-empty local part, and a domain containing a dot that is neither its first nor its
/// last character.
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Returns true if `s` is a Venezuelan phone number.
///
/// Accepted: a mobile carrier prefix (see [`MOBILE_PREFIXES`]) or a `02xx` landline area
/// code, an optional `-` or space, then exactly seven digits.
pub fn is_valid_phone(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 4 {
        return false;
    }
    let (prefix, rest) = bytes.split_at(4);

    let is_mobile = MOBILE_PREFIXES.iter().any(|p| p.as_bytes() == prefix);
    let is_landline =
        prefix[0] == b'0' && prefix[1] == b'2' && prefix[2..].iter().all(u8::is_ascii_digit);
    if !is_mobile && !is_landline {
        return false;
    }

    let subscriber = match rest {
        [b'-' | b' ', tail @ ..] => tail,
        _ => rest,
    };
    subscriber.len() == PHONE_SUBSCRIBER_DIGITS && subscriber.iter().all(u8::is_ascii_digit)
}

/// Returns true if `s` has exactly `len` characters.
pub fn has_exact_length(s: &str, len: usize) -> bool {
    s.chars().count() == len
}
