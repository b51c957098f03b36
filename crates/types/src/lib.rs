//! # Lab Types
//!
//! Validated text primitives shared by the laboratory crates.
//!
//! Values of these types can only be built through their checked constructors, so any
//! record holding one can rely on the guarantee without re-validating.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text did not have the required number of characters
    #[error("Text must be exactly {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A string of exactly `N` characters (Unicode scalar values, not bytes).
///
/// Unlike [`NonEmptyText`] the input is kept verbatim: no trimming and no case folding.
/// Whitespace counts towards the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize>(String);

impl<const N: usize> FixedText<N> {
    /// Creates a new `FixedText` if `input` has exactly `N` characters.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Length`] carrying the expected and actual character counts.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        let actual = input.chars().count();
        if actual != N {
            return Err(TextError::Length {
                expected: N,
                actual,
            });
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> std::fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> AsRef<str> for FixedText<N> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> serde::Serialize for FixedText<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, const N: usize> serde::Deserialize<'de> for FixedText<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FixedText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Maria  ").expect("should accept padded text");
        assert_eq!(text.as_str(), "Maria");
    }

    #[test]
    fn non_empty_text_rejects_whitespace_only() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
        assert_eq!(NonEmptyText::new("").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn fixed_text_counts_characters_not_bytes() {
        let text = FixedText::<3>::new("ÑAB").expect("three characters");
        assert_eq!(text.as_str(), "ÑAB");
    }

    #[test]
    fn fixed_text_reports_actual_length() {
        let err = FixedText::<3>::new("GLUC").unwrap_err();
        assert_eq!(
            err,
            TextError::Length {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn fixed_text_keeps_input_verbatim() {
        let text = FixedText::<3>::new("gl ").expect("whitespace counts");
        assert_eq!(text.as_str(), "gl ");
    }

    #[test]
    fn deserialize_rejects_invalid_values() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("empty"));

        let err = serde_json::from_str::<FixedText<3>>("\"HB\"").unwrap_err();
        assert!(err.to_string().contains("exactly 3"));
    }
}
