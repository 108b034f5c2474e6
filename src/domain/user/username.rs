//! Username value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::DomainFieldError;

const FIELD: &str = "username";

/// Validated login name.
///
/// Rules:
/// - between [`Username::MIN_LEN`] and [`Username::MAX_LEN`] characters
/// - starts and ends with an ASCII letter or digit
/// - may contain `.`, `_` and `-` as separators, never two in a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 5;
    pub const MAX_LEN: usize = 20;

    /// Validates and wraps a username.
    ///
    /// # Errors
    ///
    /// Returns `DomainFieldError` when the value breaks any rule above.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainFieldError> {
        let value = value.into();
        let len = value.chars().count();

        if len == 0 {
            return Err(DomainFieldError::empty_field(FIELD));
        }
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(DomainFieldError::invalid_length(
                FIELD,
                Self::MIN_LEN,
                Self::MAX_LEN,
                len,
            ));
        }

        let bytes = value.as_bytes();
        if !bytes[0].is_ascii_alphanumeric() {
            return Err(DomainFieldError::invalid_format(
                FIELD,
                "must start with a letter or digit",
            ));
        }
        if !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
            return Err(DomainFieldError::invalid_format(
                FIELD,
                "must end with a letter or digit",
            ));
        }

        let mut previous_was_separator = false;
        for c in value.chars() {
            let is_separator = matches!(c, '.' | '_' | '-');
            if !is_separator && !c.is_ascii_alphanumeric() {
                return Err(DomainFieldError::invalid_format(
                    FIELD,
                    format!("character '{}' is not allowed", c),
                ));
            }
            if is_separator && previous_was_separator {
                return Err(DomainFieldError::invalid_format(
                    FIELD,
                    "separators cannot be consecutive",
                ));
            }
            previous_was_separator = is_separator;
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}
