//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The digit count is wrong after stripping formatting.
    #[error("phone number must have exactly {expected} digits, got {actual}")]
    WrongLength {
        /// Expected digit count.
        expected: usize,
        /// Digits actually found.
        actual: usize,
    },
}

/// A 10-digit phone number.
///
/// Parsing strips all non-digit characters first, so `"98765 43210"` and
/// `"+91-9876543210"` are rejected or accepted purely on the remaining
/// digit count. The stored form is digits only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required digit count.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not contain exactly
    /// ten digits after formatting characters are stripped.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::DIGITS,
                actual: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the normalized digits-only form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
