//! Postal pincode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input string is empty.
    #[error("pincode cannot be empty")]
    Empty,
    /// The input is not exactly six digits.
    #[error("pincode must be exactly {expected} digits")]
    Invalid {
        /// Expected digit count.
        expected: usize,
    },
}

/// A 6-digit postal pincode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Required digit count.
    pub const DIGITS: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or is not exactly six
    /// ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PincodeError::Empty);
        }

        if s.len() != Self::DIGITS || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PincodeError::Invalid {
                expected: Self::DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
