//! Payment card form value types.
//!
//! These are format validators only - no Luhn check, no issuer lookup. The
//! actual charge is delegated to an external payment service; the checkout
//! wizard only needs to reject obviously malformed input before submission.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing card form values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    /// The input string is empty.
    #[error("{field} cannot be empty")]
    Empty {
        /// Which card field was empty.
        field: &'static str,
    },
    /// The card number is not sixteen digits after stripping spaces.
    #[error("card number must be {expected} digits")]
    InvalidNumber {
        /// Expected digit count.
        expected: usize,
    },
    /// The expiry does not normalize to `MM/YY`.
    #[error("expiry must be in MM/YY format")]
    InvalidExpiry,
    /// The CVC is too short or contains non-digits.
    #[error("CVC must be at least {min} digits")]
    InvalidCvc {
        /// Minimum digit count.
        min: usize,
    },
}

/// A 16-digit card number, stored without separators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Required digit count.
    pub const DIGITS: usize = 16;

    /// Parse a card number, stripping spaces first.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or is not exactly sixteen
    /// digits once spaces are removed.
    pub fn parse(s: &str) -> Result<Self, CardError> {
        if s.trim().is_empty() {
            return Err(CardError::Empty {
                field: "card number",
            });
        }

        let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != Self::DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardError::InvalidNumber {
                expected: Self::DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the digits-only card number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits, for display and receipts.
    #[must_use]
    pub fn last_four(&self) -> &str {
        self.0.get(Self::DIGITS - 4..).unwrap_or(&self.0)
    }
}

/// A card expiry in canonical `MM/YY` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CardExpiry(String);

impl CardExpiry {
    /// Parse an expiry, accepting `MM/YY` or `MMYY` input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, does not normalize to five
    /// characters including the slash, or the month is out of range.
    pub fn parse(s: &str) -> Result<Self, CardError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CardError::Empty { field: "expiry" });
        }

        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 4 {
            return Err(CardError::InvalidExpiry);
        }

        let (month_str, year_str) = digits.split_at(2);
        let month: u8 = month_str.parse().map_err(|_| CardError::InvalidExpiry)?;
        if !(1..=12).contains(&month) {
            return Err(CardError::InvalidExpiry);
        }

        Ok(Self(format!("{month_str}/{year_str}")))
    }

    /// Returns the canonical `MM/YY` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card verification code of at least three digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CardCvc(String);

impl CardCvc {
    /// Minimum digit count.
    pub const MIN_DIGITS: usize = 3;

    /// Parse a CVC.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, shorter than three
    /// characters, or contains non-digits.
    pub fn parse(s: &str) -> Result<Self, CardError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CardError::Empty { field: "CVC" });
        }

        if s.len() < Self::MIN_DIGITS || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardError::InvalidCvc {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the CVC as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_strips_spaces() {
        let number = CardNumber::parse("4111 1111 1111 1111").unwrap();
        assert_eq!(number.as_str(), "4111111111111111");
        assert_eq!(number.last_four(), "1111");
    }

    #[test]
    fn test_card_number_rejects_short_and_long() {
        assert!(matches!(
            CardNumber::parse("4111 1111 1111"),
            Err(CardError::InvalidNumber { expected: 16 })
        ));
        assert!(matches!(
            CardNumber::parse("4111 1111 1111 1111 1"),
            Err(CardError::InvalidNumber { expected: 16 })
        ));
    }

    #[test]
    fn test_card_number_rejects_letters() {
        assert!(CardNumber::parse("4111 1111 1111 111a").is_err());
    }

    #[test]
    fn test_card_number_empty() {
        assert!(matches!(
            CardNumber::parse("  "),
            Err(CardError::Empty { field: "card number" })
        ));
    }

    #[test]
    fn test_expiry_normalizes() {
        assert_eq!(CardExpiry::parse("12/28").unwrap().as_str(), "12/28");
        assert_eq!(CardExpiry::parse("1228").unwrap().as_str(), "12/28");
        assert_eq!(CardExpiry::parse("01/30").unwrap().as_str(), "01/30");
    }

    #[test]
    fn test_expiry_rejects_bad_month() {
        assert!(matches!(
            CardExpiry::parse("13/28"),
            Err(CardError::InvalidExpiry)
        ));
        assert!(matches!(
            CardExpiry::parse("00/28"),
            Err(CardError::InvalidExpiry)
        ));
    }

    #[test]
    fn test_expiry_rejects_wrong_length() {
        assert!(CardExpiry::parse("1/28").is_err());
        assert!(CardExpiry::parse("12/283").is_err());
    }

    #[test]
    fn test_cvc_accepts_three_or_more_digits() {
        assert!(CardCvc::parse("123").is_ok());
        assert!(CardCvc::parse("1234").is_ok());
    }

    #[test]
    fn test_cvc_rejects_short_or_non_digit() {
        assert!(matches!(
            CardCvc::parse("12"),
            Err(CardError::InvalidCvc { min: 3 })
        ));
        assert!(CardCvc::parse("12a").is_err());
    }
}
