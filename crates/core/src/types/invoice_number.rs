//! Invoice numbers of the form `INV-<year>-<seq>`.
//!
//! Sequences restart every calendar year and are zero-padded to four digits
//! (`INV-2026-0001`). Sequences past 9999 keep growing without truncation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every generated invoice number.
pub const INVOICE_PREFIX: &str = "INV";

/// Minimum width of the zero-padded sequence.
const SEQUENCE_WIDTH: usize = 4;

/// Errors that can occur when parsing an [`InvoiceNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceNumberError {
    /// The input does not follow `INV-<year>-<seq>`.
    #[error("invoice number must look like INV-<year>-<seq>, got {0:?}")]
    Malformed(String),
}

/// A parsed `INV-<year>-<seq>` invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    year: i32,
    sequence: u32,
}

impl InvoiceNumber {
    /// Create an invoice number from its parts.
    #[must_use]
    pub const fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// The year component.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The per-year sequence component.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Parse an invoice number.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceNumberError::Malformed`] unless the input is the
    /// prefix `INV`, a numeric year, and a numeric sequence joined by `-`.
    pub fn parse(s: &str) -> Result<Self, InvoiceNumberError> {
        let malformed = || InvoiceNumberError::Malformed(s.to_owned());

        let mut parts = s.split('-');
        let (Some(prefix), Some(year), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        if prefix != INVOICE_PREFIX
            || year.is_empty()
            || sequence.is_empty()
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        Ok(Self {
            year: year.parse().map_err(|_| malformed())?,
            sequence: sequence.parse().map_err(|_| malformed())?,
        })
    }

    /// The number that follows the highest existing number for `year`.
    ///
    /// Numbers from other years are ignored. The first number of a year has
    /// sequence 1. Returns `None` once the year's sequence is exhausted.
    #[must_use]
    pub fn next_for_year<I>(year: i32, existing: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let max = existing
            .into_iter()
            .filter(|number| number.year == year)
            .map(|number| number.sequence)
            .max()
            .unwrap_or(0);

        max.checked_add(1).map(|sequence| Self::new(year, sequence))
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{INVOICE_PREFIX}-{}-{:0width$}",
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl std::str::FromStr for InvoiceNumber {
    type Err = InvoiceNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = InvoiceNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_sequence() {
        assert_eq!(InvoiceNumber::new(2026, 7).to_string(), "INV-2026-0007");
        assert_eq!(InvoiceNumber::new(2026, 12345).to_string(), "INV-2026-12345");
    }

    #[test]
    fn test_parse() {
        let number = InvoiceNumber::parse("INV-2025-0042").unwrap();
        assert_eq!(number.year(), 2025);
        assert_eq!(number.sequence(), 42);

        for bad in [
            "",
            "INV-2025",
            "INV-2025-",
            "INV--0001",
            "ABC-2025-0001",
            "INV-2025-00a1",
            "INV-2025-0001-x",
        ] {
            assert!(InvoiceNumber::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_next_for_empty_year_starts_at_one() {
        let next = InvoiceNumber::next_for_year(2026, [InvoiceNumber::new(2025, 99)]).unwrap();
        assert_eq!(next.to_string(), "INV-2026-0001");
    }

    #[test]
    fn test_next_takes_max_not_count() {
        let existing = ["INV-2026-0003", "INV-2026-0010", "INV-2027-0500", "INV-2026-0002"]
            .into_iter()
            .map(|raw| InvoiceNumber::parse(raw).unwrap());
        let next = InvoiceNumber::next_for_year(2026, existing).unwrap();
        assert_eq!(next.to_string(), "INV-2026-0011");
    }

    #[test]
    fn test_next_exhausted_sequence_is_none() {
        let existing = [InvoiceNumber::new(2026, u32::MAX)];
        assert!(InvoiceNumber::next_for_year(2026, existing).is_none());
        assert!(InvoiceNumber::next_for_year(2027, existing).is_some());
    }
}
