//! Station abbreviation type.

use std::fmt;

/// Error returned when parsing an invalid station abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station abbreviation: {reason}")]
pub struct InvalidStationAbbr {
    reason: &'static str,
}

/// A valid station abbreviation, the primary key of a station.
///
/// Abbreviations are 2 to 4 uppercase ASCII letters or digits
/// (`MONT`, `12TH`, `SFIA`). This type guarantees that any `StationAbbr`
/// value is valid by construction, and it is `Copy` so it can be used
/// freely as a map key and identity.
///
/// # Examples
///
/// ```
/// use train_tracker::domain::StationAbbr;
///
/// let mont = StationAbbr::parse("MONT").unwrap();
/// assert_eq!(mont.as_str(), "MONT");
///
/// // Digits are allowed
/// assert!(StationAbbr::parse("12TH").is_ok());
///
/// // Lowercase is rejected (use `parse_normalized` for user input)
/// assert!(StationAbbr::parse("mont").is_err());
///
/// // Wrong length is rejected
/// assert!(StationAbbr::parse("M").is_err());
/// assert!(StationAbbr::parse("MONTG").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationAbbr {
    bytes: [u8; 4],
    len: u8,
}

impl StationAbbr {
    /// Parse an abbreviation from a string.
    ///
    /// The input must be 2 to 4 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStationAbbr> {
        let bytes = s.as_bytes();

        if !(2..=4).contains(&bytes.len()) {
            return Err(InvalidStationAbbr {
                reason: "must be 2 to 4 characters",
            });
        }

        let mut buf = [0u8; 4];
        for (slot, &b) in buf.iter_mut().zip(bytes) {
            if !(b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(InvalidStationAbbr {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
            *slot = b;
        }

        Ok(StationAbbr {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    /// Parse an abbreviation after trimming and upper-casing the input.
    ///
    /// The upstream feed and user input are not always consistent about
    /// case; this is the entry point for both.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationAbbr> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the abbreviation as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored, so this cannot fail.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Debug for StationAbbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationAbbr({})", self.as_str())
    }
}

impl fmt::Display for StationAbbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the input
        #[test]
        fn roundtrip(s in "[A-Z0-9]{2,4}") {
            let abbr = StationAbbr::parse(&s).unwrap();
            prop_assert_eq!(abbr.as_str(), s.as_str());
        }

        /// Lowercase letters are always rejected by the strict parser
        #[test]
        fn lowercase_rejected(s in "[a-z]{2,4}") {
            prop_assert!(StationAbbr::parse(&s).is_err());
        }

        /// The normalizing parser accepts any case
        #[test]
        fn normalized_accepts_lowercase(s in "[a-z0-9]{2,4}") {
            let abbr = StationAbbr::parse_normalized(&s).unwrap();
            prop_assert_eq!(abbr.as_str(), s.to_ascii_uppercase());
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn wrong_length_rejected(s in "[A-Z]{0,1}|[A-Z]{5,10}") {
            prop_assert!(StationAbbr::parse(&s).is_err());
        }
    }
}
