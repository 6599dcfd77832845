//! Engineer's Line Reference (ELR) code type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid ELR code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ELR code: {reason}")]
pub struct InvalidElr {
    reason: &'static str,
}

/// A valid ELR code: three uppercase ASCII letters, optionally followed by a
/// single digit (e.g. "NBK", "ECM8").
///
/// Codes are case-sensitive. Any `Elr` value is valid by construction.
///
/// # Examples
///
/// ```
/// use elr_geocoder::domain::Elr;
///
/// let ecm8 = Elr::parse("ECM8").unwrap();
/// assert_eq!(ecm8.as_str(), "ECM8");
///
/// assert!(Elr::parse("ecm8").is_err());
/// assert!(Elr::parse("EC8M").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Elr {
    bytes: [u8; 4],
    len: u8,
}

impl Elr {
    /// Parse an ELR code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidElr> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 && bytes.len() != 4 {
            return Err(InvalidElr {
                reason: "must be 3 or 4 characters",
            });
        }

        if !bytes[..3].iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidElr {
                reason: "must start with three uppercase ASCII letters A-Z",
            });
        }

        let mut code = [0u8; 4];
        code[..3].copy_from_slice(&bytes[..3]);

        if let Some(&suffix) = bytes.get(3) {
            if !suffix.is_ascii_digit() {
                return Err(InvalidElr {
                    reason: "optional fourth character must be a digit",
                });
            }
            code[3] = suffix;
        }

        Ok(Elr {
            bytes: code,
            len: bytes.len() as u8,
        })
    }

    /// Returns the ELR code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters and digits
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Debug for Elr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Elr({})", self.as_str())
    }
}

impl fmt::Display for Elr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Elr {
    type Err = InvalidElr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Elr::parse(s)
    }
}

impl Serialize for Elr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Elr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Elr::parse(&s).map_err(serde::de::Error::custom)
    }
}
