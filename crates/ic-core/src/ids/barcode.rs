//! Product barcode value object.
//! 商品条形码值对象。

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard GTIN lengths: EAN-8, UPC-A, EAN-13, GTIN-14.
const GTIN_LENGTHS: [usize; 4] = [8, 12, 13, 14];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("barcode is empty")]
    Empty,
}

/// A scanned product barcode.
///
/// Any non-empty payload is a barcode: UPC-E, in-store and alphanumeric codes
/// all go to the backend, which answers "not found" for codes it does not
/// know. Surrounding whitespace is trimmed, nothing else is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    pub fn parse(raw: &str) -> Result<Self, BarcodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BarcodeError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All digits, with one of the standard GTIN lengths.
    pub fn is_gtin(&self) -> bool {
        GTIN_LENGTHS.contains(&self.0.len()) && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Whether the trailing GS1 check digit matches the payload. Always
    /// false for non-GTIN payloads.
    ///
    /// Informational only: in-store and restricted-circulation codes
    /// frequently carry a non-standard last digit.
    pub fn has_valid_check_digit(&self) -> bool {
        if !self.is_gtin() {
            return false;
        }
        let digits: Vec<u32> = self.0.bytes().map(|b| u32::from(b - b'0')).collect();
        let Some((check, payload)) = digits.split_last() else {
            return false;
        };
        // Weights alternate 3,1,3,... starting from the digit next to the check digit.
        let sum: u32 = payload
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
            .sum();
        (10 - sum % 10) % 10 == *check
    }
}

impl Display for Barcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Barcode {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Barcode {
    type Error = BarcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
