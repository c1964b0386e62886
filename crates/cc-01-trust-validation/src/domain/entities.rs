//! # Domain Entities
//!
//! Serial references and validated chain summaries.

use super::errors::TrustError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized certificate serial: lower-case hex of the magnitude bytes,
/// without leading zero bytes.
///
/// This is the key of the signer certificate table, and the form in which
/// detached signatures reference their certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateSerial(String);

impl CertificateSerial {
    /// Build from the big-endian serial bytes of a certificate.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let magnitude = &bytes[first..];
        if magnitude.is_empty() {
            return Self("00".to_string());
        }
        Self(hex::encode(magnitude))
    }

    /// Parse a hex reference. Accepts an optional `0x` prefix, `:` separators
    /// and either case.
    pub fn parse(reference: &str) -> Result<Self, TrustError> {
        let trimmed = reference.trim();
        let digits: String = trimmed
            .strip_prefix("0x")
            .unwrap_or(trimmed)
            .chars()
            .filter(|c| *c != ':')
            .collect();
        if digits.is_empty() {
            return Err(TrustError::InvalidSerial(reference.to_string()));
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits
        };
        let bytes =
            hex::decode(&padded).map_err(|_| TrustError::InvalidSerial(reference.to_string()))?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Parse a decimal serial, as written in `X509SerialNumber`.
    pub fn from_decimal(decimal: &str) -> Result<Self, TrustError> {
        let decimal = decimal.trim();
        if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TrustError::InvalidSerial(decimal.to_string()));
        }

        // Big-endian magnitude, multiplied by ten per digit.
        let mut bytes: Vec<u8> = Vec::new();
        for digit in decimal.bytes().map(|b| b - b'0') {
            let mut carry = u16::from(digit);
            for byte in bytes.iter_mut().rev() {
                let value = u16::from(*byte) * 10 + carry;
                *byte = (value & 0xff) as u8;
                carry = value >> 8;
            }
            if carry > 0 {
                bytes.insert(0, carry as u8);
            }
        }
        Ok(Self::from_bytes(&bytes))
    }

    /// Decimal form of the serial.
    #[must_use]
    pub fn to_decimal(&self) -> String {
        let mut magnitude = self.to_bytes();
        let mut digits = Vec::new();

        while magnitude.iter().any(|b| *b != 0) {
            let mut remainder = 0u16;
            for byte in &mut magnitude {
                let value = (remainder << 8) | u16::from(*byte);
                *byte = (value / 10) as u8;
                remainder = value % 10;
            }
            digits.push(b'0' + remainder as u8);
        }

        if digits.is_empty() {
            return "0".to_string();
        }
        digits.iter().rev().map(|d| char::from(*d)).collect()
    }

    /// Big-endian magnitude bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        hex::decode(&self.0).unwrap_or_default()
    }

    /// The normalized hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CertificateSerial {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CertificateSerial {
    type Error = TrustError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CertificateSerial> for String {
    fn from(serial: CertificateSerial) -> Self {
        serial.0
    }
}

/// Summary of an accepted certification path, leaf first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    /// Serials from the leaf up to and including the trust anchor.
    pub serials: Vec<CertificateSerial>,
    /// Subject of the trust anchor the path ends at.
    pub anchor_subject: String,
}

impl ValidatedChain {
    /// Number of certificates on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serials.len()
    }

    /// True if the path is empty (never the case for an accepted path).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }

    /// Serial of the leaf.
    #[must_use]
    pub fn leaf(&self) -> Option<&CertificateSerial> {
        self.serials.first()
    }
}
