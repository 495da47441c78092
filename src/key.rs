//! Access key validation.
//!
//! Every DANFE is identified by a 44 digit access key. The [`AccessKey`]
//! newtype guarantees that any key flowing through the resolver, the store or
//! the remote gateway has already been validated, so downstream code never
//! re-checks the format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Number of digits in a DANFE access key.
pub const ACCESS_KEY_LENGTH: usize = 44;

/// A validated DANFE access key.
///
/// Construction goes through [`AccessKey::parse`], which enforces the
/// 44-digit format. Once built, the key is immutable and can be used as a
/// map key or serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessKey(String);

impl AccessKey {
    /// Validates a raw string and wraps it as an access key.
    ///
    /// # Arguments
    /// * `raw` - Candidate key, exactly 44 ASCII digits
    ///
    /// # Returns
    /// * `Ok(AccessKey)` if the input is a well-formed key
    /// * `Err(ValidationError)` describing the first rule that failed
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let length = raw.chars().count();
        if length != ACCESS_KEY_LENGTH {
            return Err(ValidationError::WrongLength { length });
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::NonNumeric);
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccessKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Deserialization re-validates so a key coming off the wire or out of a
// persisted record carries the same guarantee as one built in process.
impl<'de> Deserialize<'de> for AccessKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        AccessKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
