//! The 128-bit content digest.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// XXH3-128 digest of a file's bytes.
///
/// Rendered as 32 lowercase hex characters, which is also how it is
/// stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(u128);

impl ContentDigest {
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Error returned when a string is not a 32-character hex digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDigestError(String);

impl fmt::Display for ParseDigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a 128-bit hex digest: {:?}", self.0)
    }
}

impl std::error::Error for ParseDigestError {}

impl FromStr for ContentDigest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseDigestError(s.to_string()));
        }
        u128::from_str_radix(s, 16)
            .map(ContentDigest)
            .map_err(|_| ParseDigestError(s.to_string()))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_zero_padded_to_32_chars() {
        let digest = ContentDigest::new(0xabc);
        assert_eq!(digest.to_hex().len(), 32);
        assert!(digest.to_hex().ends_with("abc"));
        assert!(digest.to_hex().starts_with("0000"));
    }

    #[test]
    fn parses_its_own_hex() {
        let digest = ContentDigest::new(u128::MAX - 7);
        let parsed: ContentDigest = digest.to_hex().parse().unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn rejects_short_or_non_hex_strings() {
        assert!("abc".parse::<ContentDigest>().is_err());
        assert!("zz".repeat(16).parse::<ContentDigest>().is_err());
    }
}
