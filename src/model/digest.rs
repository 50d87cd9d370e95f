//! Checksum value produced by a leaf hash or by aggregating nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A checksum of arbitrary length
///
/// The length is set by the hash algorithm that produced it (32 bytes for
/// both built-in algorithms). Serializes as a lowercase hex string.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest(Vec<u8>);

impl Digest {
    /// Wrap raw checksum bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Digest(bytes.into())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the checksum
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.trim())?;
        if bytes.is_empty() {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        Ok(Digest(bytes))
    }

    /// Get a short prefix for display (first 7 chars, like git)
    pub fn short(&self) -> String {
        let hex = self.to_hex();
        hex[..hex.len().min(7)].to_string()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Digest::from_hex(&s)
    }
}
