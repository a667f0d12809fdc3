/// Document identity utilities.
///
/// Identities are 12 bytes rendered as 24 hex characters. Lookups that accept
/// either an identity or a human-readable name classify their input with
/// [`LookupKey::classify`].
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

const ID_BYTES: usize = 12;

/// Store-assigned, immutable document identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; ID_BYTES]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a 24-character hexadecimal identity")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    /// Generate a fresh identity. The leading bytes are a millisecond
    /// timestamp, so identities created later sort later.
    pub fn new() -> Self {
        let uuid = Uuid::now_v7();
        let mut bytes = [0u8; ID_BYTES];
        bytes.copy_from_slice(&uuid.as_bytes()[..ID_BYTES]);
        Self(bytes)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How a dual-key lookup resolves its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Input had identity shape; look up by identity only.
    Id(ObjectId),
    /// Anything else; look up by the entity's human-readable name.
    Name(String),
}

impl LookupKey {
    /// Classify lookup input. There is no fallback: an identity-shaped input
    /// that resolves to nothing is not retried as a name.
    pub fn classify(input: &str) -> Self {
        match input.parse::<ObjectId>() {
            Ok(id) => LookupKey::Id(id),
            Err(_) => LookupKey::Name(input.to_string()),
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self, LookupKey::Id(_))
    }
}
