use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Prefix used by SMPTE documents when a UUID is written as a URN.
const URN_PREFIX: &str = "urn:uuid:";

/// Length of the hyphenated 8-4-4-4-12 textual form.
const HYPHENATED_LEN: usize = 36;

/// Byte offsets of the four hyphens in the hyphenated form.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Decode the hyphenated 8-4-4-4-12 hex form of a UUID.
///
/// Hex digits are accepted in either case. Surrounding whitespace and a
/// leading `urn:uuid:` (any case) are ignored. The simple, braced and other
/// relaxed forms are rejected.
fn parse_hyphenated(text: &str) -> Result<Uuid, TypeError> {
    let invalid = |reason: &str| TypeError::InvalidUuid {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let mut s = text.trim();
    if s.len() >= URN_PREFIX.len()
        && s.is_char_boundary(URN_PREFIX.len())
        && s[..URN_PREFIX.len()].eq_ignore_ascii_case(URN_PREFIX)
    {
        s = &s[URN_PREFIX.len()..];
    }

    if s.is_empty() {
        return Err(invalid("empty"));
    }
    if s.len() != HYPHENATED_LEN {
        return Err(invalid("expected 8-4-4-4-12 hyphenated hex"));
    }
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        let hyphen_slot = HYPHEN_POSITIONS.contains(&i);
        if hyphen_slot && *b != b'-' {
            return Err(invalid("expected '-' separator"));
        }
        if !hyphen_slot && !b.is_ascii_hexdigit() {
            return Err(invalid("non-hex digit"));
        }
    }

    Uuid::try_parse(s).map_err(|e| invalid(&e.to_string()))
}

/// Identifier of an asset listed in an Asset Map.
///
/// Stored as the 16 raw bytes of the UUID. Displays as lowercase
/// hyphenated hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(Uuid);

impl AssetId {
    /// Decode from the hyphenated textual form (case-insensitive).
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        parse_hyphenated(text).map(Self)
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from the 16 raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The 16 raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short representation (first 8 hex characters).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AssetId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_string()
    }
}

/// Identifier of a Composition Playlist (the package identifier).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositionId(Uuid);

impl CompositionId {
    /// Decode from the hyphenated textual form (case-insensitive).
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        parse_hyphenated(text).map(Self)
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The 16 raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// A CPL is itself an asset of its package; this is its id in the Asset Map.
    pub fn as_asset_id(&self) -> AssetId {
        AssetId(self.0)
    }

    /// Short representation (first 8 hex characters).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl fmt::Debug for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositionId({})", self.0)
    }
}

impl fmt::Display for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CompositionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompositionId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompositionId> for String {
    fn from(id: CompositionId) -> Self {
        id.to_string()
    }
}
