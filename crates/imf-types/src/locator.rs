use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::AssetId;

/// An asset id paired with the absolute location of its (first) chunk.
///
/// Immutable once built: fields are only reachable through accessors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocator")]
pub struct AssetLocator {
    id: AssetId,
    absolute_uri: String,
}

impl AssetLocator {
    /// Build a locator. The URI must be non-empty.
    pub fn new(id: AssetId, absolute_uri: impl Into<String>) -> Result<Self, TypeError> {
        let absolute_uri = absolute_uri.into();
        if absolute_uri.is_empty() {
            return Err(TypeError::EmptyUri { id: id.to_string() });
        }
        Ok(Self { id, absolute_uri })
    }

    /// The asset's UUID.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// The resolved location of the asset.
    pub fn absolute_uri(&self) -> &str {
        &self.absolute_uri
    }

    /// Consume the locator, returning its parts.
    pub fn into_parts(self) -> (AssetId, String) {
        (self.id, self.absolute_uri)
    }
}

/// Unchecked wire form; deserialization goes through [`AssetLocator::new`].
#[derive(Deserialize)]
struct RawLocator {
    id: AssetId,
    absolute_uri: String,
}

impl TryFrom<RawLocator> for AssetLocator {
    type Error = TypeError;

    fn try_from(raw: RawLocator) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.absolute_uri)
    }
}
