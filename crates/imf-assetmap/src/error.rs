use imf_types::{AssetId, CompositionId};
use thiserror::Error;

/// Errors from building or querying an asset registry.
#[derive(Debug, Error)]
pub enum AssetMapError {
    /// The document is well-formed XML but lacks required Asset Map structure.
    #[error("invalid asset map {document}: <{element}> {reason}{}", context(.asset, .cpl))]
    Schema {
        document: String,
        element: String,
        reason: String,
        asset: Option<AssetId>,
        cpl: Option<CompositionId>,
    },

    /// The document could not be parsed as XML.
    #[error(transparent)]
    Xml(#[from] imf_xml::XmlError),

    /// The document could not be read.
    #[error(transparent)]
    Io(#[from] imf_io::IoError),

    /// The registry could not grow.
    #[error("cannot grow asset registry beyond {entries} entries")]
    Allocation { entries: usize },

    /// No entry for the requested asset.
    #[error("asset {0} is not listed in the asset map")]
    AssetNotFound(AssetId),
}

impl AssetMapError {
    /// Returns `true` for missing or invalid Asset Map structure.
    pub fn is_schema(&self) -> bool {
        matches!(self, AssetMapError::Schema { .. })
    }
}

fn context(asset: &Option<AssetId>, cpl: &Option<CompositionId>) -> String {
    let mut out = String::new();
    if let Some(asset) = asset {
        out.push_str(&format!(" (asset {asset})"));
    }
    if let Some(cpl) = cpl {
        out.push_str(&format!(" (cpl {cpl})"));
    }
    out
}

/// Result alias for asset map operations.
pub type AssetMapResult<T> = Result<T, AssetMapError>;
