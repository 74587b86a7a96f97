use std::fmt;

use imf_assetmap::AssetMapError;
use imf_io::IoError;
use imf_xml::XmlError;
use thiserror::Error;

use crate::package::PackageState;

/// Coarse classification of a package failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stream open or read failure, including cancellation.
    Io,
    /// Malformed bytes or a document that is not well-formed.
    Parse,
    /// Well-formed document missing required structure.
    Schema,
    /// Resource exhaustion.
    Allocation,
    /// Operation not valid in the current package state.
    InvalidState,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Io => "io",
            ErrorKind::Parse => "parse",
            ErrorKind::Schema => "schema",
            ErrorKind::Allocation => "allocation",
            ErrorKind::InvalidState => "invalid-state",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    AssetMap(#[from] AssetMapError),

    #[error("invalid composition playlist {url}: {reason}")]
    Cpl { url: String, reason: String },

    #[error("cannot {operation} a package that is {state}")]
    InvalidState {
        operation: &'static str,
        state: PackageState,
    },

    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl PackageError {
    /// Classify the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackageError::Io(e) => io_kind(e),
            PackageError::Xml(_) => ErrorKind::Parse,
            PackageError::AssetMap(e) => match e {
                AssetMapError::Io(e) => io_kind(e),
                AssetMapError::Xml(_) => ErrorKind::Parse,
                AssetMapError::Schema { .. } | AssetMapError::AssetNotFound(_) => ErrorKind::Schema,
                AssetMapError::Allocation { .. } => ErrorKind::Allocation,
            },
            PackageError::Cpl { .. } => ErrorKind::Schema,
            PackageError::InvalidState { .. } => ErrorKind::InvalidState,
            PackageError::ConfigRead { .. } => ErrorKind::Io,
            PackageError::ConfigParse(_) => ErrorKind::Parse,
        }
    }
}

// A zero-length document is a malformed document, not a transport failure.
fn io_kind(e: &IoError) -> ErrorKind {
    if e.is_empty_document() {
        ErrorKind::Parse
    } else if e.is_allocation() {
        ErrorKind::Allocation
    } else {
        ErrorKind::Io
    }
}

pub type PackageResult<T> = Result<T, PackageError>;
