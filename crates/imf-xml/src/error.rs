use thiserror::Error;

/// Errors from building an XML tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The bytes are not a well-formed XML document.
    #[error("malformed XML in {source_id} at byte {position}: {reason}")]
    Malformed {
        source_id: String,
        position: u64,
        reason: String,
    },

    /// The document is not valid UTF-8.
    #[error("invalid UTF-8 in {source_id} at byte {position}")]
    Encoding { source_id: String, position: u64 },
}

/// Result alias for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;
