use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid UUID {input:?}: {reason}")]
    InvalidUuid { input: String, reason: String },

    #[error("asset locator for {id} has an empty URI")]
    EmptyUri { id: String },
}
