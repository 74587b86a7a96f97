use thiserror::Error;

/// Errors from opening or draining a byte stream.
#[derive(Debug, Error)]
pub enum IoError {
    /// The transport could not open the locator.
    #[error("cannot open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// No transport is available for the locator's scheme.
    #[error("unsupported scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    /// A read from an open stream failed.
    #[error("read error on {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The interrupt callback asked for the operation to stop.
    #[error("interrupted while reading {url}")]
    Interrupted { url: String },

    /// Reading stopped before end of stream (size cap hit or the stream stalled).
    #[error("incomplete read of {url}: stopped after {read} bytes before end of stream")]
    Incomplete { url: String, read: u64 },

    /// The stream reached its end without producing any byte.
    #[error("{url} is empty")]
    Empty { url: String },

    /// The read buffer could not grow.
    #[error("cannot allocate {requested} bytes for {url}")]
    Allocation { url: String, requested: usize },
}

impl IoError {
    /// Returns `true` if the failure is a zero-length document rather than a
    /// transport failure.
    pub fn is_empty_document(&self) -> bool {
        matches!(self, IoError::Empty { .. })
    }

    /// Returns `true` if the failure is resource exhaustion.
    pub fn is_allocation(&self) -> bool {
        matches!(self, IoError::Allocation { .. })
    }
}

/// Result alias for stream operations.
pub type IoResult<T> = Result<T, IoError>;
