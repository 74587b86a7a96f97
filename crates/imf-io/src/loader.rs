use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::interrupt::Interrupt;
use crate::opener::{StreamOpener, StreamOptions};
use crate::stream::ByteStream;

/// Buffer-size hint used when the stream cannot report its size.
pub const DEFAULT_SIZE_HINT: usize = 8 * 1024;

/// Hard cap on the size of a loaded document.
pub const MAX_DOCUMENT_SIZE: u64 = u32::MAX as u64 - 1;

/// Size of each individual read request.
const READ_CHUNK: usize = 16 * 1024;

/// Limits applied while draining a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Initial capacity when the stream size is unknown.
    pub default_size_hint: usize,
    /// Reading stops with an error once this many bytes would be exceeded.
    pub max_size: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_size_hint: DEFAULT_SIZE_HINT,
            max_size: MAX_DOCUMENT_SIZE,
        }
    }
}

/// Reads whole documents from byte streams.
///
/// A caller-supplied stream is only borrowed and stays open. A stream the
/// loader opens itself is dropped (closed) before [`load`](Self::load) returns,
/// on success and on failure.
pub struct DocumentLoader<'a, O: StreamOpener + ?Sized> {
    opener: &'a O,
    options: &'a StreamOptions,
    interrupt: &'a Interrupt,
    config: LoaderConfig,
}

impl<'a, O: StreamOpener + ?Sized> DocumentLoader<'a, O> {
    pub fn new(opener: &'a O, options: &'a StreamOptions, interrupt: &'a Interrupt) -> Self {
        Self {
            opener,
            options,
            interrupt,
            config: LoaderConfig::default(),
        }
    }

    /// Override the size limits.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the complete document at `url`, reading from `stream` when given.
    pub fn load(&self, url: &str, stream: Option<&mut dyn ByteStream>) -> IoResult<Bytes> {
        match stream {
            Some(stream) => self.read_to_end(url, stream),
            None => {
                let options = self.options.clone();
                let mut opened = self.opener.open(url, &options, self.interrupt)?;
                let result = self.read_to_end(url, opened.as_mut());
                drop(opened);
                debug!(url, "closed document stream");
                result
            }
        }
    }

    fn read_to_end(&self, url: &str, stream: &mut dyn ByteStream) -> IoResult<Bytes> {
        let max = self.config.max_size;
        let hint = match stream.size() {
            Some(size) if size > 0 => size.min(max) as usize,
            _ => self.config.default_size_hint,
        };

        let mut buf: Vec<u8> = Vec::new();
        reserve(&mut buf, hint.saturating_add(1), url)?;

        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            if self.interrupt.is_triggered() {
                return Err(IoError::Interrupted {
                    url: url.to_string(),
                });
            }
            let n = match stream.read(&mut chunk) {
                Ok(n) => n,
                // EINTR is not a cancellation; only `Interrupt` stops a load
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(IoError::Read {
                        url: url.to_string(),
                        source,
                    })
                }
            };
            if n == 0 {
                break;
            }
            if buf.len() as u64 + n as u64 > max {
                return Err(IoError::Incomplete {
                    url: url.to_string(),
                    read: buf.len() as u64,
                });
            }
            reserve(&mut buf, n, url)?;
            buf.extend_from_slice(&chunk[..n]);
        }

        if !stream.is_eof() {
            return Err(IoError::Incomplete {
                url: url.to_string(),
                read: buf.len() as u64,
            });
        }
        if buf.is_empty() {
            return Err(IoError::Empty {
                url: url.to_string(),
            });
        }

        debug!(url, bytes = buf.len(), hint, "document loaded");
        Ok(Bytes::from(buf))
    }
}

fn reserve(buf: &mut Vec<u8>, additional: usize, url: &str) -> IoResult<()> {
    buf.try_reserve(additional).map_err(|_| IoError::Allocation {
        url: url.to_string(),
        requested: additional,
    })
}
