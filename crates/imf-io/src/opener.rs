use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, IoResult};
use crate::interrupt::Interrupt;
use crate::scheme::url_scheme;
use crate::stream::{ByteStream, FileStream};

/// Key/value connection options handed to the transport on open.
///
/// Ordered so that logs and serialized configs are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamOptions(BTreeMap<String, String>);

impl StreamOptions {
    /// Empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up an option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StreamOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Opens locators as byte streams.
///
/// Implementations own the transport: filesystem, HTTP, object storage.
/// They should poll `interrupt` during any blocking connect.
pub trait StreamOpener {
    fn open(
        &self,
        url: &str,
        options: &StreamOptions,
        interrupt: &Interrupt,
    ) -> IoResult<Box<dyn ByteStream>>;
}

impl<O: StreamOpener + ?Sized> StreamOpener for &O {
    fn open(
        &self,
        url: &str,
        options: &StreamOptions,
        interrupt: &Interrupt,
    ) -> IoResult<Box<dyn ByteStream>> {
        (**self).open(url, options, interrupt)
    }
}

/// Opener for local paths and `file://` URLs.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileOpener;

impl FileOpener {
    /// Map a locator to a local path, rejecting non-file schemes.
    fn local_path(url: &str) -> IoResult<&str> {
        match url_scheme(url) {
            None => Ok(url),
            Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
                let rest = &url[scheme.len() + 1..];
                // file://host/path: only the empty host and localhost are local.
                let path = match rest.strip_prefix("//") {
                    Some(authority_path) => {
                        let slash = authority_path.find('/').unwrap_or(authority_path.len());
                        let host = &authority_path[..slash];
                        if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                            return Err(IoError::UnsupportedScheme {
                                url: url.to_string(),
                                scheme: format!("file://{host}"),
                            });
                        }
                        &authority_path[slash..]
                    }
                    None => rest,
                };
                Ok(path)
            }
            Some(scheme) => Err(IoError::UnsupportedScheme {
                url: url.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}

impl StreamOpener for FileOpener {
    fn open(
        &self,
        url: &str,
        options: &StreamOptions,
        interrupt: &Interrupt,
    ) -> IoResult<Box<dyn ByteStream>> {
        if interrupt.is_triggered() {
            return Err(IoError::Interrupted {
                url: url.to_string(),
            });
        }
        let path = Self::local_path(url)?;
        debug!(url, options = options.len(), "opening file stream");
        let stream = FileStream::open(Path::new(path)).map_err(|source| IoError::Open {
            url: url.to_string(),
            source,
        })?;
        Ok(Box::new(stream))
    }
}
