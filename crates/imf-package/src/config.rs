use std::path::Path;

use imf_assetmap::{dirname, resolve_path};
use imf_io::{LoaderConfig, StreamOptions, DEFAULT_SIZE_HINT, MAX_DOCUMENT_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{PackageError, PackageResult};

/// File name of the Asset Map looked up next to the CPL.
pub const DEFAULT_ASSET_MAP_NAME: &str = "ASSETMAP.xml";

/// Package resolution settings.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// asset_map = "/mnt/imf/pkg/ASSETMAP.xml"
/// max_document_size = 1048576
///
/// [stream_options]
/// user_agent = "imf/0.1"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImfConfig {
    /// Explicit Asset Map locator. Defaults to `ASSETMAP.xml` next to the CPL.
    pub asset_map: Option<String>,
    /// Options passed to the transport on every open.
    pub stream_options: StreamOptions,
    pub max_document_size: u64,
    pub default_size_hint: usize,
}

impl Default for ImfConfig {
    fn default() -> Self {
        Self {
            asset_map: None,
            stream_options: StreamOptions::new(),
            max_document_size: MAX_DOCUMENT_SIZE,
            default_size_hint: DEFAULT_SIZE_HINT,
        }
    }
}

impl ImfConfig {
    pub fn from_toml_str(text: &str) -> PackageResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> PackageResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PackageError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Asset Map locator for the CPL at `cpl_url`.
    pub fn asset_map_url(&self, cpl_url: &str) -> String {
        match &self.asset_map {
            Some(url) => url.clone(),
            None => resolve_path(&dirname(cpl_url), DEFAULT_ASSET_MAP_NAME),
        }
    }

    /// Size limits for the document loader.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            default_size_hint: self.default_size_hint,
            max_size: self.max_document_size,
        }
    }
}
