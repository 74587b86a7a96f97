//! IMF package lifecycle.
//!
//! [`ImfPackage`] opens a Composition Playlist, then the Asset Map next to it,
//! and holds both until close. Everything a half-finished open built is
//! released before the error reaches the caller.
//!
//! # Architecture
//!
//! - **config**: [`ImfConfig`], TOML-loadable; Asset Map override and loader limits
//! - **cpl**: [`CplReader`] / [`CplHandle`] seam for the external CPL parser
//! - **package**: the open/close state machine
//!
//! # Design Rules
//!
//! 1. `open` is valid only once, from [`PackageState::Unopened`].
//! 2. The CPL handle and registry are observable only in [`PackageState::Ready`].
//! 3. `close` is idempotent and always ends in [`PackageState::Closed`].

pub mod config;
pub mod cpl;
pub mod error;
pub mod package;

pub use config::{ImfConfig, DEFAULT_ASSET_MAP_NAME};
pub use cpl::{CompositionIdReader, CompositionSummary, CplHandle, CplReader};
pub use error::{ErrorKind, PackageError, PackageResult};
pub use package::{looks_like_cpl, ImfPackage, PackageState};

// Re-export the types callers need to drive a package.
pub use imf_assetmap::{AssetRegistry, AssetMapError};
pub use imf_io::{ByteStream, FileOpener, Interrupt, StreamOpener, StreamOptions};
pub use imf_types::{AssetId, AssetLocator, CompositionId};
