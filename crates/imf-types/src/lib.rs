//! Foundation types for resolving Interoperable Master Format (IMF) packages.
//!
//! Every other `imf-*` crate depends on `imf-types`.
//!
//! # Key Types
//!
//! - [`AssetId`]: UUID of an asset listed in an Asset Map (track files, CPLs, PKLs)
//! - [`CompositionId`]: UUID identifying a Composition Playlist
//! - [`AssetLocator`]: an asset id paired with its resolved absolute location

pub mod error;
pub mod id;
pub mod locator;

pub use error::TypeError;
pub use id::{AssetId, CompositionId};
pub use locator::AssetLocator;
