//! IMF Asset Map resolution.
//!
//! Turns an Asset Map document (SMPTE ST 429-9) into an [`AssetRegistry`]
//! mapping asset UUIDs to absolute locations, so a composition reader can find
//! the track files a Composition Playlist references.
//!
//! # Architecture
//!
//! - **parser**: schema walk over any [`imf_xml::XmlNode`] tree
//! - **resolver**: lexical joining of chunk paths onto the Asset Map's directory
//! - **registry**: [`RegistryBuilder`] owns entries while parsing, [`AssetRegistry`] after
//! - **load**: Loader → XML tree → parser pipeline
//!
//! # Design Rules
//!
//! 1. Entries keep document order; every `Asset` element yields one entry.
//! 2. Only the first `Chunk` of an asset is used.
//! 3. A failed parse drops the builder, releasing every entry built so far.
//! 4. Lookups by id are first-wins when an id repeats.

pub mod error;
pub mod load;
pub mod parser;
pub mod registry;
pub mod resolver;

pub use error::{AssetMapError, AssetMapResult};
pub use load::{load_asset_map, parse_asset_map_bytes};
pub use parser::{parse_asset_map, ParseContext};
pub use registry::{release, AssetRegistry, RegistryBuilder};
pub use resolver::{dirname, is_absolute, resolve_path};
