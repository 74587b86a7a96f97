//! Byte-stream I/O for IMF package resolution.
//!
//! The host transport is consumed through two traits: [`StreamOpener`] turns a
//! locator into a [`ByteStream`], and the [`DocumentLoader`] drains a stream
//! into one bounded buffer. Cancellation is cooperative through an
//! [`Interrupt`] polled before every blocking read.
//!
//! # Architecture
//!
//! - **ByteStream**: read / size query / end-of-stream flag
//! - **StreamOpener**: open with key/value [`StreamOptions`]; [`FileOpener`] handles local paths
//! - **DocumentLoader**: size-hinted, capped read-to-end, closes only streams it opened

pub mod error;
pub mod interrupt;
pub mod loader;
pub mod opener;
pub mod scheme;
pub mod stream;

pub use error::{IoError, IoResult};
pub use interrupt::Interrupt;
pub use loader::{DocumentLoader, LoaderConfig, DEFAULT_SIZE_HINT, MAX_DOCUMENT_SIZE};
pub use opener::{FileOpener, StreamOpener, StreamOptions};
pub use scheme::url_scheme;
pub use stream::{ByteStream, FileStream, MemoryStream};
