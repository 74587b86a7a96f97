//! XML trees for IMF documents.
//!
//! [`parse_document`] turns raw bytes into an owned [`XmlDocument`] using the
//! `quick-xml` event reader. Consumers walk the tree through the [`XmlNode`]
//! query trait rather than the concrete element type, and every tag
//! comparison goes through [`tag_matches`].

pub mod error;
pub mod node;
pub mod parser;
pub mod tree;

pub use error::{XmlError, XmlResult};
pub use node::{tag_matches, XmlNode};
pub use parser::parse_document;
pub use tree::{XmlDocument, XmlElement};
