use imf_types::{AssetId, CompositionId};
use imf_xml::{parse_document, XmlNode};
use serde::Serialize;
use tracing::trace;

use crate::error::{PackageError, PackageResult};

/// What the package needs from a parsed Composition Playlist.
pub trait CplHandle {
    /// Composition identifier.
    fn id(&self) -> CompositionId;

    /// Track files the composition references, in first-reference order.
    fn referenced_assets(&self) -> &[AssetId] {
        &[]
    }
}

/// Parser for Composition Playlist documents.
///
/// The package hands over the complete document bytes and keeps the returned
/// handle until close.
pub trait CplReader {
    type Handle: CplHandle;

    fn read_cpl(&self, bytes: &[u8], url: &str) -> PackageResult<Self::Handle>;
}

impl<R: CplReader + ?Sized> CplReader for &R {
    type Handle = R::Handle;

    fn read_cpl(&self, bytes: &[u8], url: &str) -> PackageResult<Self::Handle> {
        (**self).read_cpl(bytes, url)
    }
}

/// Identity of a composition: the id, the title and the track files it uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompositionSummary {
    pub id: CompositionId,
    pub content_title: Option<String>,
    pub track_files: Vec<AssetId>,
}

impl CplHandle for CompositionSummary {
    fn id(&self) -> CompositionId {
        self.id
    }

    fn referenced_assets(&self) -> &[AssetId] {
        &self.track_files
    }
}

/// Minimal CPL reader: root `Id`, `ContentTitle` and every `TrackFileId`.
///
/// Builds no timeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositionIdReader;

impl CplReader for CompositionIdReader {
    type Handle = CompositionSummary;

    fn read_cpl(&self, bytes: &[u8], url: &str) -> PackageResult<CompositionSummary> {
        let doc = parse_document(bytes, url)?;
        let invalid = |reason: String| PackageError::Cpl {
            url: url.to_string(),
            reason,
        };

        let root = doc
            .root()
            .ok_or_else(|| invalid("document has no root element".into()))?;
        if !root.is("CompositionPlaylist") {
            return Err(invalid(format!("unexpected root element <{}>", root.tag())));
        }

        let id_text = root
            .child_text("Id")
            .ok_or_else(|| invalid("<Id> is missing or empty".into()))?;
        let id = CompositionId::parse(id_text).map_err(|e| invalid(format!("<Id> {e}")))?;

        let mut track_files = Vec::new();
        collect_track_files(root, url, &mut track_files)?;

        Ok(CompositionSummary {
            id,
            content_title: root.child_text("ContentTitle").map(str::to_owned),
            track_files,
        })
    }
}

fn collect_track_files<N: XmlNode>(node: &N, url: &str, out: &mut Vec<AssetId>) -> PackageResult<()> {
    for child in node.children() {
        if child.is("TrackFileId") {
            let text = child.text().unwrap_or_default();
            let id = AssetId::parse(text).map_err(|e| PackageError::Cpl {
                url: url.to_string(),
                reason: format!("<TrackFileId> {e}"),
            })?;
            if !out.contains(&id) {
                trace!(asset = %id, "track file referenced");
                out.push(id);
            }
        } else {
            collect_track_files(child, url, out)?;
        }
    }
    Ok(())
}
