use imf_io::{ByteStream, DocumentLoader, StreamOpener};
use imf_types::CompositionId;
use imf_xml::parse_document;
use tracing::debug;

use crate::error::AssetMapResult;
use crate::parser::{parse_asset_map, ParseContext};
use crate::registry::AssetRegistry;
use crate::resolver::dirname;

/// Parse an Asset Map already held in memory.
pub fn parse_asset_map_bytes(bytes: &[u8], ctx: &ParseContext<'_>) -> AssetMapResult<AssetRegistry> {
    let doc = parse_document(bytes, ctx.document)?;
    parse_asset_map(doc.root(), ctx)
}

/// Load, parse and resolve the Asset Map at `url`.
///
/// Chunk paths are resolved against the directory of `url`. When `stream` is
/// given it is read instead of opening `url`, and it is left open.
pub fn load_asset_map<O: StreamOpener + ?Sized>(
    loader: &DocumentLoader<'_, O>,
    url: &str,
    stream: Option<&mut dyn ByteStream>,
    cpl: Option<CompositionId>,
) -> AssetMapResult<AssetRegistry> {
    debug!(url, "loading asset map");
    let bytes = loader.load(url, stream)?;

    let base_dir = dirname(url);
    let mut ctx = ParseContext::new(url, &base_dir);
    if let Some(cpl) = cpl {
        ctx = ctx.with_cpl(cpl);
    }

    let registry = parse_asset_map_bytes(&bytes, &ctx)?;
    debug!(url, base = %base_dir, assets = registry.len(), "asset map parsed");
    Ok(registry)
}
