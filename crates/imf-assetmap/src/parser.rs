use imf_types::{AssetId, AssetLocator, CompositionId};
use imf_xml::XmlNode;
use tracing::{debug, trace, warn};

use crate::error::{AssetMapError, AssetMapResult};
use crate::registry::{AssetRegistry, RegistryBuilder};
use crate::resolver::resolve_path;

const ASSET_MAP: &str = "AssetMap";
const ASSET_LIST: &str = "AssetList";
const ASSET: &str = "Asset";
const ID: &str = "Id";
const CHUNK_LIST: &str = "ChunkList";
const CHUNK: &str = "Chunk";
const PATH: &str = "Path";

/// Inputs of one Asset Map parse.
#[derive(Clone, Copy, Debug)]
pub struct ParseContext<'a> {
    /// Locator of the Asset Map document, for diagnostics.
    pub document: &'a str,
    /// Directory relative chunk paths are resolved against.
    pub base_dir: &'a str,
    /// Composition the Asset Map is opened for, if known.
    pub cpl: Option<CompositionId>,
}

impl<'a> ParseContext<'a> {
    pub fn new(document: &'a str, base_dir: &'a str) -> Self {
        Self {
            document,
            base_dir,
            cpl: None,
        }
    }

    /// Attach the composition id to diagnostics.
    pub fn with_cpl(mut self, cpl: CompositionId) -> Self {
        self.cpl = Some(cpl);
        self
    }

    fn schema(&self, element: &str, reason: impl Into<String>, asset: Option<AssetId>) -> AssetMapError {
        AssetMapError::Schema {
            document: self.document.to_string(),
            element: element.to_string(),
            reason: reason.into(),
            asset,
            cpl: self.cpl,
        }
    }
}

/// Build an [`AssetRegistry`] from the root element of an Asset Map.
///
/// `root` is `None` when the document holds no element at all. Children of
/// `AssetList` that are not `Asset` elements are skipped. On any error the
/// entries built so far are dropped with the builder.
pub fn parse_asset_map<N: XmlNode>(root: Option<&N>, ctx: &ParseContext<'_>) -> AssetMapResult<AssetRegistry> {
    let root = root.ok_or_else(|| ctx.schema(ASSET_MAP, "root element is missing", None))?;
    if !root.is(ASSET_MAP) {
        return Err(ctx.schema(
            ASSET_MAP,
            format!("expected as root element, found <{}>", root.tag()),
            None,
        ));
    }

    let asset_list = root
        .find_child(ASSET_LIST)
        .ok_or_else(|| ctx.schema(ASSET_LIST, "is missing", None))?;

    let mut builder = RegistryBuilder::allocate();
    for child in asset_list.children() {
        if !child.is(ASSET) {
            trace!(element = child.tag(), "skipping non-asset element");
            continue;
        }
        let locator = parse_asset(child, ctx)?;
        debug!(
            asset = %locator.id(),
            uri = locator.absolute_uri(),
            "found asset"
        );
        if builder.contains(locator.id()) {
            warn!(
                asset = %locator.id(),
                document = ctx.document,
                "duplicate asset id; keeping first location for lookups"
            );
        }
        builder.append(locator)?;
    }

    Ok(builder.finish())
}

fn parse_asset<N: XmlNode>(asset: &N, ctx: &ParseContext<'_>) -> AssetMapResult<AssetLocator> {
    let id_text = asset
        .child_text(ID)
        .ok_or_else(|| ctx.schema(ID, "is missing or empty", None))?;
    let id = AssetId::parse(id_text).map_err(|e| ctx.schema(ID, e.to_string(), None))?;

    let chunk_list = asset
        .find_child(CHUNK_LIST)
        .ok_or_else(|| ctx.schema(CHUNK_LIST, "is missing", Some(id)))?;

    let mut chunks = chunk_list.find_children(CHUNK);
    let chunk = chunks
        .next()
        .ok_or_else(|| ctx.schema(CHUNK, "is missing", Some(id)))?;
    if chunks.next().is_some() {
        debug!(asset = %id, "asset has several chunks; using the first");
    }

    let path = chunk
        .child_text(PATH)
        .ok_or_else(|| ctx.schema(PATH, "is missing or empty", Some(id)))?;

    let uri = resolve_path(ctx.base_dir, path);
    AssetLocator::new(id, uri).map_err(|e| ctx.schema(PATH, e.to_string(), Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use imf_xml::{parse_document, XmlElement};
    use proptest::prelude::*;

    const SAMPLE_ID: &str = "8e2c1a4e-7b3d-4f1a-9c2e-1234567890ab";

    fn parse(xml: &str, base: &str) -> AssetMapResult<AssetRegistry> {
        let doc = parse_document(xml.as_bytes(), "mem://ASSETMAP.xml").unwrap();
        parse_asset_map(doc.root(), &ParseContext::new("mem://ASSETMAP.xml", base))
    }

    fn asset_xml(id: &str, path: &str) -> String {
        format!(
            "<Asset><Id>{id}</Id><ChunkList><Chunk><Path>{path}</Path></Chunk></ChunkList></Asset>"
        )
    }

    fn asset_map(assets: &[String]) -> String {
        format!("<AssetMap><AssetList>{}</AssetList></AssetMap>", assets.concat())
    }

    fn schema_element(err: AssetMapError) -> String {
        match err {
            AssetMapError::Schema { element, .. } => element,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn single_asset_example() {
        let registry = parse(&asset_map(&[asset_xml(SAMPLE_ID, "video.mxf")]), "/mnt/imf/pkg").unwrap();
        assert_eq!(registry.len(), 1);
        let entry = &registry.entries()[0];
        assert_eq!(
            entry.id().as_bytes(),
            &0x8e2c1a4e7b3d4f1a9c2e1234567890abu128.to_be_bytes()
        );
        assert_eq!(entry.absolute_uri(), "/mnt/imf/pkg/video.mxf");
    }

    #[test]
    fn empty_asset_list_is_empty_registry() {
        let registry = parse("<AssetMap><AssetList/></AssetMap>", "/pkg").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn url_path_is_verbatim() {
        let url = "https://cdn.example/clip.mxf";
        let registry = parse(&asset_map(&[asset_xml(SAMPLE_ID, url)]), "/mnt/imf/pkg").unwrap();
        assert_eq!(registry.entries()[0].absolute_uri(), url);
    }

    #[test]
    fn tags_are_case_insensitive() {
        let xml = format!(
            "<ASSETMAP><assetlist><ASSET><ID>{SAMPLE_ID}</ID><chunklist><CHUNK><path>v.mxf</path></CHUNK></chunklist></ASSET></assetlist></ASSETMAP>"
        );
        let registry = parse(&xml, "/pkg").unwrap();
        assert_eq!(registry.entries()[0].absolute_uri(), "/pkg/v.mxf");
    }

    #[test]
    fn non_asset_children_are_skipped() {
        let xml = format!(
            "<AssetMap><AssetList><Note>ignore</Note>{}<Other/>{}</AssetList></AssetMap>",
            asset_xml("00000000-0000-0000-0000-000000000001", "a.mxf"),
            asset_xml("00000000-0000-0000-0000-000000000002", "b.mxf"),
        );
        let registry = parse(&xml, "/pkg").unwrap();
        let uris: Vec<&str> = registry.iter().map(|l| l.absolute_uri()).collect();
        assert_eq!(uris, vec!["/pkg/a.mxf", "/pkg/b.mxf"]);
    }

    #[test]
    fn only_first_chunk_is_used() {
        let xml = format!(
            "<AssetMap><AssetList><Asset><Id>{SAMPLE_ID}</Id><ChunkList>\
             <Chunk><Path>part1.mxf</Path></Chunk><Chunk><Path>part2.mxf</Path></Chunk>\
             </ChunkList></Asset></AssetList></AssetMap>"
        );
        let registry = parse(&xml, "/pkg").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].absolute_uri(), "/pkg/part1.mxf");
    }

    #[test]
    fn urn_ids_and_padded_text_are_accepted() {
        let xml = asset_map(&[asset_xml(&format!(" urn:uuid:{SAMPLE_ID} "), "  video.mxf\n")]);
        let registry = parse(&xml, "/pkg").unwrap();
        let entry = &registry.entries()[0];
        assert_eq!(entry.id().to_string(), SAMPLE_ID);
        assert_eq!(entry.absolute_uri(), "/pkg/video.mxf");
    }

    #[test]
    fn duplicate_ids_keep_all_entries_and_first_wins() {
        let xml = asset_map(&[asset_xml(SAMPLE_ID, "first.mxf"), asset_xml(SAMPLE_ID, "second.mxf")]);
        let registry = parse(&xml, "/pkg").unwrap();
        assert_eq!(registry.len(), 2);
        let id = AssetId::parse(SAMPLE_ID).unwrap();
        assert_eq!(registry.get(&id).unwrap().absolute_uri(), "/pkg/first.mxf");
    }

    #[test]
    fn missing_root_is_schema_error() {
        let doc = parse_document(b"<!-- empty -->", "mem://x").unwrap();
        let err = parse_asset_map(doc.root(), &ParseContext::new("mem://x", "/pkg")).unwrap_err();
        assert_eq!(schema_element(err), "AssetMap");
    }

    #[test]
    fn wrong_root_is_schema_error() {
        let err = parse("<PackingList><AssetList/></PackingList>", "/pkg").unwrap_err();
        assert!(err.to_string().contains("PackingList"));
        assert_eq!(schema_element(err), "AssetMap");
    }

    #[test]
    fn missing_asset_list_is_schema_error() {
        let err = parse("<AssetMap><Id>x</Id></AssetMap>", "/pkg").unwrap_err();
        assert_eq!(schema_element(err), "AssetList");
    }

    #[test]
    fn missing_id_is_schema_error() {
        let xml = "<AssetMap><AssetList><Asset><ChunkList><Chunk><Path>a</Path></Chunk></ChunkList></Asset></AssetList></AssetMap>";
        assert_eq!(schema_element(parse(xml, "/pkg").unwrap_err()), "Id");
    }

    #[test]
    fn empty_id_is_schema_error() {
        let xml = asset_map(&[asset_xml("   ", "a.mxf")]);
        assert_eq!(schema_element(parse(&xml, "/pkg").unwrap_err()), "Id");
    }

    #[test]
    fn undecodable_id_is_schema_error() {
        let xml = asset_map(&[asset_xml("not-a-uuid", "a.mxf")]);
        assert_eq!(schema_element(parse(&xml, "/pkg").unwrap_err()), "Id");
    }

    #[test]
    fn missing_chunk_list_is_schema_error() {
        let xml = format!("<AssetMap><AssetList><Asset><Id>{SAMPLE_ID}</Id></Asset></AssetList></AssetMap>");
        let err = parse(&xml, "/pkg").unwrap_err();
        assert!(matches!(&err, AssetMapError::Schema { asset: Some(_), .. }));
        assert_eq!(schema_element(err), "ChunkList");
    }

    #[test]
    fn missing_chunk_is_schema_error() {
        let xml = format!(
            "<AssetMap><AssetList><Asset><Id>{SAMPLE_ID}</Id><ChunkList/></Asset></AssetList></AssetMap>"
        );
        assert_eq!(schema_element(parse(&xml, "/pkg").unwrap_err()), "Chunk");
    }

    #[test]
    fn missing_path_is_schema_error() {
        let xml = format!(
            "<AssetMap><AssetList><Asset><Id>{SAMPLE_ID}</Id><ChunkList><Chunk/></ChunkList></Asset></AssetList></AssetMap>"
        );
        assert_eq!(schema_element(parse(&xml, "/pkg").unwrap_err()), "Path");
    }

    #[test]
    fn empty_path_is_schema_error() {
        let xml = asset_map(&[asset_xml(SAMPLE_ID, " \n ")]);
        assert_eq!(schema_element(parse(&xml, "/pkg").unwrap_err()), "Path");
    }

    #[test]
    fn error_in_later_asset_fails_whole_parse() {
        let xml = asset_map(&[asset_xml(SAMPLE_ID, "a.mxf"), asset_xml(SAMPLE_ID, "")]);
        assert!(parse(&xml, "/pkg").is_err());
    }

    #[test]
    fn cpl_id_is_reported_in_errors() {
        let cpl = CompositionId::parse("00000000-0000-0000-0000-0000000000ff").unwrap();
        let doc = parse_document(b"<AssetMap/>", "mem://am").unwrap();
        let ctx = ParseContext::new("mem://am", "/pkg").with_cpl(cpl);
        let err = parse_asset_map(doc.root(), &ctx).unwrap_err();
        assert!(err.to_string().contains("00000000-0000-0000-0000-0000000000ff"));
    }

    #[test]
    fn works_on_hand_built_trees() {
        let root = XmlElement::new("AssetMap").with_child(
            XmlElement::new("AssetList").with_child(
                XmlElement::new("Asset")
                    .with_child(XmlElement::new("Id").with_text(SAMPLE_ID))
                    .with_child(
                        XmlElement::new("ChunkList").with_child(
                            XmlElement::new("Chunk")
                                .with_child(XmlElement::new("Path").with_text("v.mxf")),
                        ),
                    ),
            ),
        );
        let registry = parse_asset_map(Some(&root), &ParseContext::new("mem://tree", "")).unwrap();
        assert_eq!(registry.entries()[0].absolute_uri(), "./v.mxf");
    }

    proptest! {
        #[test]
        fn count_and_order_follow_document(ids in proptest::collection::vec(any::<[u8; 16]>(), 0..32)) {
            let assets: Vec<String> = ids
                .iter()
                .enumerate()
                .map(|(i, b)| asset_xml(&uuid::Uuid::from_bytes(*b).to_string(), &format!("track{i}.mxf")))
                .collect();
            let registry = parse(&asset_map(&assets), "/pkg").unwrap();
            prop_assert_eq!(registry.len(), ids.len());
            for (i, entry) in registry.iter().enumerate() {
                prop_assert_eq!(entry.id().as_bytes(), &ids[i]);
                prop_assert_eq!(entry.absolute_uri(), format!("/pkg/track{i}.mxf"));
            }
        }
    }
}
