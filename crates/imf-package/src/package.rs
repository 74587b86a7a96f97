use std::fmt;

use bytes::Bytes;
use imf_assetmap::{load_asset_map, release, AssetRegistry};
use imf_io::{url_scheme, ByteStream, DocumentLoader, Interrupt, StreamOpener};
use imf_types::AssetId;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ImfConfig;
use crate::cpl::{CplHandle, CplReader};
use crate::error::{PackageError, PackageResult};

/// Lifecycle of an [`ImfPackage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageState {
    Unopened,
    ParsingCpl,
    ParsingAssetMap,
    Ready,
    Failed,
    Closed,
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageState::Unopened => "unopened",
            PackageState::ParsingCpl => "parsing the CPL",
            PackageState::ParsingAssetMap => "parsing the asset map",
            PackageState::Ready => "ready",
            PackageState::Failed => "failed",
            PackageState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One IMF package: a Composition Playlist and its resolved Asset Map.
///
/// Owns everything built while opening. On a failed [`open`](Self::open) the
/// package moves to [`PackageState::Failed`] holding nothing; on success the
/// CPL handle and registry stay until [`close`](Self::close) or
/// [`into_parts`](Self::into_parts).
pub struct ImfPackage<C: CplReader, O: StreamOpener> {
    config: ImfConfig,
    opener: O,
    reader: C,
    interrupt: Interrupt,
    state: PackageState,
    asset_map_url: Option<String>,
    cpl: Option<C::Handle>,
    registry: Option<AssetRegistry>,
}

impl<C: CplReader, O: StreamOpener> ImfPackage<C, O> {
    pub fn new(config: ImfConfig, opener: O, reader: C) -> Self {
        Self {
            config,
            opener,
            reader,
            interrupt: Interrupt::never(),
            state: PackageState::Unopened,
            asset_map_url: None,
            cpl: None,
            registry: None,
        }
    }

    /// Install a cancellation check polled during every blocking read.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Read the CPL at `cpl_url`, then its Asset Map.
    ///
    /// `cpl_stream` is read instead of opening `cpl_url` when given; it is
    /// never closed here. Valid only on an unopened package.
    pub fn open(&mut self, cpl_url: &str, cpl_stream: Option<&mut dyn ByteStream>) -> PackageResult<()> {
        if self.state != PackageState::Unopened {
            return Err(self.invalid_state("open"));
        }

        match self.open_documents(cpl_url, cpl_stream) {
            Ok((cpl, registry, asset_map_url)) => {
                info!(
                    cpl = %cpl.id(),
                    assets = registry.len(),
                    asset_map = %asset_map_url,
                    "IMF package ready"
                );
                self.cpl = Some(cpl);
                self.registry = Some(registry);
                self.asset_map_url = Some(asset_map_url);
                self.state = PackageState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(url = cpl_url, state = %self.state, error = %e, "IMF package open failed");
                self.state = PackageState::Failed;
                Err(e)
            }
        }
    }

    // Partial results live only in locals here, so an early return drops them.
    fn open_documents(
        &mut self,
        cpl_url: &str,
        cpl_stream: Option<&mut dyn ByteStream>,
    ) -> PackageResult<(C::Handle, AssetRegistry, String)> {
        let loader = DocumentLoader::new(&self.opener, &self.config.stream_options, &self.interrupt)
            .with_config(self.config.loader_config());

        self.state = PackageState::ParsingCpl;
        debug!(url = cpl_url, "loading CPL");
        let bytes = loader.load(cpl_url, cpl_stream)?;
        let cpl = self.reader.read_cpl(&bytes, cpl_url)?;
        drop(bytes);
        info!(cpl = %cpl.id(), url = cpl_url, "parsed IMF CPL");

        self.state = PackageState::ParsingAssetMap;
        let asset_map_url = self.config.asset_map_url(cpl_url);
        debug!(cpl = %cpl.id(), url = %asset_map_url, "loading asset map");
        let registry = load_asset_map(&loader, &asset_map_url, None, Some(cpl.id()))?;

        Ok((cpl, registry, asset_map_url))
    }

    pub fn state(&self) -> PackageState {
        self.state
    }

    pub fn config(&self) -> &ImfConfig {
        &self.config
    }

    /// The CPL handle, once ready.
    pub fn cpl(&self) -> Option<&C::Handle> {
        self.cpl.as_ref()
    }

    /// The asset registry, once ready.
    pub fn registry(&self) -> Option<&AssetRegistry> {
        self.registry.as_ref()
    }

    /// Locator the Asset Map was read from, once ready.
    pub fn asset_map_url(&self) -> Option<&str> {
        self.asset_map_url.as_deref()
    }

    /// Track files the CPL references that the Asset Map does not list.
    pub fn missing_assets(&self) -> PackageResult<Vec<AssetId>> {
        match (&self.cpl, &self.registry) {
            (Some(cpl), Some(registry)) => Ok(cpl
                .referenced_assets()
                .iter()
                .filter(|id| !registry.contains(id))
                .copied()
                .collect()),
            _ => Err(self.invalid_state("check assets of")),
        }
    }

    /// Hand the CPL handle and registry over to the caller.
    pub fn into_parts(self) -> PackageResult<(C::Handle, AssetRegistry)> {
        let state = self.state;
        match (self.cpl, self.registry) {
            (Some(cpl), Some(registry)) if state == PackageState::Ready => Ok((cpl, registry)),
            _ => Err(PackageError::InvalidState {
                operation: "take apart",
                state,
            }),
        }
    }

    /// Next essence packet. Essence is not demuxed, so a ready package is
    /// always at end of stream.
    pub fn read_packet(&mut self) -> PackageResult<Option<Bytes>> {
        match self.state {
            PackageState::Ready => Ok(None),
            _ => Err(self.invalid_state("read from")),
        }
    }

    /// Release everything the package holds. Safe to call in any state, any
    /// number of times.
    pub fn close(&mut self) {
        if self.state == PackageState::Closed {
            return;
        }
        release(self.registry.take());
        self.cpl = None;
        self.asset_map_url = None;
        debug!(from = %self.state, "IMF package closed");
        self.state = PackageState::Closed;
    }

    fn invalid_state(&self, operation: &'static str) -> PackageError {
        PackageError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl<C: CplReader, O: StreamOpener> fmt::Debug for ImfPackage<C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImfPackage")
            .field("state", &self.state)
            .field("asset_map_url", &self.asset_map_url)
            .field("assets", &self.registry.as_ref().map(AssetRegistry::len))
            .finish()
    }
}

/// Whether `url` names something that could be a CPL: an `.xml` file, any case.
pub fn looks_like_cpl(url: &str) -> bool {
    let path = match url_scheme(url) {
        Some(_) => url.split(['?', '#']).next().unwrap_or(url),
        None => url,
    };
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpl::{CompositionIdReader, CompositionSummary};
    use crate::error::ErrorKind;
    use imf_io::{FileOpener, MemoryStream};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const CPL_ID: &str = "0c2d8b1e-5a4f-4e3b-9d1c-aabbccddeeff";
    const VIDEO_ID: &str = "8e2c1a4e-7b3d-4f1a-9c2e-1234567890ab";
    const AUDIO_ID: &str = "00000000-0000-0000-0000-000000000002";

    fn cpl_xml() -> String {
        format!(
            "<CompositionPlaylist><Id>urn:uuid:{CPL_ID}</Id><ContentTitle>Test</ContentTitle>\
             <SegmentList><Segment><SequenceList><MainImageSequence><ResourceList>\
             <Resource><TrackFileId>urn:uuid:{VIDEO_ID}</TrackFileId></Resource>\
             <Resource><TrackFileId>urn:uuid:{AUDIO_ID}</TrackFileId></Resource>\
             </ResourceList></MainImageSequence></SequenceList></Segment></SegmentList>\
             </CompositionPlaylist>"
        )
    }

    fn asset_map_xml(ids: &[(&str, &str)]) -> String {
        let assets: String = ids
            .iter()
            .map(|(id, path)| {
                format!(
                    "<Asset><Id>urn:uuid:{id}</Id><ChunkList><Chunk><Path>{path}</Path></Chunk></ChunkList></Asset>"
                )
            })
            .collect();
        format!("<AssetMap><AssetList>{assets}</AssetList></AssetMap>")
    }

    fn write_package(dir: &Path, asset_map: &str) -> String {
        fs::write(dir.join("CPL.xml"), cpl_xml()).unwrap();
        fs::write(dir.join("ASSETMAP.xml"), asset_map).unwrap();
        dir.join("CPL.xml").to_str().unwrap().to_string()
    }

    fn package() -> ImfPackage<CompositionIdReader, FileOpener> {
        ImfPackage::new(ImfConfig::default(), FileOpener, CompositionIdReader)
    }

    #[test]
    fn opens_package_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(
            dir.path(),
            &asset_map_xml(&[(VIDEO_ID, "video.mxf"), (AUDIO_ID, "audio.mxf")]),
        );

        let mut pkg = package();
        assert_eq!(pkg.state(), PackageState::Unopened);
        pkg.open(&cpl_url, None).unwrap();

        assert_eq!(pkg.state(), PackageState::Ready);
        assert_eq!(pkg.cpl().unwrap().id().to_string(), CPL_ID);
        let registry = pkg.registry().unwrap();
        assert_eq!(registry.len(), 2);
        let video = AssetId::parse(VIDEO_ID).unwrap();
        let expected = dir.path().join("video.mxf");
        assert_eq!(registry.get(&video).unwrap().absolute_uri(), expected.to_str().unwrap());
        let expected_map = dir.path().join("ASSETMAP.xml");
        assert_eq!(pkg.asset_map_url(), expected_map.to_str());
        assert!(pkg.missing_assets().unwrap().is_empty());
    }

    #[test]
    fn asset_map_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), "not even xml");
        let other = dir.path().join("sub");
        fs::create_dir(&other).unwrap();
        let override_path = other.join("AM.xml");
        fs::write(&override_path, asset_map_xml(&[(VIDEO_ID, "v.mxf")])).unwrap();

        let config = ImfConfig {
            asset_map: Some(override_path.to_str().unwrap().to_string()),
            ..Default::default()
        };
        let mut pkg = ImfPackage::new(config, FileOpener, CompositionIdReader);
        pkg.open(&cpl_url, None).unwrap();

        let registry = pkg.registry().unwrap();
        let expected = other.join("v.mxf");
        assert_eq!(registry.entries()[0].absolute_uri(), expected.to_str().unwrap());
        let audio = AssetId::parse(AUDIO_ID).unwrap();
        assert_eq!(pkg.missing_assets().unwrap(), vec![audio]);
    }

    #[test]
    fn supplied_cpl_stream_is_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ASSETMAP.xml"), asset_map_xml(&[(VIDEO_ID, "v.mxf")])).unwrap();
        let cpl_url = dir.path().join("CPL.xml");

        let mut stream = MemoryStream::new(cpl_xml().into_bytes());
        let mut pkg = package();
        pkg.open(cpl_url.to_str().unwrap(), Some(&mut stream)).unwrap();
        assert!(stream.is_eof());
        assert_eq!(pkg.registry().unwrap().len(), 1);
    }

    #[test]
    fn missing_asset_map_fails_with_io_and_holds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CPL.xml"), cpl_xml()).unwrap();
        let cpl_url = dir.path().join("CPL.xml");

        let mut pkg = package();
        let err = pkg.open(cpl_url.to_str().unwrap(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(pkg.state(), PackageState::Failed);
        assert!(pkg.cpl().is_none());
        assert!(pkg.registry().is_none());
        assert!(pkg.asset_map_url().is_none());

        pkg.close();
        assert_eq!(pkg.state(), PackageState::Closed);
    }

    #[test]
    fn schema_error_carries_cpl_id() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), "<AssetMap><Id>x</Id></AssetMap>");

        let mut pkg = package();
        let err = pkg.open(&cpl_url, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains(CPL_ID));
        assert!(err.to_string().contains("AssetList"));
        assert_eq!(pkg.state(), PackageState::Failed);
    }

    #[test]
    fn empty_asset_map_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), "");

        let mut pkg = package();
        let err = pkg.open(&cpl_url, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn malformed_cpl_fails_before_asset_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("CPL.xml"), "<CompositionPlaylist>").unwrap();
        let cpl_url = dir.path().join("CPL.xml");

        let mut pkg = package();
        let err = pkg.open(cpl_url.to_str().unwrap(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(pkg.state(), PackageState::Failed);
    }

    #[test]
    fn interrupt_aborts_open() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), &asset_map_xml(&[(VIDEO_ID, "v.mxf")]));
        let flag = Arc::new(AtomicBool::new(true));

        let mut pkg = package().with_interrupt(Interrupt::from_flag(flag.clone()));
        let err = pkg.open(&cpl_url, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(flag.load(Ordering::Acquire));
    }

    #[test]
    fn second_open_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), &asset_map_xml(&[]));

        let mut pkg = package();
        pkg.open(&cpl_url, None).unwrap();
        let err = pkg.open(&cpl_url, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(pkg.state(), PackageState::Ready);
        assert!(pkg.registry().unwrap().is_empty());

        pkg.close();
        let err = pkg.open(&cpl_url, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn close_is_idempotent_from_any_state() {
        let mut fresh = package();
        fresh.close();
        fresh.close();
        assert_eq!(fresh.state(), PackageState::Closed);

        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), &asset_map_xml(&[(VIDEO_ID, "v.mxf")]));
        let mut pkg = package();
        pkg.open(&cpl_url, None).unwrap();
        pkg.close();
        assert!(pkg.registry().is_none());
        assert!(pkg.cpl().is_none());
        pkg.close();
        assert_eq!(pkg.state(), PackageState::Closed);
    }

    #[test]
    fn read_packet_reports_end_of_stream_when_ready() {
        let mut pkg = package();
        assert_eq!(pkg.read_packet().unwrap_err().kind(), ErrorKind::InvalidState);

        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), &asset_map_xml(&[]));
        pkg.open(&cpl_url, None).unwrap();
        assert!(pkg.read_packet().unwrap().is_none());

        pkg.close();
        assert!(pkg.read_packet().is_err());
    }

    #[test]
    fn into_parts_transfers_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let cpl_url = write_package(dir.path(), &asset_map_xml(&[(VIDEO_ID, "v.mxf")]));
        let mut pkg = package();
        pkg.open(&cpl_url, None).unwrap();

        let (cpl, registry): (CompositionSummary, AssetRegistry) = pkg.into_parts().unwrap();
        assert_eq!(cpl.content_title.as_deref(), Some("Test"));
        assert_eq!(registry.len(), 1);
        release(Some(registry));

        assert!(package().into_parts().is_err());
    }

    #[test]
    fn looks_like_cpl_matches_xml_extension() {
        assert!(looks_like_cpl("/mnt/imf/pkg/CPL_abc.xml"));
        assert!(looks_like_cpl("CPL.XML"));
        assert!(looks_like_cpl("https://cdn.example/pkg/CPL.xml?sig=1"));
        assert!(!looks_like_cpl("/mnt/imf/pkg/video.mxf"));
        assert!(!looks_like_cpl("/mnt/imf/pkg.xml/video"));
        assert!(!looks_like_cpl(".xml"));
        assert!(!looks_like_cpl("xml"));
    }

    #[test]
    fn state_display() {
        assert_eq!(PackageState::ParsingAssetMap.to_string(), "parsing the asset map");
        assert_eq!(PackageState::Closed.to_string(), "closed");
    }
}
