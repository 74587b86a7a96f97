use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::{XmlError, XmlResult};
use crate::tree::{XmlDocument, XmlElement};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `bytes` into an owned tree.
///
/// `source_id` (usually the document URL) is only used in diagnostics.
/// Comments, processing instructions, declarations and DOCTYPE are skipped.
/// A document holding no element parses to an [`XmlDocument`] without a root.
pub fn parse_document(bytes: &[u8], source_id: &str) -> XmlResult<XmlDocument> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| XmlError::Encoding {
        source_id: source_id.to_string(),
        position: e.valid_up_to() as u64,
    })?;

    let mut reader = Reader::from_str(text);
    let mut builder = TreeBuilder::new(source_id);

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| builder.malformed(position, e.to_string()))?;
        match event {
            Event::Start(start) => {
                let name = builder.element_name(&start, position)?;
                builder.open(name);
            }
            Event::Empty(start) => {
                let name = builder.element_name(&start, position)?;
                builder.open(name);
                builder.close(position)?;
            }
            Event::End(_) => builder.close(position)?,
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| builder.malformed(position, e.to_string()))?;
                builder.text(&text, position)?;
            }
            Event::CData(cdata) => {
                let text = std::str::from_utf8(&cdata).map_err(|e| XmlError::Encoding {
                    source_id: source_id.to_string(),
                    position: position + e.valid_up_to() as u64,
                })?;
                builder.text(text, position)?;
            }
            Event::Eof => break,
            // declarations, comments, PIs, DOCTYPE
            _ => {}
        }
    }

    let end = reader.buffer_position() as u64;
    builder.finish(end)
}

/// Stack of open elements plus the finished root.
struct TreeBuilder<'s> {
    source_id: &'s str,
    open: Vec<XmlElement>,
    root: Option<XmlElement>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source_id: &'s str) -> Self {
        Self {
            source_id,
            open: Vec::new(),
            root: None,
        }
    }

    fn malformed(&self, position: u64, reason: impl Into<String>) -> XmlError {
        XmlError::Malformed {
            source_id: self.source_id.to_string(),
            position,
            reason: reason.into(),
        }
    }

    fn element_name(&self, start: &BytesStart<'_>, position: u64) -> XmlResult<String> {
        let local = start.local_name();
        std::str::from_utf8(local.as_ref())
            .map(str::to_owned)
            .map_err(|_| XmlError::Encoding {
                source_id: self.source_id.to_string(),
                position,
            })
    }

    fn open(&mut self, name: String) {
        trace!(element = %name, depth = self.open.len(), "open element");
        self.open.push(XmlElement::new(name));
    }

    fn close(&mut self, position: u64) -> XmlResult<()> {
        let element = self
            .open
            .pop()
            .ok_or_else(|| self.malformed(position, "end tag without matching start tag"))?;
        if let Some(parent) = self.open.last_mut() {
            parent.push_child(element);
            return Ok(());
        }
        if self.root.is_some() {
            return Err(self.malformed(position, "more than one root element"));
        }
        self.root = Some(element);
        Ok(())
    }

    fn text(&mut self, text: &str, position: u64) -> XmlResult<()> {
        if let Some(element) = self.open.last_mut() {
            element.push_text(text);
            return Ok(());
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        Err(self.malformed(position, "text outside the root element"))
    }

    fn finish(self, position: u64) -> XmlResult<XmlDocument> {
        if let Some(unclosed) = self.open.last() {
            let reason = format!("unclosed element <{}>", unclosed.name());
            return Err(self.malformed(position, reason));
        }
        Ok(XmlDocument::new(self.source_id, self.root))
    }
}
