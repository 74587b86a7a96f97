use crate::node::XmlNode;

/// An element of an owned XML tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element with no text and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style: append direct text.
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.push_text(text.as_ref());
        self
    }

    /// Builder-style: append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_child(child);
        self
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct element children.
    pub fn child_elements(&self) -> &[XmlElement] {
        &self.children
    }
}

impl XmlNode for XmlElement {
    fn tag(&self) -> &str {
        &self.name
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }

    fn raw_text(&self) -> &str {
        &self.text
    }
}

/// A parsed document: the source identifier and the root element, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    source_id: String,
    root: Option<XmlElement>,
}

impl XmlDocument {
    pub fn new(source_id: impl Into<String>, root: Option<XmlElement>) -> Self {
        Self {
            source_id: source_id.into(),
            root,
        }
    }

    /// Identifier the document was parsed from, for diagnostics.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Root element. `None` for a document without any element.
    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }
}
