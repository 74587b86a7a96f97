/// Compare an element tag with an expected name, ignoring ASCII case.
///
/// The single place where tag matching is decided.
pub fn tag_matches(tag: &str, expected: &str) -> bool {
    tag.eq_ignore_ascii_case(expected)
}

/// Read-only query interface over an element of an XML tree.
///
/// Implementors provide the tag, direct element children in document order,
/// and the raw direct text. Lookups by name are provided on top and always
/// use [`tag_matches`].
pub trait XmlNode {
    /// Local name of the element.
    fn tag(&self) -> &str;

    /// Direct element children, in document order.
    fn children(&self) -> impl Iterator<Item = &Self>;

    /// Direct text content, untrimmed.
    fn raw_text(&self) -> &str;

    /// Trimmed text content; `None` when empty or whitespace-only.
    fn text(&self) -> Option<&str> {
        let text = self.raw_text().trim();
        (!text.is_empty()).then_some(text)
    }

    /// Whether this element's tag matches `name`.
    fn is(&self, name: &str) -> bool {
        tag_matches(self.tag(), name)
    }

    /// First direct child named `name`.
    fn find_child(&self, name: &str) -> Option<&Self> {
        self.children().find(|child| child.is(name))
    }

    /// All direct children named `name`, in document order.
    fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children().filter(move |child| child.is(name))
    }

    /// Trimmed text of the first direct child named `name`.
    fn child_text(&self, name: &str) -> Option<&str> {
        self.find_child(name).and_then(|child| child.text())
    }
}
