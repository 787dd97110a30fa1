use goml_variant::Variant;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    pub tag: String,                          // e.g. "mesh"
    pub attributes: IndexMap<String, Variant>, // source order
    pub children: Vec<MarkupNode>,
    pub self_closing: bool, // true for <mesh/>
    pub line: usize,
}

impl MarkupElement {
    pub fn attribute(&self, name: &str) -> Option<&Variant> {
        self.attributes.get(name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &MarkupElement> {
        self.children.iter().filter_map(|c| match c {
            MarkupNode::Element(e) => Some(e),
            MarkupNode::Text(_) => None,
        })
    }
}

/// A parsed `.goml` file: top-level elements plus the `@name = value`
/// declarations, already substituted into every attribute that used them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupDocument {
    pub declarations: IndexMap<String, Variant>,
    pub roots: Vec<MarkupElement>,
}
