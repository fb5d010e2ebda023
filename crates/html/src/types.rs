pub type NodeId = u32;

/// Stable identity of a node inside a [`crate::Document`]. Ids are never reused,
/// so an id that outlives its node simply stops resolving to a connected element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document { doctype: Option<String> },
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, Option<String>)>,
    pub(crate) control: ControlState,
}

impl Element {
    pub fn new(name: &str, attributes: Vec<(String, Option<String>)>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes,
            control: ControlState::default(),
        }
    }

    /// `Some("")` for attributes present without a value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }
}

/// Live form-control state. Seeded from the markup when the element is inserted,
/// then owned by the document (attributes are not rewritten on change).
#[derive(Debug, Clone, Default)]
pub(crate) struct ControlState {
    pub value: Option<String>,
    pub checked: bool,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeSlot {
    pub parent: Option<Id>,
    pub children: Vec<Id>,
    pub data: NodeData,
}
