//! Arena-backed document the page loader reads from and writes into.
//!
//! Invariants:
//! - Node ids are indices into `nodes` and are never reused. Replacing markup detaches the old
//!   subtree (its root loses its parent) instead of freeing it, so stale ids stay valid but
//!   report `is_connected() == false`.
//! - Id(0) is always the document node.
use crate::selector::{SelectorError, SelectorList, parse_selector_list};
use crate::tokenizer::tokenize;
use crate::types::{Element, Id, NodeData, NodeSlot, Token};
use std::fmt;

const DOCUMENT_ID: Id = Id(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    NotAnElement(Id),
    UnknownNode(Id),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::NotAnElement(id) => write!(f, "node {} is not an element", id.0),
            DomError::UnknownNode(id) => write!(f, "node {} does not exist", id.0),
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeSlot {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document { doctype: None },
            }],
        }
    }

    pub fn parse(html: &str) -> Self {
        let mut doc = Self::new();
        doc.insert_tokens(DOCUMENT_ID, tokenize(html));
        doc
    }

    pub fn root(&self) -> Id {
        DOCUMENT_ID
    }

    pub fn data(&self, id: Id) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize).map(|slot| &slot.data)
    }

    pub fn element(&self, id: Id) -> Option<&Element> {
        match self.data(id)? {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: Id) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0 as usize).map(|slot| &mut slot.data)? {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: Id) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn attr(&self, id: Id, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_attr(&self, id: Id, name: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_attr(name))
    }

    pub fn set_attr(&mut self, id: Id, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        let name = name.to_ascii_lowercase();
        match el.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => el.attributes.push((name, Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, id: Id, name: &str) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        el.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn parent(&self, id: Id) -> Option<Id> {
        self.nodes.get(id.0 as usize)?.parent
    }

    pub fn children(&self, id: Id) -> &[Id] {
        self.nodes
            .get(id.0 as usize)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// True when walking parents from `id` reaches the document node.
    pub fn is_connected(&self, id: Id) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == DOCUMENT_ID {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Element descendants of `scope` in tree order, `scope` excluded.
    pub fn descendant_elements(&self, scope: Id) -> Vec<Id> {
        let mut out = Vec::new();
        let mut stack: Vec<Id> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.element(id).is_some() {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, id: Id) -> String {
        fn walk(doc: &Document, id: Id, out: &mut String) {
            match doc.data(id) {
                Some(NodeData::Text(text)) => out.push_str(text),
                Some(NodeData::Element(_)) | Some(NodeData::Document { .. }) => {
                    for &child in doc.children(id) {
                        walk(doc, child, out);
                    }
                }
                _ => {}
            }
        }
        let mut out = String::new();
        walk(self, id, &mut out);
        out
    }

    // --- Selectors ---

    pub fn query_selector(&self, selector: &str) -> Result<Option<Id>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self
            .descendant_elements(DOCUMENT_ID)
            .into_iter()
            .find(|&id| list.matches(self, id)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Id>, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(self.select_all(&list))
    }

    pub fn select_all(&self, list: &SelectorList) -> Vec<Id> {
        self.descendant_elements(DOCUMENT_ID)
            .into_iter()
            .filter(|&id| list.matches(self, id))
            .collect()
    }

    pub fn matches(&self, id: Id, selector: &str) -> Result<bool, SelectorError> {
        let list = parse_selector_list(selector)?;
        Ok(list.matches(self, id))
    }

    pub fn element_by_id(&self, wanted: &str) -> Option<Id> {
        self.descendant_elements(DOCUMENT_ID)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(wanted))
    }

    // --- Markup ---

    pub fn inner_html(&self, id: Id) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            crate::serialize::write_node(self, child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: Id) -> String {
        let mut out = String::new();
        crate::serialize::write_node(self, id, &mut out);
        out
    }

    /// Replace the children of `id` with the parsed `html`. Old children are detached.
    pub fn set_inner_html(&mut self, id: Id, html: &str) -> Result<(), DomError> {
        match self.data(id) {
            Some(NodeData::Element(_)) | Some(NodeData::Document { .. }) => {}
            Some(_) => return Err(DomError::NotAnElement(id)),
            None => return Err(DomError::UnknownNode(id)),
        }

        let old = std::mem::take(&mut self.nodes[id.0 as usize].children);
        log::trace!(target: "html.dom", "replacing {} children of node {}", old.len(), id.0);
        for child in old {
            self.nodes[child.0 as usize].parent = None;
        }
        self.insert_tokens(id, tokenize(html));
        Ok(())
    }

    fn push_node(&mut self, parent: Id, data: NodeData) -> Id {
        let id = Id(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    fn insert_tokens(&mut self, parent: Id, tokens: Vec<Token>) {
        let mut open: Vec<Id> = Vec::new();

        for token in tokens {
            let current = open.last().copied().unwrap_or(parent);
            match token {
                Token::Doctype(dt) => {
                    if let NodeData::Document { doctype } = &mut self.nodes[parent.0 as usize].data
                    {
                        *doctype = Some(dt);
                    }
                }
                Token::Comment(text) => {
                    self.push_node(current, NodeData::Comment(text));
                }
                Token::Text(text) => {
                    self.push_node(current, NodeData::Text(text));
                }
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    if let Some(&top) = open.last()
                        && self.closes_implicitly(top, &name)
                    {
                        open.pop();
                    }
                    let current = open.last().copied().unwrap_or(parent);
                    let mut element = Element::new(&name, attributes);
                    seed_control_state(&mut element);
                    let id = self.push_node(current, NodeData::Element(element));
                    if !self_closing {
                        open.push(id);
                    }
                }
                Token::EndTag(name) => {
                    // Unmatched end tags are dropped rather than closing everything.
                    if let Some(pos) = open
                        .iter()
                        .rposition(|&id| self.tag_name(id) == Some(name.as_str()))
                    {
                        open.truncate(pos);
                    }
                }
            }
        }
    }

    fn closes_implicitly(&self, open: Id, incoming: &str) -> bool {
        let Some(open_name) = self.tag_name(open) else {
            return false;
        };
        matches!(
            (open_name, incoming),
            ("option", "option") | ("option", "optgroup") | ("li", "li") | ("p", "p")
        )
    }

    // --- Form control state ---

    pub fn checked(&self, id: Id) -> bool {
        self.element(id).is_some_and(|el| el.control.checked)
    }

    pub fn set_checked(&mut self, id: Id, checked: bool) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        el.control.checked = checked;
        Ok(())
    }

    pub fn selected(&self, id: Id) -> bool {
        self.element(id).is_some_and(|el| el.control.selected)
    }

    pub fn set_selected(&mut self, id: Id, selected: bool) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        el.control.selected = selected;
        Ok(())
    }

    /// Current value of an `input`, `textarea`, `button`, `option` or `select`.
    pub fn value(&self, id: Id) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        if let Some(value) = &el.control.value {
            return value.clone();
        }
        match el.name.as_str() {
            "textarea" => self.text_content(id),
            "option" => match el.attr("value") {
                Some(v) => v.to_string(),
                None => collapse_whitespace(&self.text_content(id)),
            },
            "select" => self
                .selected_options(id)
                .first()
                .map(|&opt| self.value(opt))
                .unwrap_or_default(),
            "input" => match el.attr("value") {
                Some(v) => v.to_string(),
                None if matches!(crate::forms::input_type(el), "checkbox" | "radio") => {
                    "on".to_string()
                }
                None => String::new(),
            },
            _ => el.attr("value").unwrap_or("").to_string(),
        }
    }

    pub fn set_value(&mut self, id: Id, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id).ok_or(DomError::NotAnElement(id))?;
        el.control.value = Some(value.to_string());
        Ok(())
    }

    /// `option` descendants of a `select`, in tree order.
    pub fn options(&self, select: Id) -> Vec<Id> {
        self.descendant_elements(select)
            .into_iter()
            .filter(|&id| self.tag_name(id) == Some("option"))
            .collect()
    }

    /// Selected options of a `select`. A single-select with nothing marked selected
    /// falls back to its first option.
    pub fn selected_options(&self, select: Id) -> Vec<Id> {
        let options = self.options(select);
        let selected: Vec<Id> = options.iter().copied().filter(|&o| self.selected(o)).collect();
        if !selected.is_empty() || self.has_attr(select, "multiple") {
            return selected;
        }
        options.into_iter().take(1).collect()
    }
}

fn seed_control_state(element: &mut Element) {
    match element.name.as_str() {
        "input" => element.control.checked = element.has_attr("checked"),
        "option" => element.control.selected = element.has_attr("selected"),
        _ => {}
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
