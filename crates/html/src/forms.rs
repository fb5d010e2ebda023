//! Form association and control classification.
use crate::dom::Document;
use crate::types::{Element, Id};

const KNOWN_INPUT_TYPES: &[&str] = &[
    "button",
    "checkbox",
    "color",
    "date",
    "datetime-local",
    "email",
    "file",
    "hidden",
    "image",
    "month",
    "number",
    "password",
    "radio",
    "range",
    "reset",
    "search",
    "submit",
    "tel",
    "text",
    "time",
    "url",
    "week",
];

/// Normalized `type` of an `<input>`: lower case, unknown or missing values become `text`.
pub fn input_type(el: &Element) -> &'static str {
    let raw = el.attr("type").map(str::trim).unwrap_or("");
    KNOWN_INPUT_TYPES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(raw))
        .unwrap_or("text")
}

/// `select-one` or `select-multiple`.
pub fn select_type(el: &Element) -> &'static str {
    if el.has_attr("multiple") {
        "select-multiple"
    } else {
        "select-one"
    }
}

fn is_listed(el: &Element) -> bool {
    matches!(
        el.name.as_str(),
        "button" | "fieldset" | "input" | "object" | "output" | "select" | "textarea"
    )
}

impl Document {
    /// The form owning `id`: the one named by its `form` attribute, else the nearest
    /// ancestor `<form>`.
    pub fn form_owner(&self, id: Id) -> Option<Id> {
        let el = self.element(id)?;
        if let Some(form_id) = el.attr("form") {
            return self
                .element_by_id(form_id)
                .filter(|&f| self.tag_name(f) == Some("form"));
        }
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if self.tag_name(current) == Some("form") {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Listed form-associated elements of `form` in tree order (the DOM's `form.elements`).
    pub fn form_elements(&self, form: Id) -> Vec<Id> {
        if self.tag_name(form) != Some("form") {
            return Vec::new();
        }
        self.descendant_elements(self.root())
            .into_iter()
            .filter(|&id| {
                self.element(id).is_some_and(is_listed) && self.form_owner(id) == Some(form)
            })
            .collect()
    }

    pub fn is_disabled(&self, id: Id) -> bool {
        if self.has_attr(id, "disabled") {
            return true;
        }
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if self.tag_name(current) == Some("fieldset") && self.has_attr(current, "disabled") {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}
