//! Declarative configuration read from an element's attributes.
use html::{Document, Id};

pub const DATA_URL: &str = "data-url";
pub const HREF: &str = "href";
pub const DATA_METHOD: &str = "data-method";
pub const DATA_TARGET: &str = "data-target";
pub const DATA_REDIRECT_URL: &str = "data-redirect-url";
pub const DATA_REFRESH_TARGET: &str = "data-refresh-target";
pub const DATA_AJAX_EVENTS: &str = "data-ajax-events";
pub const ONCLICK: &str = "onclick";

/// The element's attribute when present (an empty value counts as present), else `default`.
pub fn resolve<'a>(
    doc: &'a Document,
    element: Id,
    attribute: &str,
    default: Option<&'a str>,
) -> Option<&'a str> {
    doc.attr(element, attribute).or(default)
}

/// Hooks run unless the element opts out with `data-ajax-events="false"`.
pub fn events_enabled(doc: &Document, element: Id) -> bool {
    resolve(doc, element, DATA_AJAX_EVENTS, None) != Some("false")
}
