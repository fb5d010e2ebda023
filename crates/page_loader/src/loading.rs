//! Visual feedback on a target region while its content is being fetched.
use html::{Document, Id};

pub const BLINKING_CLASS: &str = "page-loader-blinking";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadingKind {
    Blinking,
}

impl LoadingKind {
    /// Parse a configured kind name. Empty means no indicator; unknown names are
    /// reported and also mean no indicator.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if name.eq_ignore_ascii_case("blinking") {
            return Some(LoadingKind::Blinking);
        }
        log::warn!(target: "page_loader.loading", "unknown loading type `{name}`, no indicator");
        None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadingKind::Blinking => "blinking",
        }
    }

    pub fn indicator(self) -> Box<dyn LoadingIndicator> {
        match self {
            LoadingKind::Blinking => Box::new(Blinking::default()),
        }
    }
}

pub trait LoadingIndicator {
    fn start(&mut self, doc: &mut Document, target: Id);
    /// Must be safe to call more than once.
    fn stop(&mut self, doc: &mut Document);
}

/// Marks the region with [`BLINKING_CLASS`] for the stylesheet to animate.
#[derive(Debug, Default)]
pub struct Blinking {
    target: Option<Id>,
}

impl LoadingIndicator for Blinking {
    fn start(&mut self, doc: &mut Document, target: Id) {
        let classes = doc.attr(target, "class").unwrap_or("");
        if !classes.split_ascii_whitespace().any(|c| c == BLINKING_CLASS) {
            let updated = if classes.trim().is_empty() {
                BLINKING_CLASS.to_string()
            } else {
                format!("{} {BLINKING_CLASS}", classes.trim())
            };
            if doc.set_attr(target, "class", &updated).is_err() {
                return;
            }
        }
        self.target = Some(target);
    }

    fn stop(&mut self, doc: &mut Document) {
        let Some(target) = self.target.take() else {
            return;
        };
        let Some(classes) = doc.attr(target, "class") else {
            return;
        };
        let remaining: Vec<&str> = classes
            .split_ascii_whitespace()
            .filter(|c| *c != BLINKING_CLASS)
            .collect();
        let result = if remaining.is_empty() {
            doc.remove_attr(target, "class")
        } else {
            let joined = remaining.join(" ");
            doc.set_attr(target, "class", &joined)
        };
        if let Err(err) = result {
            log::debug!(target: "page_loader.loading", "could not clear indicator: {err}");
        }
    }
}
