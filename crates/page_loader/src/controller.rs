//! Per-element interaction state and request resolution.
//!
//! Invariants:
//! - One `InteractionController` per element; the page loader's registry enforces it.
//! - A resolved method is always lower case and falls back to GET only when nothing in the
//!   element/form/loader chain declares one.
use crate::attributes::{self, DATA_METHOD, DATA_REDIRECT_URL, DATA_TARGET, DATA_URL, HREF};
use crate::error::LoaderError;
use crate::form_controls::{
    append_query, encode_entry, form_data_entries, serialize_for_get, submitter_entry,
};
use crate::hooks::ClickGuard;
use core_types::{CycleId, Method};
use html::{Document, Id};
use net::{FetchRequest, RequestBody};
use url::Url;

/// Where an interaction cycle stands. `Finalized` and `Errored` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Resolving,
    Requesting,
    RedirectFollowing,
    Updating,
    Finalized,
    Errored,
}

/// Loader-wide fallbacks consulted while resolving a request.
pub struct ResolveDefaults<'a> {
    pub target: Option<Id>,
    pub method: &'a Method,
}

/// Everything decided at click time, before any hook runs.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRequest {
    /// The URL as declared, GET query already folded in. Not yet made absolute.
    pub url: String,
    pub method: Method,
    pub form: Option<Id>,
    pub target: Option<Id>,
    /// Absolute URL of the follow-up GET, when the element declares one.
    pub redirect_url: Option<String>,
    pub request: FetchRequest,
}

pub struct InteractionController {
    element: Id,
    click_guard: Option<ClickGuard>,
    recorded_redirect: Option<String>,
    last_phase: Option<CyclePhase>,
}

impl InteractionController {
    pub(crate) fn new(element: Id, click_guard: Option<ClickGuard>) -> Self {
        Self {
            element,
            click_guard,
            recorded_redirect: None,
            last_phase: None,
        }
    }

    pub fn element(&self) -> Id {
        self.element
    }

    pub fn has_click_guard(&self) -> bool {
        self.click_guard.is_some()
    }

    pub(crate) fn click_guard(&self) -> Option<ClickGuard> {
        self.click_guard.clone()
    }

    /// Final URL of an earlier redirected submission, reused as the form URL.
    pub fn recorded_redirect(&self) -> Option<&str> {
        self.recorded_redirect.as_deref()
    }

    pub(crate) fn record_redirect(&mut self, url: String) {
        self.recorded_redirect = Some(url);
    }

    /// Terminal phase of the most recent cycle, if one has ended.
    pub fn last_phase(&self) -> Option<CyclePhase> {
        self.last_phase
    }

    pub(crate) fn set_last_phase(&mut self, phase: CyclePhase) {
        self.last_phase = Some(phase);
    }

    /// A hyperlink is anything carrying `href`; everything else is a form trigger.
    pub fn is_link(&self, doc: &Document) -> bool {
        doc.has_attr(self.element, HREF)
    }

    pub fn resolve(
        &self,
        doc: &Document,
        location: &Url,
        defaults: &ResolveDefaults<'_>,
    ) -> Result<ResolvedRequest, LoaderError> {
        let el = self.element;
        if doc.element(el).is_none() {
            return Err(LoaderError::UnknownElement(el));
        }

        let is_link = self.is_link(doc);
        let form = if is_link { None } else { doc.form_owner(el) };
        let method = match form {
            _ if is_link => Method::Get,
            Some(form) => Method::parse(doc.attr(form, "method").unwrap_or("post")),
            None => attributes::resolve(doc, el, DATA_METHOD, None)
                .map(Method::parse)
                .unwrap_or_else(|| defaults.method.clone()),
        };

        let mut url = self.declared_url(doc, location, is_link, form)?;
        let mut body = RequestBody::Empty;
        if let Some(form) = form {
            let submitter = submitter_entry(doc, el);
            if method.is_get() {
                let mut query = serialize_for_get(doc, Some(form));
                if let Some(entry) = submitter {
                    if !query.is_empty() {
                        query.push('&');
                    }
                    query.push_str(&encode_entry(&entry));
                }
                url = append_query(&url, &query);
            } else {
                let mut entries = form_data_entries(doc, form);
                entries.extend(submitter);
                body = RequestBody::Multipart(entries);
            }
        }

        let absolute = absolutize(location, &url)?;
        let redirect_url = attributes::resolve(doc, el, DATA_REDIRECT_URL, None)
            .map(|raw| absolutize(location, raw))
            .transpose()?;

        Ok(ResolvedRequest {
            url,
            method: method.clone(),
            form,
            target: self.target(doc, defaults.target),
            redirect_url,
            request: FetchRequest {
                url: absolute,
                method,
                body,
            },
        })
    }

    fn declared_url(
        &self,
        doc: &Document,
        location: &Url,
        is_link: bool,
        form: Option<Id>,
    ) -> Result<String, LoaderError> {
        let el = self.element;
        if let Some(url) = attributes::resolve(doc, el, DATA_URL, None) {
            return Ok(url.to_string());
        }
        if is_link {
            if let Some(href) = doc.attr(el, HREF) {
                return Ok(href.to_string());
            }
        }
        let Some(form) = form else {
            return Err(LoaderError::NoUrl(el));
        };
        if let Some(recorded) = &self.recorded_redirect {
            return Ok(recorded.clone());
        }
        Ok(doc
            .attr(form, "action")
            .map(str::to_string)
            .unwrap_or_else(|| location.to_string()))
    }

    fn target(&self, doc: &Document, default: Option<Id>) -> Option<Id> {
        let Some(selector) = attributes::resolve(doc, self.element, DATA_TARGET, None) else {
            return default.filter(|&t| doc.is_connected(t));
        };
        match doc.query_selector(selector) {
            Ok(found) => found,
            Err(err) => {
                log::warn!(target: "page_loader", "ignoring data-target on {:?}: {err}", self.element);
                None
            }
        }
    }
}

fn absolutize(location: &Url, raw: &str) -> Result<String, LoaderError> {
    location
        .join(raw)
        .map(|u| u.to_string())
        .map_err(|e| LoaderError::InvalidUrl {
            url: raw.to_string(),
            message: e.to_string(),
        })
}

/// Ephemeral state of one click-to-finalization run.
pub(crate) struct InteractionSession {
    pub cycle: CycleId,
    pub element: Id,
    pub target: Option<Id>,
    pub is_form: bool,
    pub redirect_url: Option<String>,
    pub events: bool,
    pub refresh_targets: bool,
    /// Target whose loading indicator this cycle holds a share of.
    pub indicator: Option<Id>,
    pub phase: CyclePhase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use net::FormEntry;

    fn location() -> Url {
        Url::parse("http://example.test/page").unwrap()
    }

    fn resolve(doc: &Document, id: &str) -> Result<ResolvedRequest, LoaderError> {
        let el = doc.element_by_id(id).unwrap();
        let defaults = ResolveDefaults {
            target: doc.query_selector("body").unwrap(),
            method: &Method::Get,
        };
        InteractionController::new(el, None).resolve(doc, &location(), &defaults)
    }

    #[test]
    fn data_url_wins_over_href() {
        let doc = Document::parse(r#"<body><a id="a" href="/b" data-url="/a">x</a></body>"#);
        let resolved = resolve(&doc, "a").unwrap();
        assert_eq!(resolved.url, "/a");
        assert_eq!(resolved.request.url, "http://example.test/a");
        assert_eq!(resolved.method, Method::Get);
        assert_eq!(resolved.form, None);
    }

    #[test]
    fn links_ignore_their_surrounding_form() {
        let doc = Document::parse(
            r#"<form method="post" action="/save"><input name="q" value="1"><a id="a" href="/next">n</a></form>"#,
        );
        let resolved = resolve(&doc, "a").unwrap();
        assert_eq!(resolved.request.url, "http://example.test/next");
        assert_eq!(resolved.method, Method::Get);
        assert_eq!(resolved.request.body, RequestBody::Empty);
    }

    #[test]
    fn get_form_folds_fields_into_the_action() {
        let doc = Document::parse(
            r#"<form action="/search" method="GET"><input name="q" value="hello"><input name="page" value="2"><button id="b" type="submit">Go</button></form>"#,
        );
        let resolved = resolve(&doc, "b").unwrap();
        assert_eq!(resolved.url, "/search?page=2&q=hello");
        assert_eq!(resolved.request.url, "http://example.test/search?page=2&q=hello");
        assert_eq!(resolved.method, Method::Get);
    }

    #[test]
    fn get_form_appends_the_named_button_last() {
        let doc = Document::parse(
            r#"<form action="/list?sort=asc" method="get"><input name="q" value="a b"><button id="b" name="go" value="next page">Go</button></form>"#,
        );
        let resolved = resolve(&doc, "b").unwrap();
        assert_eq!(resolved.url, "/list?sort=asc&go=next%20page&q=a%20b&go=next%20page");
    }

    #[test]
    fn get_form_encodes_the_submitter_name() {
        let doc = Document::parse(
            r#"<form action="/list" method="get"><button id="b" name="a&amp;b=c" value="1">Go</button></form>"#,
        );
        let resolved = resolve(&doc, "b").unwrap();
        assert!(resolved.url.ends_with("&a%26b%3Dc=1"), "{}", resolved.url);
    }

    #[test]
    fn form_method_defaults_to_post_with_multipart_body() {
        let doc = Document::parse(
            r#"<form><input name="title" value="Hi"><input type="submit" id="s" name="save" value="Save"></form>"#,
        );
        let resolved = resolve(&doc, "s").unwrap();
        assert_eq!(resolved.method, Method::Post);
        assert_eq!(resolved.url, "http://example.test/page");
        assert_eq!(
            resolved.request.body,
            RequestBody::Multipart(vec![FormEntry::new("title", "Hi"), FormEntry::new("save", "Save")])
        );
    }

    #[test]
    fn data_method_applies_outside_forms() {
        let doc = Document::parse(r#"<button id="b" data-url="/item/1" data-method="DELETE">x</button><button id="c" data-url="/c">y</button>"#);
        assert_eq!(resolve(&doc, "b").unwrap().method, Method::Other("delete".to_string()));
        assert_eq!(resolve(&doc, "c").unwrap().method, Method::Get);
    }

    #[test]
    fn no_url_is_an_error() {
        let doc = Document::parse(r#"<button id="b">x</button>"#);
        assert!(matches!(resolve(&doc, "b"), Err(LoaderError::NoUrl(_))));
    }

    #[test]
    fn recorded_redirect_replaces_the_form_action() {
        let doc = Document::parse(r#"<form action="/save" method="post"><button id="b">x</button></form>"#);
        let el = doc.element_by_id("b").unwrap();
        let mut controller = InteractionController::new(el, None);
        controller.record_redirect("http://example.test/saved/7".to_string());
        let defaults = ResolveDefaults {
            target: None,
            method: &Method::Get,
        };
        let resolved = controller.resolve(&doc, &location(), &defaults).unwrap();
        assert_eq!(resolved.request.url, "http://example.test/saved/7");
    }

    #[test]
    fn target_and_redirect_are_resolved() {
        let doc = Document::parse(
            r##"<body><div id="main"></div><a id="a" href="/x" data-target="#main" data-redirect-url="/r">x</a><a id="d" href="/y">y</a><a id="missing" href="/z" data-target="#nope">z</a></body>"##,
        );
        let a = resolve(&doc, "a").unwrap();
        assert_eq!(a.target, doc.element_by_id("main"));
        assert_eq!(a.redirect_url.as_deref(), Some("http://example.test/r"));
        assert_eq!(resolve(&doc, "d").unwrap().target, doc.query_selector("body").unwrap());
        assert_eq!(resolve(&doc, "missing").unwrap().target, None);
    }
}
