mod common;

use common::Harness;
use page_loader::{DEFAULT_SELECTOR, LoaderError, LoadingKind, PageLoaderConfig};

const PAGE: &str = r##"<body>
  <nav><a id="home" href="/" data-ajax="true">Home</a><a id="plain" href="/about">About</a></nav>
  <form action="/search" method="get">
    <input id="submit-input" type="submit" data-ajax="true">
    <button id="submit-button" type="submit" data-ajax="true">Go</button>
    <button id="reset" type="reset" data-ajax="true">Reset</button>
  </form>
  <div id="content"></div>
</body>"##;

#[test]
fn construction_wires_the_default_selector() {
    let h = Harness::new(PAGE);
    assert_eq!(h.loader.selector(), DEFAULT_SELECTOR);
    assert_eq!(h.loader.controller_count(), 3);
    assert!(h.loader.is_wired(h.id("home")));
    assert!(h.loader.is_wired(h.id("submit-input")));
    assert!(h.loader.is_wired(h.id("submit-button")));
    assert!(!h.loader.is_wired(h.id("plain")));
    assert!(!h.loader.is_wired(h.id("reset")));
}

#[test]
fn rescanning_with_the_same_selector_is_idempotent() {
    let mut h = Harness::new(PAGE);
    assert_eq!(h.loader.set_selector(DEFAULT_SELECTOR).unwrap(), 0);
    assert_eq!(h.loader.set_selector(DEFAULT_SELECTOR).unwrap(), 0);
    assert_eq!(h.loader.controller_count(), 3);
}

#[test]
fn new_selector_only_adds_unwired_elements() {
    let mut h = Harness::new(PAGE);
    assert_eq!(h.loader.set_selector("nav a").unwrap(), 1);
    assert_eq!(h.loader.controller_count(), 4);
    assert!(h.loader.is_wired(h.id("plain")));
}

#[test]
fn invalid_selector_is_rejected_and_keeps_the_old_one() {
    let mut h = Harness::new(PAGE);
    let err = h.loader.set_selector("a:hover").unwrap_err();
    assert!(matches!(err, LoaderError::Selector(_)));
    assert_eq!(h.loader.selector(), DEFAULT_SELECTOR);
}

#[test]
fn replaced_markup_is_wired_and_detached_elements_are_dropped() {
    let mut h = Harness::new(
        r##"<body><div id="list"><a id="old" href="/p/1" data-ajax="true" data-target="#list">1</a></div></body>"##,
    );
    let old = h.id("old");
    assert_eq!(h.loader.controller_count(), 1);

    h.loader.click(old);
    let sent = h.single();
    h.respond(
        &sent,
        r##"<a id="p1" href="/p/1" data-ajax="true" data-target="#list">1</a><a id="p2" href="/p/2" data-ajax="true" data-target="#list">2</a>"##,
    );
    assert!(!h.loader.is_wired(old));
    assert!(h.loader.is_wired(h.id("p1")));
    assert!(h.loader.is_wired(h.id("p2")));
    assert_eq!(h.loader.controller_count(), 2);
}

#[test]
fn default_target_and_method_follow_their_setters() {
    let mut h = Harness::new(
        r#"<body><main id="main"></main><button id="b" type="submit" data-ajax="true" data-url="/b">x</button></body>"#,
    );
    let b = h.id("b");
    assert_eq!(h.loader.default_target(), h.doc().query_selector("body").unwrap());
    assert_eq!(h.loader.resolve_request(b).unwrap().method.as_str(), "get");

    h.loader.set_default_target("main").unwrap();
    h.loader.set_default_method("PATCH");
    let resolved = h.loader.resolve_request(b).unwrap();
    assert_eq!(resolved.target, Some(h.id("main")));
    assert_eq!(resolved.method.as_str(), "patch");

    h.loader.set_default_target("#nowhere").unwrap();
    assert_eq!(h.loader.resolve_request(b).unwrap().target, None);
}

#[test]
fn default_target_element_is_used_as_given() {
    let mut h = Harness::new(
        r#"<body><main id="main"></main><aside id="side"></aside><button id="b" data-ajax="true" data-url="/b">x</button></body>"#,
    );
    let (b, side) = (h.id("b"), h.id("side"));
    h.loader.set_default_target_element(Some(side));
    assert_eq!(h.loader.default_target(), Some(side));
    assert_eq!(h.loader.resolve_request(b).unwrap().target, Some(side));

    h.loader.set_default_target_element(None);
    assert_eq!(h.loader.resolve_request(b).unwrap().target, None);
}

#[test]
fn config_drives_the_initial_state() {
    let config = PageLoaderConfig::from_toml(
        r#"
        selector = "a.ajax"
        default_target = "section"
        default_method = "post"
        loading_type = "Blinking"
        "#,
    )
    .unwrap();
    let h = Harness::with(
        r#"<body><section id="s"></section><a id="a" class="ajax" href="/a">a</a><a href="/b">b</a></body>"#,
        config,
        page_loader::HookRegistry::new(),
    );
    assert_eq!(h.loader.controller_count(), 1);
    assert!(h.loader.is_wired(h.id("a")));
    assert_eq!(h.loader.default_target(), Some(h.id("s")));
    assert_eq!(h.loader.default_method().as_str(), "post");
    assert_eq!(h.loader.loading_type(), Some(LoadingKind::Blinking));
}

#[test]
fn unknown_elements_cannot_be_resolved() {
    let h = Harness::new(PAGE);
    let plain = h.id("plain");
    assert!(matches!(
        h.loader.resolve_request(plain),
        Err(LoaderError::UnknownElement(id)) if id == plain
    ));
}
