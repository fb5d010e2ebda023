#![allow(dead_code)]

use bus::{CoreCommand, CoreEvent};
use core_types::{RequestId, RequestKind};
use html::{Document, Id};
use net::{FetchError, FetchRequest, FetchResponse};
use page_loader::{HookEvent, HookKind, HookRegistry, PageLoader, PageLoaderConfig, Window};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use url::Url;

pub const LOCATION: &str = "http://example.test/app";

/// A loader whose runtime side is the test itself.
pub struct Harness {
    pub loader: PageLoader,
    pub cmd_rx: Receiver<CoreCommand>,
}

pub struct Sent {
    pub request_id: RequestId,
    pub kind: RequestKind,
    pub request: FetchRequest,
}

impl Harness {
    pub fn new(html: &str) -> Self {
        Self::with(html, PageLoaderConfig::default(), HookRegistry::new())
    }

    pub fn with(html: &str, config: PageLoaderConfig, registry: HookRegistry) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let (bus, runtime) = bus::bus();
        let window = Window::new(
            Document::parse(html),
            Url::parse(LOCATION).unwrap(),
            bus.cmd_tx.clone(),
        );
        let loader = PageLoader::with_registry(window, config, registry).unwrap();
        Self {
            loader,
            cmd_rx: runtime.cmd_rx,
        }
    }

    pub fn doc(&self) -> &Document {
        self.loader.document()
    }

    pub fn id(&self, id: &str) -> Id {
        self.doc()
            .element_by_id(id)
            .unwrap_or_else(|| panic!("no element #{id}"))
    }

    /// Every command sent since the last call.
    pub fn sent(&self) -> Vec<Sent> {
        self.cmd_rx
            .try_iter()
            .map(|cmd| match cmd {
                CoreCommand::Fetch {
                    request_id,
                    kind,
                    request,
                } => Sent {
                    request_id,
                    kind,
                    request,
                },
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    pub fn single(&self) -> Sent {
        let mut sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one request");
        sent.remove(0)
    }

    pub fn respond(&mut self, sent: &Sent, body: &str) {
        self.respond_from(sent, &sent.request.url, body);
    }

    /// Answer `sent` as if the transport ended up at `final_url`.
    pub fn respond_from(&mut self, sent: &Sent, final_url: &str, body: &str) {
        self.loader.on_core_event(CoreEvent::FetchDone {
            request_id: sent.request_id,
            kind: sent.kind,
            response: FetchResponse {
                requested_url: sent.request.url.clone(),
                url: final_url.to_string(),
                redirected: final_url != sent.request.url,
                status: 200,
                content_type: Some("text/html".to_string()),
                body: body.to_string(),
                duration_ms: 1,
            },
        });
    }

    pub fn fail(&mut self, sent: &Sent, status: u16) {
        self.loader.on_core_event(CoreEvent::FetchFailed {
            request_id: sent.request_id,
            kind: sent.kind,
            url: sent.request.url.clone(),
            error: FetchError::Status {
                url: sent.request.url.clone(),
                status,
            },
        });
    }
}

pub type HookLog = Rc<RefCell<Vec<(HookKind, Id)>>>;

/// A registry with one handler per hook kind, named after its attribute, that records calls.
pub fn recording_registry() -> (HookRegistry, HookLog) {
    let log: HookLog = Rc::new(RefCell::new(Vec::new()));
    let mut registry = HookRegistry::new();
    for kind in HookKind::ALL {
        let sink = Rc::clone(&log);
        registry.register(kind.to_string(), move |ev: &mut HookEvent<'_>| {
            sink.borrow_mut().push((ev.kind, ev.element))
        });
    }
    (registry, log)
}

/// Config whose six slots point at the handlers of [`recording_registry`].
pub fn recording_config() -> PageLoaderConfig {
    let mut config = PageLoaderConfig::default();
    let hooks = &mut config.hooks;
    hooks.before_form_submitting = Some(HookKind::BeforeFormSubmitting.to_string());
    hooks.after_form_submitting = Some(HookKind::AfterFormSubmitting.to_string());
    hooks.before_ajax_loading = Some(HookKind::BeforeAjaxLoading.to_string());
    hooks.after_ajax_loading = Some(HookKind::AfterAjaxLoading.to_string());
    hooks.before_content_setting = Some(HookKind::BeforeContentSetting.to_string());
    hooks.after_content_setting = Some(HookKind::AfterContentSetting.to_string());
    config
}

pub fn kinds(log: &HookLog) -> Vec<HookKind> {
    log.borrow().iter().map(|(kind, _)| *kind).collect()
}
