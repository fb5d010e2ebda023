//! Page-level orchestration of interaction cycles.
//!
//! Invariants:
//! - `controllers` holds at most one `InteractionController` per element id. Discovery only
//!   inserts missing entries, so repeated scans never re-wire an element.
//! - Every request in flight has exactly one `InteractionSession` in `in_flight`, keyed by its
//!   request id. A cycle whose session is gone has ended.
//! - `indicators` has one entry per target with a running loading indicator. Its holder
//!   count equals the number of live cycles that acquired it, and the indicator stops when
//!   the count reaches zero.
//! - Cycles are never cancelled. Overlapping cycles replacing the same region finish in arrival
//!   order and the last response wins.
use crate::config::PageLoaderConfig;
use crate::context::{BrowserContext, Window};
use crate::controller::{
    CyclePhase, InteractionController, InteractionSession, ResolveDefaults, ResolvedRequest,
};
use crate::error::LoaderError;
use crate::hooks::{Hook, HookEvent, HookKind, HookRegistry, HookSlots};
use crate::loading::{LoadingIndicator, LoadingKind};
use bus::CoreEvent;
use core_types::{CycleId, Method, RequestId};
use html::{Document, Id, SelectorList, parse_selector_list};
use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

mod cycle;
mod discovery;

/// What a click on a wired element amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The loader took over; the default action must be prevented.
    Intercepted(CycleId),
    /// The inline click guard declined; the default action must be prevented.
    Cancelled,
    /// The loader did nothing; the default action may proceed.
    NotIntercepted,
}

impl ClickOutcome {
    pub fn prevents_default(self) -> bool {
        !matches!(self, ClickOutcome::NotIntercepted)
    }
}

/// A loading indicator shared by every cycle currently targeting the same region.
struct ActiveIndicator {
    holders: usize,
    indicator: Box<dyn LoadingIndicator>,
}

pub struct PageLoader<C: BrowserContext = Window> {
    ctx: C,

    selector: SelectorList,
    default_target: Option<Id>,
    default_method: Method,
    loading_type: Option<LoadingKind>,
    hooks: HookSlots,
    registry: HookRegistry,

    controllers: BTreeMap<Id, InteractionController>,
    in_flight: HashMap<RequestId, InteractionSession>,
    indicators: HashMap<Id, ActiveIndicator>,
    next_request_id: RequestId,
    next_cycle_id: CycleId,
}

impl<C: BrowserContext> PageLoader<C> {
    pub fn new(ctx: C, config: PageLoaderConfig) -> Result<Self, LoaderError> {
        Self::with_registry(ctx, config, HookRegistry::new())
    }

    /// Build a loader whose named hooks and click guards come from `registry`.
    ///
    /// Click guards are captured when an element is first wired, so they must be registered
    /// here rather than after construction for elements already on the page.
    pub fn with_registry(
        ctx: C,
        config: PageLoaderConfig,
        registry: HookRegistry,
    ) -> Result<Self, LoaderError> {
        let mut hooks = HookSlots::default();
        for kind in HookKind::ALL {
            hooks.set(kind, config.hooks.get(kind).map(|name| Hook::Named(name.to_string())));
        }

        let mut loader = Self {
            ctx,
            selector: parse_selector_list(&config.selector)?,
            default_target: None,
            default_method: Method::parse(&config.default_method),
            loading_type: None,
            hooks,
            registry,
            controllers: BTreeMap::new(),
            in_flight: HashMap::new(),
            indicators: HashMap::new(),
            next_request_id: 1,
            next_cycle_id: 1,
        };
        loader.set_default_target(&config.default_target)?;
        loader.set_loading_type(config.loading_type.as_deref());
        loader.scan();
        Ok(loader)
    }

    // -- Configuration ---

    /// Replace the discovery selector and wire any matching element not wired yet.
    /// Returns how many controllers were added.
    pub fn set_selector(&mut self, selector: &str) -> Result<usize, LoaderError> {
        self.selector = parse_selector_list(selector)?;
        Ok(self.scan())
    }

    pub fn selector(&self) -> &str {
        self.selector.as_str()
    }

    /// Resolve `selector` now and use the first match as the default target region.
    /// No match leaves the loader without a default target.
    pub fn set_default_target(&mut self, selector: &str) -> Result<(), LoaderError> {
        self.default_target = self.ctx.document().query_selector(selector)?;
        if self.default_target.is_none() {
            log::warn!(target: "page_loader", "default target `{selector}` matches nothing");
        }
        Ok(())
    }

    pub fn set_default_target_element(&mut self, target: Option<Id>) {
        self.default_target = target;
    }

    pub fn default_target(&self) -> Option<Id> {
        self.default_target
    }

    pub fn set_default_method(&mut self, method: &str) {
        self.default_method = Method::parse(method);
    }

    pub fn default_method(&self) -> &Method {
        &self.default_method
    }

    pub fn set_loading_type(&mut self, name: Option<&str>) {
        self.loading_type = name.and_then(LoadingKind::from_name);
    }

    pub fn loading_type(&self) -> Option<LoadingKind> {
        self.loading_type
    }

    pub fn set_hook(&mut self, kind: HookKind, hook: Option<Hook>) {
        self.hooks.set(kind, hook);
    }

    pub fn register_hook(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut HookEvent<'_>) + 'static,
    ) {
        self.registry.register(name, f);
    }

    /// Guards registered here apply to elements wired from now on.
    pub fn register_click_guard(
        &mut self,
        name: impl Into<String>,
        guard: impl Fn(&Document, Id) -> bool + 'static,
    ) {
        self.registry.register_click_guard(name, guard);
    }

    // -- Inspection ---

    pub fn document(&self) -> &Document {
        self.ctx.document()
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_wired(&self, element: Id) -> bool {
        self.controllers.contains_key(&element)
    }

    pub fn controller(&self, element: Id) -> Option<&InteractionController> {
        self.controllers.get(&element)
    }

    /// What a click on `element` would request right now, without side effects.
    pub fn resolve_request(&self, element: Id) -> Result<ResolvedRequest, LoaderError> {
        let controller = self
            .controllers
            .get(&element)
            .ok_or(LoaderError::UnknownElement(element))?;
        self.resolve_with(controller)
    }

    fn resolve_with(
        &self,
        controller: &InteractionController,
    ) -> Result<ResolvedRequest, LoaderError> {
        let defaults = ResolveDefaults {
            target: self.default_target,
            method: &self.default_method,
        };
        controller.resolve(self.ctx.document(), self.ctx.location(), &defaults)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// True when no cycle is waiting on the network.
    pub fn settled(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Feed events from `evt_rx` until every cycle has settled. Returns `false` if `timeout`
    /// elapsed or the runtimes went away first.
    pub fn run_until_settled(&mut self, evt_rx: &Receiver<CoreEvent>, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match evt_rx.recv_timeout(remaining) {
                Ok(evt) => self.on_core_event(evt),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(target: "page_loader", "{} request(s) still in flight", self.in_flight.len());
                    return false;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::error!(target: "page_loader", "event channel closed with requests in flight");
                    return false;
                }
            }
        }
        true
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn next_cycle_id(&mut self) -> CycleId {
        let id = self.next_cycle_id;
        self.next_cycle_id += 1;
        id
    }

    fn finish(&mut self, element: Id, phase: CyclePhase) {
        if let Some(controller) = self.controllers.get_mut(&element) {
            controller.set_last_phase(phase);
        }
    }
}
