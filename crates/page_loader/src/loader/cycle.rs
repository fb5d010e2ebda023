//! The interaction cycle: resolve, request, optionally follow the declared redirect, update
//! the target region, cascade to dependent regions, finalize.
use super::{ActiveIndicator, ClickOutcome, PageLoader};
use crate::attributes::{self, DATA_REFRESH_TARGET};
use crate::context::BrowserContext;
use crate::controller::{CyclePhase, InteractionSession};
use crate::error::LoaderError;
use crate::hooks::{self, HookKind};
use bus::{CoreCommand, CoreEvent};
use core_types::{CycleId, RequestKind};
use html::Id;
use net::FetchRequest;
use std::collections::hash_map::Entry;

impl<C: BrowserContext> PageLoader<C> {
    /// A user click on `element`.
    ///
    /// The element's inline click guard runs first and may cancel the interaction. Failures to
    /// resolve a request are logged and leave the default action alone.
    pub fn click(&mut self, element: Id) -> ClickOutcome {
        let Some(controller) = self.controllers.get(&element) else {
            log::debug!(target: "page_loader.cycle", "click on unwired {element:?}");
            return ClickOutcome::NotIntercepted;
        };
        if let Some(guard) = controller.click_guard() {
            if !guard(self.ctx.document(), element) {
                log::debug!(target: "page_loader.cycle", "click guard declined {element:?}");
                return ClickOutcome::Cancelled;
            }
        }

        match self.start_cycle(element, true) {
            Ok(cycle) => ClickOutcome::Intercepted(cycle),
            Err(err) => {
                log::error!(target: "page_loader.cycle", "{err}");
                ClickOutcome::NotIntercepted
            }
        }
    }

    /// Resolve and issue the primary request for `element`. Hooks and the loading indicator
    /// only engage once resolution has succeeded.
    pub(crate) fn start_cycle(
        &mut self,
        element: Id,
        refresh_targets: bool,
    ) -> Result<CycleId, LoaderError> {
        let controller = self
            .controllers
            .get(&element)
            .ok_or(LoaderError::UnknownElement(element))?;
        let resolved = self.resolve_with(controller)?;

        let cycle = self.next_cycle_id();
        let events = attributes::events_enabled(self.ctx.document(), element);
        let is_form = resolved.form.is_some();
        log::debug!(
            target: "page_loader.cycle",
            "cycle {cycle}: {} {} for {element:?}",
            resolved.method,
            resolved.request.url
        );

        let mut session = InteractionSession {
            cycle,
            element,
            target: resolved.target,
            is_form,
            redirect_url: resolved.redirect_url,
            events,
            refresh_targets,
            indicator: None,
            phase: CyclePhase::Resolving,
        };

        if let Some(target) = session.target {
            session.indicator = self.acquire_indicator(target);
        }

        if is_form {
            self.dispatch(&session, HookKind::BeforeFormSubmitting);
        }
        self.dispatch(&session, HookKind::BeforeAjaxLoading);

        session.phase = CyclePhase::Requesting;
        self.issue(session, RequestKind::Primary, resolved.request);
        Ok(cycle)
    }

    /// Resume the cycle waiting on this event's request.
    pub fn on_core_event(&mut self, evt: CoreEvent) {
        let request_id = evt.request_id();
        let Some(session) = self.in_flight.remove(&request_id) else {
            log::debug!(target: "page_loader.cycle", "no cycle waits on request {request_id}");
            return;
        };

        match evt {
            CoreEvent::FetchDone {
                kind: RequestKind::Primary,
                response,
                ..
            } => {
                log::trace!(
                    target: "page_loader.cycle",
                    "cycle {}: {} answered {} in {}ms",
                    session.cycle,
                    response.url,
                    response.status,
                    response.duration_ms
                );
                match session.redirect_url.clone() {
                    Some(redirect_url) => {
                        if response.redirected {
                            if let Some(controller) = self.controllers.get_mut(&session.element) {
                                controller.record_redirect(response.url);
                            }
                        }
                        let mut session = session;
                        session.phase = CyclePhase::RedirectFollowing;
                        self.issue(session, RequestKind::RedirectFollow, FetchRequest::get(redirect_url));
                    }
                    None => self.complete(session, &response.body),
                }
            }
            CoreEvent::FetchDone {
                kind: RequestKind::RedirectFollow,
                response,
                ..
            } => self.complete(session, &response.body),
            CoreEvent::FetchFailed { error, .. } => self.fail(session, LoaderError::Transport(error)),
        }
    }

    fn issue(&mut self, session: InteractionSession, kind: RequestKind, request: FetchRequest) {
        let request_id = self.next_request_id();
        let sent = self.ctx.send(CoreCommand::Fetch {
            request_id,
            kind,
            request,
        });
        if sent {
            self.in_flight.insert(request_id, session);
        } else {
            self.fail(session, LoaderError::Disconnected);
        }
    }

    /// Replace the target region, rewire, cascade, finalize.
    fn complete(&mut self, mut session: InteractionSession, body: &str) {
        session.phase = CyclePhase::Updating;
        self.dispatch(&session, HookKind::BeforeContentSetting);
        if let Some(target) = session.target {
            if let Err(err) = self.ctx.document_mut().set_inner_html(target, body) {
                log::error!(target: "page_loader.cycle", "cycle {}: {err}", session.cycle);
            }
        }
        self.scan();
        self.dispatch(&session, HookKind::AfterContentSetting);

        if session.refresh_targets {
            self.cascade(&session);
        }

        self.release_indicator(&mut session);
        if session.is_form {
            self.dispatch(&session, HookKind::AfterFormSubmitting);
        }
        self.dispatch(&session, HookKind::AfterAjaxLoading);
        session.phase = CyclePhase::Finalized;
        log::debug!(target: "page_loader.cycle", "cycle {} finalized", session.cycle);
        self.finish(session.element, session.phase);
    }

    /// Start one non-cascading cycle per element matching the trigger's `data-refresh-target`.
    /// Refresh targets skip their click guards.
    fn cascade(&mut self, session: &InteractionSession) {
        let doc = self.ctx.document();
        let Some(selector) = attributes::resolve(doc, session.element, DATA_REFRESH_TARGET, None)
        else {
            return;
        };
        let targets = match doc.query_selector_all(selector) {
            Ok(targets) => targets,
            Err(err) => {
                log::error!(target: "page_loader.cycle", "cycle {}: {err}", session.cycle);
                return;
            }
        };
        for target in targets {
            self.ensure_controller(target);
            match self.start_cycle(target, false) {
                Ok(child) => log::debug!(
                    target: "page_loader.cycle",
                    "cycle {} refreshes {target:?} as cycle {child}",
                    session.cycle
                ),
                Err(err) => log::error!(target: "page_loader.cycle", "{err}"),
            }
        }
    }

    fn fail(&mut self, mut session: InteractionSession, err: LoaderError) {
        log::error!(target: "page_loader.cycle", "cycle {}: {err}", session.cycle);
        self.release_indicator(&mut session);
        session.phase = CyclePhase::Errored;
        self.finish(session.element, session.phase);
    }

    /// Start the indicator on `target`, or join the one already running there.
    fn acquire_indicator(&mut self, target: Id) -> Option<Id> {
        let kind = self.loading_type?;
        match self.indicators.entry(target) {
            Entry::Occupied(mut active) => active.get_mut().holders += 1,
            Entry::Vacant(slot) => {
                let mut indicator = kind.indicator();
                indicator.start(self.ctx.document_mut(), target);
                slot.insert(ActiveIndicator {
                    holders: 1,
                    indicator,
                });
            }
        }
        Some(target)
    }

    /// Drop this cycle's share of its indicator. The last holder stops it.
    fn release_indicator(&mut self, session: &mut InteractionSession) {
        let Some(target) = session.indicator.take() else {
            return;
        };
        let Entry::Occupied(mut active) = self.indicators.entry(target) else {
            return;
        };
        active.get_mut().holders -= 1;
        if active.get().holders == 0 {
            let mut indicator = active.remove().indicator;
            indicator.stop(self.ctx.document_mut());
        }
    }

    fn dispatch(&mut self, session: &InteractionSession, kind: HookKind) {
        hooks::dispatch(
            &self.registry,
            &self.hooks,
            self.ctx.document_mut(),
            session.element,
            kind,
            session.events,
        );
    }
}
