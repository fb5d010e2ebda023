use super::PageLoader;
use crate::attributes::ONCLICK;
use crate::context::BrowserContext;
use crate::controller::InteractionController;
use html::Id;

impl<C: BrowserContext> PageLoader<C> {
    /// Wire every element matching the current selector that is not wired yet, after
    /// dropping controllers whose elements left the document. Returns the number added.
    pub(crate) fn scan(&mut self) -> usize {
        self.prune_disconnected();
        let matches = self.ctx.document().select_all(&self.selector);
        let added = matches
            .into_iter()
            .filter(|&el| self.ensure_controller(el))
            .count();
        if added > 0 {
            log::debug!(
                target: "page_loader.discovery",
                "wired {added} element(s) for `{}`, {} total",
                self.selector.as_str(),
                self.controllers.len()
            );
        }
        added
    }

    /// Create the controller for `element` unless one exists. Returns whether one was created.
    pub(crate) fn ensure_controller(&mut self, element: Id) -> bool {
        if self.controllers.contains_key(&element) {
            return false;
        }
        let doc = self.ctx.document();
        if doc.element(element).is_none() {
            return false;
        }
        let click_guard = doc.attr(element, ONCLICK).and_then(|name| {
            let guard = self.registry.click_guard(name);
            if guard.is_none() {
                log::warn!(
                    target: "page_loader.discovery",
                    "no click guard registered under `{name}`, ignoring onclick of {element:?}"
                );
            }
            guard
        });
        self.controllers
            .insert(element, InteractionController::new(element, click_guard));
        true
    }

    fn prune_disconnected(&mut self) {
        let doc = self.ctx.document();
        let before = self.controllers.len();
        self.controllers.retain(|&id, _| doc.is_connected(id));
        let pruned = before - self.controllers.len();
        if pruned > 0 {
            log::trace!(target: "page_loader.discovery", "dropped {pruned} detached controller(s)");
        }
    }
}
