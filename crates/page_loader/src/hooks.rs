//! Lifecycle extension points around an interaction cycle.
use html::{Document, Id};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    BeforeFormSubmitting,
    AfterFormSubmitting,
    BeforeAjaxLoading,
    AfterAjaxLoading,
    BeforeContentSetting,
    AfterContentSetting,
}

impl HookKind {
    pub const ALL: [HookKind; 6] = [
        HookKind::BeforeFormSubmitting,
        HookKind::AfterFormSubmitting,
        HookKind::BeforeAjaxLoading,
        HookKind::AfterAjaxLoading,
        HookKind::BeforeContentSetting,
        HookKind::AfterContentSetting,
    ];

    /// Element attribute that overrides the controller slot with a registered name.
    pub fn attribute(self) -> &'static str {
        match self {
            HookKind::BeforeFormSubmitting => "data-before-form-submitting",
            HookKind::AfterFormSubmitting => "data-after-form-submitting",
            HookKind::BeforeAjaxLoading => "data-before-ajax-loading",
            HookKind::AfterAjaxLoading => "data-after-ajax-loading",
            HookKind::BeforeContentSetting => "data-before-content-setting",
            HookKind::AfterContentSetting => "data-after-content-setting",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute().trim_start_matches("data-"))
    }
}

/// What a hook handler sees: the triggering element and mutable access to the page.
pub struct HookEvent<'a> {
    pub kind: HookKind,
    pub element: Id,
    pub document: &'a mut Document,
}

pub type HookFn = Rc<dyn Fn(&mut HookEvent<'_>)>;

/// Inline click handler; returning `false` cancels the interaction.
pub type ClickGuard = Rc<dyn Fn(&Document, Id) -> bool>;

#[derive(Clone)]
pub enum Hook {
    Bound(HookFn),
    /// Looked up in the [`HookRegistry`] when dispatched.
    Named(String),
}

impl Hook {
    pub fn bound(f: impl Fn(&mut HookEvent<'_>) + 'static) -> Self {
        Hook::Bound(Rc::new(f))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Bound(_) => f.write_str("Hook::Bound(..)"),
            Hook::Named(name) => f.debug_tuple("Hook::Named").field(name).finish(),
        }
    }
}

/// Handlers addressable by name from markup (`data-after-ajax-loading="refreshCart"`,
/// `onclick="confirmDelete"`) and from configuration.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, HookFn>,
    click_guards: HashMap<String, ClickGuard>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(&mut HookEvent<'_>) + 'static) {
        self.hooks.insert(name.into(), Rc::new(f));
    }

    pub fn register_click_guard(
        &mut self,
        name: impl Into<String>,
        guard: impl Fn(&Document, Id) -> bool + 'static,
    ) {
        self.click_guards.insert(name.into(), Rc::new(guard));
    }

    pub fn hook(&self, name: &str) -> Option<HookFn> {
        self.hooks.get(name.trim()).cloned()
    }

    pub fn click_guard(&self, name: &str) -> Option<ClickGuard> {
        self.click_guards.get(name.trim()).cloned()
    }

    /// Turn a hook into something callable; unknown names resolve to nothing.
    fn resolve(&self, hook: &Hook) -> Option<HookFn> {
        match hook {
            Hook::Bound(f) => Some(Rc::clone(f)),
            Hook::Named(name) => {
                let found = self.hook(name);
                if found.is_none() {
                    log::warn!(target: "page_loader.hooks", "no hook registered under `{name}`");
                }
                found
            }
        }
    }
}

/// The controller's six default hooks.
#[derive(Clone, Debug, Default)]
pub struct HookSlots {
    slots: [Option<Hook>; 6],
}

impl HookSlots {
    pub fn set(&mut self, kind: HookKind, hook: Option<Hook>) {
        self.slots[kind.index()] = hook;
    }

    pub fn get(&self, kind: HookKind) -> Option<&Hook> {
        self.slots[kind.index()].as_ref()
    }
}

/// Run the hook for `kind` on behalf of `element`.
///
/// An element attribute naming a registered handler takes precedence over the slot.
/// Nothing runs when `enabled` is false.
pub fn dispatch(
    registry: &HookRegistry,
    slots: &HookSlots,
    document: &mut Document,
    element: Id,
    kind: HookKind,
    enabled: bool,
) {
    if !enabled {
        return;
    }
    let hook = match document.attr(element, kind.attribute()) {
        Some(name) => Some(Hook::Named(name.to_string())),
        None => slots.get(kind).cloned(),
    };
    let Some(f) = hook.as_ref().and_then(|h| registry.resolve(h)) else {
        return;
    };
    log::trace!(target: "page_loader.hooks", "{kind} on {element:?}");
    let mut event = HookEvent {
        kind,
        element,
        document,
    };
    f(&mut event);
}
