//! Intercepts link and form-submit interactions and replaces full navigation with a fetch
//! whose response replaces a target region of the page.
pub mod attributes;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod form_controls;
pub mod hooks;
pub mod loading;

mod loader;

pub use config::{DEFAULT_SELECTOR, HookNames, PageLoaderConfig, load_config};
pub use context::{BrowserContext, Window};
pub use controller::{CyclePhase, InteractionController, ResolvedRequest};
pub use error::LoaderError;
pub use hooks::{ClickGuard, Hook, HookEvent, HookKind, HookRegistry};
pub use loader::{ClickOutcome, PageLoader};
pub use loading::{Blinking, LoadingIndicator, LoadingKind};
