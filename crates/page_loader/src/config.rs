use crate::error::LoaderError;
use crate::hooks::HookKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Hyperlinks and submit controls that opt in with `data-ajax="true"`.
pub const DEFAULT_SELECTOR: &str = r#"a[data-ajax="true"], input[type="submit"][data-ajax="true"], button[type="submit"][data-ajax="true"]"#;
pub const DEFAULT_TARGET: &str = "body";
pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_LOADING_TYPE: &str = "blinking";

/// Registered handler names for the controller's hook slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HookNames {
    pub before_form_submitting: Option<String>,
    pub after_form_submitting: Option<String>,
    pub before_ajax_loading: Option<String>,
    pub after_ajax_loading: Option<String>,
    pub before_content_setting: Option<String>,
    pub after_content_setting: Option<String>,
}

impl HookNames {
    pub fn get(&self, kind: HookKind) -> Option<&str> {
        let name = match kind {
            HookKind::BeforeFormSubmitting => &self.before_form_submitting,
            HookKind::AfterFormSubmitting => &self.after_form_submitting,
            HookKind::BeforeAjaxLoading => &self.before_ajax_loading,
            HookKind::AfterAjaxLoading => &self.after_ajax_loading,
            HookKind::BeforeContentSetting => &self.before_content_setting,
            HookKind::AfterContentSetting => &self.after_content_setting,
        };
        name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageLoaderConfig {
    pub selector: String,
    /// Selector of the region replaced when an element declares no `data-target`.
    pub default_target: String,
    pub default_method: String,
    /// `None` or an empty string disables the loading indicator.
    pub loading_type: Option<String>,
    pub hooks: HookNames,
}

impl Default for PageLoaderConfig {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            default_target: DEFAULT_TARGET.to_string(),
            default_method: DEFAULT_METHOD.to_string(),
            loading_type: Some(DEFAULT_LOADING_TYPE.to_string()),
            hooks: HookNames::default(),
        }
    }
}

impl PageLoaderConfig {
    pub fn from_toml(raw: &str) -> Result<Self, LoaderError> {
        toml::from_str(raw).map_err(|e| LoaderError::Config(e.to_string()))
    }
}

pub fn load_config(path: &Path) -> Result<PageLoaderConfig, LoaderError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| LoaderError::Config(format!("{}: {e}", path.display())))?;
    PageLoaderConfig::from_toml(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PageLoaderConfig::from_toml("").unwrap();
        assert_eq!(config, PageLoaderConfig::default());
        assert_eq!(config.default_target, "body");
        assert_eq!(config.loading_type.as_deref(), Some("blinking"));
    }

    #[test]
    fn reads_fields_and_hook_table() {
        let config = PageLoaderConfig::from_toml(
            r##"
            selector = "a.ajax"
            default_target = "#main"
            default_method = "post"
            loading_type = ""

            [hooks]
            after_ajax_loading = "refreshCart"
            before_form_submitting = " "
            "##,
        )
        .unwrap();
        assert_eq!(config.selector, "a.ajax");
        assert_eq!(config.default_target, "#main");
        assert_eq!(config.default_method, "post");
        assert_eq!(config.loading_type.as_deref(), Some(""));
        assert_eq!(config.hooks.get(HookKind::AfterAjaxLoading), Some("refreshCart"));
        assert_eq!(config.hooks.get(HookKind::BeforeFormSubmitting), None);
        assert_eq!(config.hooks.get(HookKind::AfterContentSetting), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PageLoaderConfig::from_toml("selectr = \"a\"").unwrap_err();
        assert!(matches!(err, LoaderError::Config(_)));
    }
}
