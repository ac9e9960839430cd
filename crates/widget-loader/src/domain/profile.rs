//! Loader profiles: the per-deployment knobs of the widget loader.
//!
//! The deployments (the main chat widget, the full-screen Niro assistant, the
//! launcher button) differ only in a handful of constants.  [`LoaderProfile`]
//! holds those constants as data, so one implementation serves all of them.
//!
//! Profiles come from a built-in preset ([`LoaderProfile::steno_chat`],
//! [`LoaderProfile::niro`]) or from a TOML file:
//!
//! ```toml
//! script_suffix = "steno-chat.js"
//! frame_id = "chat-iframe"
//! default_url = "https://chat.steno.ai"
//! allowed_urls = ["https://chat.steno.ai", "https://devchat.steno.ai"]
//! frame_path = "/chat"
//!
//! [validation]
//! mode = "remote"
//! service_url = "https://api.steno.ai"
//!
//! [mobile]
//! max_width = 500
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = ...)]` so a profile file only needs
//! to list what differs from the main chat widget.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use widget_core::policy::navigation::DEFAULT_NAVIGATION_SCHEMES;
use widget_core::{FrameLayout, MobileBreakpoint};

/// Error type for profile file operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A file system I/O error occurred.
    #[error("I/O error reading profile at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse profile TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Profile schema types ──────────────────────────────────────────────────────

/// Complete configuration of one loader deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoaderProfile {
    /// Suffix of the `<script src>` the loader reads its attributes from.
    #[serde(default = "default_script_suffix")]
    pub script_suffix: String,
    /// Reserved element id of the chat iframe.
    #[serde(default = "default_frame_id")]
    pub frame_id: String,
    #[serde(default = "default_frame_title")]
    pub frame_title: String,
    /// Chat URL used when the tag has no `data-url`.
    #[serde(default = "default_url")]
    pub default_url: String,
    /// Chat URLs the loader is willing to frame.  Empty disables the static
    /// check and leaves the decision to the domain check alone.
    #[serde(default = "default_allowed_urls")]
    pub allowed_urls: Vec<String>,
    /// Path appended to the chat URL, e.g. `"/chat"`.
    #[serde(default = "default_frame_path")]
    pub frame_path: String,
    #[serde(default)]
    pub layout: FrameLayout,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub mobile: MobileConfig,
    /// URL schemes a `navigate` message may use.
    #[serde(default = "default_navigation_schemes")]
    pub navigation_schemes: Vec<String>,
    /// Whether the loader listens for `postMessage` commands at all.
    #[serde(default = "default_true")]
    pub relay_messages: bool,
    /// Drop messages whose source is not the chat frame's window.
    #[serde(default = "default_true")]
    pub verify_message_source: bool,
    /// Name of the cookie written by the cookie bridge.
    #[serde(default = "default_bridged_cookie_name")]
    pub bridged_cookie_name: String,
    /// Overrides the crawler user-agent pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawler_pattern: Option<String>,
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// How the trust decision for a hostname is made.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Ask the domain-check service.
    #[default]
    Remote,
    /// Compare against `allowed_urls` only; no network traffic.
    AllowList,
}

/// Domain-check settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default)]
    pub mode: ValidationMode,
    /// Base URL of the domain-check service (without the API path).
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Mobile viewport thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MobileConfig {
    #[serde(default = "default_mobile_max_width")]
    pub max_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

/// Settings of the launcher button deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    /// Suffix of the launcher's own `<script src>`.
    #[serde(default = "default_launcher_suffix")]
    pub script_suffix: String,
    /// URL of the chat loader injected on click.
    #[serde(default = "default_loader_script_url")]
    pub loader_script_url: String,
    /// Reserved id of the injected loader script element.
    #[serde(default = "default_loader_script_id")]
    pub loader_script_id: String,
    #[serde(default = "default_button_id")]
    pub button_id: String,
    /// Visual theme per tenant id.  Tenants without a theme get no button.
    #[serde(default)]
    pub themes: BTreeMap<String, LauncherTheme>,
}

/// Opaque visual theme of a launcher button.  Values are passed through to
/// the page stylesheet untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherTheme {
    pub logo_src: String,
    #[serde(default)]
    pub button_css: String,
    #[serde(default)]
    pub hover_css: String,
    #[serde(default)]
    pub logo_css: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_script_suffix() -> String {
    "steno-chat.js".to_string()
}
fn default_frame_id() -> String {
    "chat-iframe".to_string()
}
fn default_frame_title() -> String {
    "Steno Chat Support Widget".to_string()
}
fn default_url() -> String {
    "https://chat.steno.ai".to_string()
}
fn default_allowed_urls() -> Vec<String> {
    [
        "https://chat.steno.ai",
        "https://devchat.steno.ai",
        "https://chat.rpmplanner.com",
        "https://dev-chat.rpmplanner.com",
        "https://exp-chat.rpmplanner.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_frame_path() -> String {
    "/chat".to_string()
}
fn default_navigation_schemes() -> Vec<String> {
    DEFAULT_NAVIGATION_SCHEMES.iter().map(|s| s.to_string()).collect()
}
fn default_true() -> bool {
    true
}
fn default_bridged_cookie_name() -> String {
    "steno_session".to_string()
}
fn default_service_url() -> String {
    "https://api.steno.ai".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_mobile_max_width() -> u32 {
    500
}
fn default_launcher_suffix() -> String {
    "steno-button.js".to_string()
}
fn default_loader_script_url() -> String {
    "https://cdn.jsdelivr.net/gh/aisteno/embed@latest/steno-chat.js".to_string()
}
fn default_loader_script_id() -> String {
    "stenoScript".to_string()
}
fn default_button_id() -> String {
    "openChatButton".to_string()
}

impl Default for LoaderProfile {
    fn default() -> Self {
        Self::steno_chat()
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            service_url: default_service_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MobileConfig {
    fn default() -> Self {
        Self {
            max_width: default_mobile_max_width(),
            max_height: None,
        }
    }
}

impl MobileConfig {
    pub fn breakpoint(&self) -> MobileBreakpoint {
        MobileBreakpoint {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            script_suffix: default_launcher_suffix(),
            loader_script_url: default_loader_script_url(),
            loader_script_id: default_loader_script_id(),
            button_id: default_button_id(),
            themes: BTreeMap::new(),
        }
    }
}

// ── Presets ───────────────────────────────────────────────────────────────────

impl LoaderProfile {
    /// The main chat widget: docked launcher, remote domain check, message
    /// relay on.
    pub fn steno_chat() -> Self {
        Self {
            script_suffix: default_script_suffix(),
            frame_id: default_frame_id(),
            frame_title: default_frame_title(),
            default_url: default_url(),
            allowed_urls: default_allowed_urls(),
            frame_path: default_frame_path(),
            layout: FrameLayout::Docked,
            validation: ValidationConfig::default(),
            mobile: MobileConfig::default(),
            navigation_schemes: default_navigation_schemes(),
            relay_messages: true,
            verify_message_source: true,
            bridged_cookie_name: default_bridged_cookie_name(),
            crawler_pattern: None,
            launcher: LauncherConfig::default(),
        }
    }

    /// The Niro assistant: full-viewport frame on a fixed URL, static
    /// allow-list, no message relay.
    pub fn niro() -> Self {
        Self {
            script_suffix: "niro.js".to_string(),
            frame_id: "niro-iframe".to_string(),
            frame_title: "Niro Support Widget".to_string(),
            default_url: "https://niro.steno.ai".to_string(),
            allowed_urls: vec!["https://niro.steno.ai".to_string()],
            frame_path: String::new(),
            layout: FrameLayout::FullViewport,
            validation: ValidationConfig {
                mode: ValidationMode::AllowList,
                ..ValidationConfig::default()
            },
            relay_messages: false,
            ..Self::steno_chat()
        }
    }

    /// Parses a profile from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Parse`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads a profile from `path`.
///
/// Unlike an application config file, a profile is always given explicitly,
/// so a missing file is an error rather than a reason to fall back to
/// defaults.
///
/// # Errors
///
/// Returns [`ProfileError::Io`] if the file cannot be read and
/// [`ProfileError::Parse`] if the TOML is malformed.
pub fn load_profile(path: &Path) -> Result<LoaderProfile, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    LoaderProfile::from_toml_str(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_steno_chat_preset() {
        assert_eq!(LoaderProfile::default(), LoaderProfile::steno_chat());
    }

    #[test]
    fn test_steno_chat_defaults() {
        let p = LoaderProfile::steno_chat();
        assert_eq!(p.frame_id, "chat-iframe");
        assert_eq!(p.frame_path, "/chat");
        assert_eq!(p.validation.mode, ValidationMode::Remote);
        assert_eq!(p.mobile.max_width, 500);
        assert_eq!(p.navigation_schemes, vec!["https", "tel", "mailto"]);
        assert!(p.relay_messages);
        assert!(p.allowed_urls.contains(&"https://chat.steno.ai".to_string()));
    }

    #[test]
    fn test_niro_preset_differs_only_where_expected() {
        let p = LoaderProfile::niro();
        assert_eq!(p.frame_id, "niro-iframe");
        assert_eq!(p.layout, FrameLayout::FullViewport);
        assert_eq!(p.validation.mode, ValidationMode::AllowList);
        assert!(!p.relay_messages);
        assert_eq!(p.frame_path, "");
        // Inherited from the main preset.
        assert_eq!(p.bridged_cookie_name, "steno_session");
    }

    #[test]
    fn test_empty_toml_yields_steno_chat_defaults() {
        // Arrange / Act
        let p = LoaderProfile::from_toml_str("").unwrap();

        // Assert: serde defaults reproduce the preset
        assert_eq!(p, LoaderProfile::steno_chat());
    }

    #[test]
    fn test_partial_toml_overrides_selected_fields() {
        let toml = r#"
            frame_id = "support-frame"
            allowed_urls = ["https://support.example"]
            layout = "full_viewport"

            [validation]
            mode = "allow_list"

            [mobile]
            max_width = 600
            max_height = 450

            [launcher.themes.afterall]
            logo_src = "https://cdn.example/bubble.svg"
            button_css = "position: fixed;"
        "#;

        let p = LoaderProfile::from_toml_str(toml).unwrap();

        assert_eq!(p.frame_id, "support-frame");
        assert_eq!(p.allowed_urls, vec!["https://support.example"]);
        assert_eq!(p.layout, FrameLayout::FullViewport);
        assert_eq!(p.validation.mode, ValidationMode::AllowList);
        assert_eq!(p.validation.service_url, "https://api.steno.ai");
        assert_eq!(p.mobile.breakpoint().max_height, Some(450));
        assert_eq!(p.launcher.themes["afterall"].logo_src, "https://cdn.example/bubble.svg");
        assert_eq!(p.launcher.themes["afterall"].hover_css, "");
        // Untouched fields keep their defaults.
        assert_eq!(p.frame_path, "/chat");
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = LoaderProfile::from_toml_str("frame_id = [");
        assert!(matches!(result, Err(ProfileError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = load_profile(Path::new("/definitely/not/here/profile.toml"));
        assert!(matches!(result, Err(ProfileError::Io { .. })));
    }

    #[test]
    fn test_profile_round_trips_through_toml() {
        let original = LoaderProfile::niro();
        let text = toml::to_string_pretty(&original).unwrap();
        let parsed = LoaderProfile::from_toml_str(&text).unwrap();
        assert_eq!(original, parsed);
    }
}
