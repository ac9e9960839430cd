//! The launcher button: a lightweight pre-loader.
//!
//! Tenants that do not want the chat frame on every page view embed the
//! launcher script instead.  It draws a themed "open chat" button and only
//! injects the real loader script when the visitor clicks it, forwarding the
//! tag's attributes with the display mode forced to `panel`.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info, warn};
use widget_core::domain::attributes::{
    ATTR_BACKEND, ATTR_COOKIE_DOMAIN, ATTR_COOKIE_NAME, ATTR_ID, ATTR_MODE, ATTR_POSITION,
    ATTR_URL, ATTR_Z_INDEX, DEFAULT_ID, DEFAULT_Z_INDEX,
};
use widget_core::{DisplayMode, ScriptAttributes};

use crate::domain::{LauncherConfig, LauncherTheme};

use super::host::{HostError, HostPage, LauncherButton, ScriptElement};

/// Attributes copied from the launcher tag onto the injected loader tag.
const FORWARDED: &[&str] = &[
    ATTR_POSITION,
    ATTR_BACKEND,
    ATTR_URL,
    ATTR_COOKIE_NAME,
    ATTR_COOKIE_DOMAIN,
    ATTR_Z_INDEX,
];

/// Error type for launcher operations.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// The profile has no theme for this tenant; no button is drawn.
    #[error("no launcher theme configured for chat id '{0}'")]
    MissingTheme(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result of [`Launcher::on_click`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The loader script was appended and the button hidden.
    Injected,
    /// A loader script with the reserved id is already on the page.
    AlreadyInjected,
}

/// One launcher button on one page.
pub struct Launcher<H: HostPage + ?Sized> {
    host: Rc<H>,
    config: LauncherConfig,
    chat_id: String,
    theme: LauncherTheme,
    forwarded: ScriptAttributes,
    z_index: String,
    mounted: Cell<bool>,
}

impl<H: HostPage + ?Sized> Launcher<H> {
    /// Reads the launcher tag and resolves the tenant's theme.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::MissingTheme`] if `config.themes` has no
    /// entry for the tag's `data-id`.
    pub fn from_host(host: Rc<H>, config: &LauncherConfig) -> Result<Self, LauncherError> {
        let attributes = host.script_attributes(&config.script_suffix).unwrap_or_default();
        let chat_id = attributes.get(ATTR_ID).unwrap_or(DEFAULT_ID).to_string();

        let Some(theme) = config.themes.get(&chat_id).cloned() else {
            warn!("no launcher theme for chat id '{chat_id}'");
            return Err(LauncherError::MissingTheme(chat_id));
        };

        let mut forwarded = ScriptAttributes::new();
        forwarded.insert(ATTR_ID, chat_id.as_str());
        for name in FORWARDED {
            if let Some(value) = attributes.get(name) {
                forwarded.insert(*name, value);
            }
        }
        forwarded.insert(ATTR_MODE, DisplayMode::Panel.as_str());

        let z_index = attributes
            .get(ATTR_Z_INDEX)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_Z_INDEX.to_string());

        Ok(Self {
            host,
            config: config.clone(),
            chat_id,
            theme,
            forwarded,
            z_index,
            mounted: Cell::new(false),
        })
    }

    /// Attributes the injected loader tag will carry.
    pub fn forwarded_attributes(&self) -> &ScriptAttributes {
        &self.forwarded
    }

    /// Appends the button and its stylesheet.  A second call is a no-op.
    pub fn mount(&self) -> Result<(), LauncherError> {
        if self.mounted.get() || self.host.element_exists(&self.config.button_id) {
            debug!("launcher button already on the page");
            return Ok(());
        }

        let button = LauncherButton {
            id: self.config.button_id.clone(),
            logo_src: self.theme.logo_src.clone(),
            alt: self.chat_id.clone(),
            stylesheet: self.stylesheet(),
        };
        self.host.append_launcher(&button)?;
        self.mounted.set(true);
        info!("launcher button mounted for '{}'", self.chat_id);
        Ok(())
    }

    /// Injects the loader script and hides the button.
    pub fn on_click(&self) -> Result<ClickOutcome, LauncherError> {
        if self.host.element_exists(&self.config.loader_script_id) {
            return Ok(ClickOutcome::AlreadyInjected);
        }

        let script = ScriptElement {
            id: self.config.loader_script_id.clone(),
            src: self.config.loader_script_url.clone(),
            attributes: self.forwarded.clone(),
        };
        self.host.append_script(&script)?;
        self.host.hide_element(&self.config.button_id)?;
        info!("chat loader injected from launcher");
        Ok(ClickOutcome::Injected)
    }

    fn stylesheet(&self) -> String {
        let id = &self.config.button_id;
        format!(
            "#{id} {{ {} z-index: {}; }}\n#{id}:hover {{ {} }}\n#logo {{ {} }}",
            self.theme.button_css.trim(),
            self.z_index,
            self.theme.hover_css.trim(),
            self.theme.logo_css.trim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::host_page::{HostOp, MemoryHost};

    fn config() -> LauncherConfig {
        let mut config = LauncherConfig::default();
        config.themes.insert(
            "afterall".into(),
            LauncherTheme {
                logo_src: "https://cdn.example/bubble.svg".into(),
                button_css: "position: fixed;".into(),
                hover_css: "transform: scale(1.05);".into(),
                logo_css: "min-width: 172px;".into(),
            },
        );
        config
    }

    fn host(attrs: &[(&str, &str)]) -> Rc<MemoryHost> {
        Rc::new(MemoryHost::new().with_script("https://cdn.example/steno-button.js", attrs))
    }

    #[test]
    fn test_missing_theme_draws_nothing() {
        // Arrange
        let host = host(&[("data-id", "unknown-tenant")]);

        // Act
        let result = Launcher::from_host(Rc::clone(&host), &config());

        // Assert
        assert!(matches!(result, Err(LauncherError::MissingTheme(id)) if id == "unknown-tenant"));
        assert!(host.ops().is_empty());
    }

    #[test]
    fn test_mount_appends_themed_button() {
        let host = host(&[("data-id", "afterall"), ("data-z-index", "42")]);
        let launcher = Launcher::from_host(Rc::clone(&host), &config()).unwrap();

        launcher.mount().unwrap();
        launcher.mount().unwrap();

        let buttons: Vec<_> = host
            .ops()
            .into_iter()
            .filter_map(|op| match op {
                HostOp::AppendLauncher(button) => Some(button),
                _ => None,
            })
            .collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].logo_src, "https://cdn.example/bubble.svg");
        assert_eq!(buttons[0].alt, "afterall");
        assert!(buttons[0]
            .stylesheet
            .contains("#openChatButton { position: fixed; z-index: 42; }"));
    }

    #[test]
    fn test_click_forwards_attributes_and_forces_panel_mode() {
        let host = host(&[
            ("data-id", "afterall"),
            ("data-position", "left"),
            ("data-mode", "fullscreen"),
            ("data-language", "de"),
        ]);
        let launcher = Launcher::from_host(Rc::clone(&host), &config()).unwrap();
        launcher.mount().unwrap();

        let outcome = launcher.on_click().unwrap();

        assert_eq!(outcome, ClickOutcome::Injected);
        let script = host.script("stenoScript").unwrap();
        assert_eq!(script.src, "https://cdn.jsdelivr.net/gh/aisteno/embed@latest/steno-chat.js");
        assert_eq!(script.attributes.get("data-id"), Some("afterall"));
        assert_eq!(script.attributes.get("data-position"), Some("left"));
        assert_eq!(script.attributes.get("data-mode"), Some("panel"));
        assert_eq!(script.attributes.get("data-language"), None);
        assert_eq!(host.element_style("openChatButton", "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_second_click_is_a_noop() {
        let host = host(&[("data-id", "afterall")]);
        let launcher = Launcher::from_host(Rc::clone(&host), &config()).unwrap();
        launcher.mount().unwrap();

        assert_eq!(launcher.on_click().unwrap(), ClickOutcome::Injected);
        assert_eq!(launcher.on_click().unwrap(), ClickOutcome::AlreadyInjected);

        let scripts = host
            .ops()
            .into_iter()
            .filter(|op| matches!(op, HostOp::AppendScript { .. }))
            .count();
        assert_eq!(scripts, 1);
    }
}
