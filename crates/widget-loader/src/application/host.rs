//! The host-page seam.
//!
//! [`HostPage`] is everything the loader needs from the browser: reading the
//! embedding script tag, inserting and styling elements, registering event
//! listeners, opening links, and touching `document.cookie`.  The
//! application layer only ever talks to the page through this trait, which
//! is what lets the whole lifecycle run under `cargo test`.
//!
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use widget_core::{FrameSpec, ScriptAttributes, Viewport};

/// Error type for host-page operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("element '{0}' not found")]
    ElementNotFound(String),
    #[error("element '{0}' already exists")]
    DuplicateElement(String),
    /// The browser refused the operation (popup blocker, CSP, ...).
    #[error("host refused operation: {0}")]
    Refused(String),
}

/// Events the loader subscribes to on the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// `window` `message` events.
    Message,
    /// `window` `unload`.
    Unload,
    /// `error` events targeting the chat frame.
    FrameError,
}

/// Handle returned by [`HostPage::add_listener`], used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// A `MessageEvent` as seen by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// `event.origin` as reported by the browser.
    pub origin: String,
    /// `event.data`.
    pub data: serde_json::Value,
    /// `event.source === frame.contentWindow`.
    pub from_frame: bool,
}

impl InboundMessage {
    /// A message posted by the chat frame itself.
    pub fn from_frame(origin: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            origin: origin.into(),
            data,
            from_frame: true,
        }
    }
}

/// A `<script>` element to append to `document.body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    pub id: String,
    pub src: String,
    pub attributes: ScriptAttributes,
}

/// The launcher button and its stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherButton {
    pub id: String,
    pub logo_src: String,
    /// Alt text of the logo image.
    pub alt: String,
    /// Complete stylesheet appended to `document.head`.
    pub stylesheet: String,
}

/// Everything the loader needs from the embedding page.
///
/// All methods take `&self`: the page is a shared, single-threaded resource
/// and implementations use interior mutability.
#[async_trait(?Send)]
pub trait HostPage {
    /// `navigator.userAgent`.
    fn user_agent(&self) -> String;

    /// Attributes of the first `<script>` whose `src` ends with `src_suffix`
    /// (query string ignored), or `None` if there is no such tag.
    fn script_attributes(&self, src_suffix: &str) -> Option<ScriptAttributes>;

    /// `window.innerWidth` / `window.innerHeight`.
    fn viewport(&self) -> Viewport;

    /// `document.getElementById(id) !== null`.
    fn element_exists(&self, id: &str) -> bool;

    /// Resolves on the next `requestAnimationFrame` callback.
    async fn next_animation_frame(&self);

    /// Creates the iframe described by `spec` and appends it to the body.
    fn append_frame(&self, spec: &FrameSpec) -> Result<(), HostError>;

    /// Sets the frame's inline `width` and `height`.
    fn set_frame_size(&self, id: &str, width: &str, height: &str) -> Result<(), HostError>;

    /// Removes the element with `id`.  Returns `false` if it did not exist.
    fn remove_element(&self, id: &str) -> bool;

    /// `display: none` on the element with `id`.
    fn hide_element(&self, id: &str) -> Result<(), HostError>;

    fn add_listener(&self, kind: ListenerKind) -> ListenerId;

    /// Returns `false` if the listener was already removed.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// `window.open(url, "_blank", "noopener,noreferrer")`.
    fn open_new_context(&self, url: &Url) -> Result<(), HostError>;

    /// `window.location.href = url`.
    fn navigate_current(&self, url: &Url) -> Result<(), HostError>;

    /// Raw `document.cookie`.
    fn cookie_header(&self) -> String;

    /// `document.cookie = cookie`.
    fn set_cookie(&self, cookie: &str) -> Result<(), HostError>;

    fn append_script(&self, script: &ScriptElement) -> Result<(), HostError>;

    fn append_launcher(&self, button: &LauncherButton) -> Result<(), HostError>;
}
