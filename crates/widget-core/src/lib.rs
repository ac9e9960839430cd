//! # widget-core
//!
//! Shared library for the embeddable chat widget containing the configuration
//! model, frame construction, the postMessage protocol, and the trust
//! policies applied to everything the chat frame asks the host page to do.
//!
//! This crate has zero dependencies on the DOM, network sockets, or async
//! runtimes.  Everything here is a pure function of its inputs, which is what
//! makes the loader's behaviour testable outside a browser.
//!
//! # Architecture overview (for newcomers)
//!
//! A third-party site embeds the widget with a single script tag:
//!
//! ```html
//! <script src="https://cdn.example/steno-chat.js"
//!         data-id="acme" data-position="left"></script>
//! ```
//!
//! The loader reads the tag's `data-*` attributes, checks that the chat URL
//! is trusted, and mounts an iframe pointing at the hosted chat application.
//! From then on the iframe can ask the host page to resize it or to open a
//! link.  This crate defines:
//!
//! - **`domain`** – What the widget *is*: the [`WidgetConfig`] read from the
//!   script tag, the [`FrameSpec`] describing the iframe, and the mirrored
//!   session cookie.
//!
//! - **`protocol`** – What the frame may *say*: the JSON messages arriving via
//!   `postMessage`.
//!
//! - **`policy`** – What the host page is *willing to do* about it: crawler
//!   detection, origin allow-listing, navigation scheme filtering, and the
//!   resize/mobile heuristic.

pub mod domain;
pub mod policy;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `widget_core::WidgetConfig` instead of the full module path.
pub use domain::attributes::{ConfigError, DisplayMode, Position, ScriptAttributes, WidgetConfig};
pub use domain::cookie::BridgedCookie;
pub use domain::frame::{build_frame_url, FrameError, FrameLayout, FrameSpec};
pub use policy::crawler::CrawlerDetector;
pub use policy::navigation::{classify_navigation, NavigationDecision};
pub use policy::origin::{hostname_of, is_allowed_target};
pub use policy::resize::{decide_resize, MobileBreakpoint, ResizeDecision, Viewport};
pub use protocol::messages::{parse_frame_message, FrameMessage, MessageError};
