//! Application layer for widget-loader.
//!
//! Use cases that drive the widget: the per-session lifecycle, domain
//! validation, the cookie bridge and the launcher button.  They talk to the
//! outside world only through the [`HostPage`] and [`DomainCheck`] traits.

pub mod cookie_bridge;
pub mod domain_validator;
pub mod host;
pub mod launcher;
pub mod widget_session;

pub use cookie_bridge::{mirror_cookie, CookieBridgeOutcome};
pub use domain_validator::{CheckError, DomainCheck, DomainValidator};
pub use host::{
    HostError, HostPage, InboundMessage, LauncherButton, ListenerId, ListenerKind, ScriptElement,
};
pub use launcher::{ClickOutcome, Launcher, LauncherError};
pub use widget_session::{MessageOutcome, RejectReason, StartOutcome, WidgetSession};
