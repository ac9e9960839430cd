//! Domain layer for widget-core.
//!
//! Pure value types describing the widget.  Nothing in here touches the DOM
//! or the network.
//!
//! # What belongs in the domain layer?
//!
//! - The configuration read from the embedding script tag
//! - The description of the iframe the loader mounts
//! - The cookie mirrored to the chat domain
//!
//! # What does NOT belong here?
//!
//! - Deciding whether something is *trusted* (that is `policy`)
//! - Anything that awaits, blocks, or reads global state

pub mod attributes;
pub mod cookie;
pub mod frame;

pub use attributes::{DisplayMode, Position, ScriptAttributes, WidgetConfig};
pub use cookie::BridgedCookie;
pub use frame::{FrameLayout, FrameSpec};
