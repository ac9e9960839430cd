//! The postMessage protocol spoken by the chat frame.
//!
//! The frame talks to the host page with `window.parent.postMessage(data, "*")`.
//! Only two commands exist today; see [`messages::FrameMessage`].

pub mod messages;

pub use messages::{parse_frame_message, FrameMessage, MessageError};
