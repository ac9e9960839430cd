//! JSON message types sent by the chat frame to the host page.
//!
//! # JSON discriminant
//!
//! Every message is a JSON object with an `"action"` field that identifies
//! the command.  All other fields sit in the same object:
//!
//! ```json
//! {"action":"navigate","url":"https://steno.ai/pricing"}
//! {"action":"resize","width":"400px","height":"640px"}
//! ```
//!
//! Serde's `#[serde(tag = "action")]` handles this.  Actions this loader does
//! not know deserialize to [`FrameMessage::Unknown`] so newer chat frames can
//! talk to older loaders without errors.
//!
//! # Why are the payload fields optional?
//!
//! The frame is another origin's code.  A `resize` without a `height` is not
//! a protocol error worth logging; it is simply a command with nothing to do.
//! The session treats missing fields as "ignore this message".

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Commands the chat frame can send to the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FrameMessage {
    /// Open `url` outside the frame (new tab, or the dialer for `tel:`).
    Navigate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Change the frame's CSS size.
    ///
    /// Values are CSS lengths such as `"400px"` or `"100%"`.  Bare JSON
    /// numbers are accepted and interpreted as pixels.
    Resize {
        #[serde(
            default,
            deserialize_with = "css_length",
            skip_serializing_if = "Option::is_none"
        )]
        width: Option<String>,
        #[serde(
            default,
            deserialize_with = "css_length",
            skip_serializing_if = "Option::is_none"
        )]
        height: Option<String>,
    },

    /// Any action this loader does not understand.
    #[serde(other)]
    Unknown,
}

impl FrameMessage {
    /// Short name used in log lines.
    pub fn action(&self) -> &'static str {
        match self {
            FrameMessage::Navigate { .. } => "navigate",
            FrameMessage::Resize { .. } => "resize",
            FrameMessage::Unknown => "unknown",
        }
    }
}

/// Reasons an inbound `postMessage` payload is not a frame command.
#[derive(Debug, Error)]
pub enum MessageError {
    /// No string `action` field.  Other scripts on the page post messages
    /// too, so this is expected traffic and not worth a warning.
    #[error("message has no action field")]
    MissingAction,

    /// The `action` is known but the payload has the wrong shape.
    #[error("malformed '{action}' message: {source}")]
    Malformed {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Interprets a `MessageEvent.data` payload.
///
/// # Errors
///
/// - [`MessageError::MissingAction`] when `data` is not an object or has no
///   string `action` field.
/// - [`MessageError::Malformed`] when a known action carries fields of the
///   wrong type (e.g. `"url": 42`).
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use widget_core::{parse_frame_message, FrameMessage};
///
/// let msg = parse_frame_message(&json!({"action": "resize", "width": "400px", "height": 640})).unwrap();
/// assert_eq!(msg, FrameMessage::Resize { width: Some("400px".into()), height: Some("640px".into()) });
/// ```
pub fn parse_frame_message(data: &serde_json::Value) -> Result<FrameMessage, MessageError> {
    let action = data
        .get("action")
        .and_then(|a| a.as_str())
        .ok_or(MessageError::MissingAction)?;

    FrameMessage::deserialize(data).map_err(|source| MessageError::Malformed {
        action: action.to_string(),
        source,
    })
}

fn css_length<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Pixels(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Pixels(n) => format!("{n}px"),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
