//! Description of the chat iframe the loader mounts.
//!
//! [`build_frame_url`] turns the target URL plus the widget configuration
//! into the iframe `src`; [`FrameSpec`] bundles that URL with the element id,
//! accessibility attributes, permissions and initial geometry so the host
//! adapter can create the element without knowing anything about widgets.
//!
//! # Query string
//!
//! ```text
//! <target><frame_path>?id=<id>&position=<p>&mode=<m>&backend=<b>&language=<l>&mobile=<bool>
//! ```
//!
//! `id` and `mobile` are always present; every other field is appended only
//! when configured.  Values are form-urlencoded, matching what the chat
//! application parses with `URLSearchParams`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::attributes::{Position, WidgetConfig};

/// Width and height of the collapsed (launcher bubble) frame.
pub const COLLAPSED_SIZE: &str = "80px";

/// Width of the collapsed frame when docked at the bottom centre.
pub const CENTER_COLLAPSED_WIDTH: &str = "330px";

/// Permissions delegated to the chat frame via the `allow` attribute.
pub const FRAME_PERMISSIONS: &str =
    "autoplay; clipboard-write *; clipboard-read *; encrypted-media *; fullscreen; picture-in-picture; microphone *;";

/// Errors produced while building the frame description.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The target URL is not an absolute URL.
    #[error("invalid chat URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The target URL parsed but cannot carry a hierarchical path
    /// (e.g. `mailto:`).
    #[error("chat URL '{0}' cannot be used as a frame source")]
    NotABase(String),
}

/// Builds the iframe `src` for `config`.
///
/// `frame_path` is appended to the path of `target_url` (after trimming a
/// trailing `/`), e.g. `"/chat"`.  Pass `""` for chat applications served
/// from the root.  Any query or fragment on `target_url` is dropped; the
/// query of the frame URL carries the widget configuration only.
///
/// # Errors
///
/// Returns [`FrameError::InvalidUrl`] when `target_url` does not parse
/// and [`FrameError::NotABase`] for URLs without an authority.
///
/// # Example
///
/// ```rust
/// use widget_core::{build_frame_url, Position, WidgetConfig};
///
/// let cfg = WidgetConfig { id: "x".into(), position: Some(Position::Left), ..Default::default() };
/// let url = build_frame_url("https://chat.steno.ai", "/chat", &cfg, false).unwrap();
/// assert_eq!(url.as_str(), "https://chat.steno.ai/chat?id=x&position=left&mobile=false");
/// ```
pub fn build_frame_url(
    target_url: &str,
    frame_path: &str,
    config: &WidgetConfig,
    mobile: bool,
) -> Result<Url, FrameError> {
    let mut url = Url::parse(target_url.trim()).map_err(|source| FrameError::InvalidUrl {
        url: target_url.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(FrameError::NotABase(target_url.to_string()));
    }

    let path = format!("{}{}", url.path().trim_end_matches('/'), frame_path);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("id", &config.id);
        if let Some(position) = config.position {
            query.append_pair("position", position.as_str());
        }
        if let Some(mode) = config.mode {
            query.append_pair("mode", mode.as_str());
        }
        if let Some(backend) = &config.backend {
            query.append_pair("backend", backend);
        }
        if let Some(language) = &config.language {
            query.append_pair("language", language);
        }
        query.append_pair("mobile", if mobile { "true" } else { "false" });
    }

    Ok(url)
}

// ── FrameSpec ─────────────────────────────────────────────────────────────────

/// Initial placement of the frame on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLayout {
    /// Collapsed launcher docked to the bottom edge; grows on `resize`.
    #[default]
    Docked,
    /// Covers the whole viewport from the start.
    FullViewport,
}

/// Everything a host adapter needs to create the chat iframe.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    /// Reserved element id; its presence is the "already loaded" marker.
    pub id: String,
    pub src: Url,
    pub title: String,
    /// Element attributes other than `id`, `src`, `title` and `style`.
    pub attributes: Vec<(String, String)>,
    /// Inline style declarations, in application order.
    pub style: Vec<(String, String)>,
}

impl FrameSpec {
    /// Describes the frame for `config` at `layout`.
    pub fn new(id: &str, src: Url, title: &str, layout: FrameLayout, config: &WidgetConfig) -> Self {
        let attributes = [
            ("aria-hidden", "true"),
            ("tabindex", "-1"),
            ("loading", "lazy"),
            ("allow", FRAME_PERMISSIONS),
            ("scrolling", "no"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut style = vec![
            decl("position", "fixed"),
            decl("bottom", "0"),
            decl("z-index", &config.z_index.to_string()),
            decl("border", "none"),
            decl("color-scheme", "only dark"),
            decl("overflow", "hidden"),
        ];

        match layout {
            FrameLayout::FullViewport => {
                style.extend([
                    decl("top", "0"),
                    decl("left", "0"),
                    decl("right", "0"),
                    decl("width", "100vw"),
                    decl("height", "100vh"),
                ]);
            }
            FrameLayout::Docked => match config.position {
                Some(Position::Center) => style.extend([
                    decl("left", "50%"),
                    decl("transform", "translateX(-50%)"),
                    decl("width", CENTER_COLLAPSED_WIDTH),
                    decl("height", COLLAPSED_SIZE),
                ]),
                Some(Position::Left) => style.extend([
                    decl("left", "0"),
                    decl("width", COLLAPSED_SIZE),
                    decl("height", COLLAPSED_SIZE),
                ]),
                Some(Position::Right) | None => style.extend([
                    decl("right", "0"),
                    decl("width", COLLAPSED_SIZE),
                    decl("height", COLLAPSED_SIZE),
                ]),
            },
        }

        Self {
            id: id.to_string(),
            src,
            title: title.to_string(),
            attributes,
            style,
        }
    }

    /// Looks up an inline style declaration.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up an element attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn decl(property: &str, value: &str) -> (String, String) {
    (property.to_string(), value.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
