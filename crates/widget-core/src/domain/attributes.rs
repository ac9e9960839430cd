//! Widget configuration read from the embedding script tag.
//!
//! The host page configures the widget entirely through `data-*` attributes
//! on the `<script>` element that loads it.  [`ScriptAttributes`] is a plain
//! snapshot of those attributes; [`WidgetConfig::from_attributes`] turns the
//! snapshot into a typed, immutable configuration.
//!
//! # Absent vs. empty
//!
//! Site owners frequently write `data-backend=""` when they mean "not set".
//! An empty (or whitespace-only) attribute is therefore treated exactly like
//! a missing one.
//!
//! # Lenient parsing
//!
//! A typo in `data-position` must never break the host page.  Unknown
//! position or mode values are logged at `warn` level and treated as absent;
//! an unparseable `data-z-index` falls back to [`DEFAULT_Z_INDEX`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// `data-id`: tenant identifier forwarded to the chat application.
pub const ATTR_ID: &str = "data-id";
/// `data-url`: base URL of the hosted chat application.
pub const ATTR_URL: &str = "data-url";
/// `data-position`: `left`, `right`, or `center`.
pub const ATTR_POSITION: &str = "data-position";
/// `data-mode`: `panel` or `fullscreen`.
pub const ATTR_MODE: &str = "data-mode";
/// `data-backend`: opaque backend selector forwarded to the chat application.
pub const ATTR_BACKEND: &str = "data-backend";
/// `data-language`: preferred UI language.
pub const ATTR_LANGUAGE: &str = "data-language";
/// `data-z-index`: stacking order of the frame.
pub const ATTR_Z_INDEX: &str = "data-z-index";
/// `data-cookie-name`: name of the host-page cookie to mirror.
pub const ATTR_COOKIE_NAME: &str = "data-cookie-name";
/// `data-cookie-domain`: domain the mirrored cookie is scoped to.
pub const ATTR_COOKIE_DOMAIN: &str = "data-cookie-domain";

/// Identifier used when the script tag carries no `data-id`.
pub const DEFAULT_ID: &str = "default";

/// Stacking order used when `data-z-index` is absent or malformed.
pub const DEFAULT_Z_INDEX: i32 = 9999;

/// Error type for individual attribute values that cannot be parsed.
///
/// These errors never abort initialization on their own; they are logged and
/// the offending attribute is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown position '{0}' (expected left, right or center)")]
    InvalidPosition(String),
    #[error("unknown display mode '{0}' (expected panel or fullscreen)")]
    InvalidMode(String),
    #[error("z-index '{0}' is not an integer")]
    InvalidZIndex(String),
}

// ── Attribute snapshot ────────────────────────────────────────────────────────

/// Snapshot of the `data-*` attributes on the embedding script element.
///
/// Keys are full attribute names (including the `data-` prefix).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAttributes {
    values: BTreeMap<String, String>,
}

impl ScriptAttributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the trimmed value of `name`, or `None` when the attribute is
    /// missing or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Iterates over all attributes in name order, including blank ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScriptAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

// ── Enumerations ──────────────────────────────────────────────────────────────

/// Where the collapsed widget is docked on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Left,
    Right,
    Center,
}

impl Position {
    /// The lowercase attribute/query value.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
            Position::Center => "center",
        }
    }
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            "center" => Ok(Position::Center),
            _ => Err(ConfigError::InvalidPosition(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the chat application presents itself inside the frame.
///
/// A missing `data-mode` means "none": the chat application picks its own
/// default and the loader behaves as in panel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Floating panel that grows from the collapsed launcher.
    Panel,
    /// The frame covers the whole viewport; resize requests are ignored.
    Fullscreen,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Panel => "panel",
            DisplayMode::Fullscreen => "fullscreen",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panel" => Ok(DisplayMode::Panel),
            "fullscreen" => Ok(DisplayMode::Fullscreen),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── WidgetConfig ──────────────────────────────────────────────────────────────

/// Typed widget configuration, read once at initialization.
///
/// The struct is immutable after creation: the loader never re-reads the
/// script tag, so later attribute mutations on the host page have no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Tenant identifier; always present (defaults to `"default"`).
    pub id: String,
    /// Chat application base URL as written on the tag.
    ///
    /// `None` means the loader profile's default URL applies.  The value is
    /// *not* trusted yet; see `policy::origin::is_allowed_target`.
    pub url: Option<String>,
    pub position: Option<Position>,
    pub mode: Option<DisplayMode>,
    /// Opaque backend selector, forwarded verbatim.
    pub backend: Option<String>,
    pub language: Option<String>,
    pub z_index: i32,
    /// Host-page cookie to mirror onto the chat domain.
    pub cookie_name: Option<String>,
    /// Domain the mirrored cookie is written to.
    pub cookie_domain: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID.to_string(),
            url: None,
            position: None,
            mode: None,
            backend: None,
            language: None,
            z_index: DEFAULT_Z_INDEX,
            cookie_name: None,
            cookie_domain: None,
        }
    }
}

impl WidgetConfig {
    /// Builds a configuration from the script tag's attributes.
    ///
    /// Never fails: malformed values are logged and dropped (see the module
    /// docs).
    ///
    /// # Example
    ///
    /// ```rust
    /// use widget_core::{Position, ScriptAttributes, WidgetConfig};
    ///
    /// let attrs: ScriptAttributes =
    ///     [("data-id", "acme"), ("data-position", "left")].into_iter().collect();
    /// let cfg = WidgetConfig::from_attributes(&attrs);
    /// assert_eq!(cfg.id, "acme");
    /// assert_eq!(cfg.position, Some(Position::Left));
    /// assert_eq!(cfg.z_index, 9999);
    /// ```
    pub fn from_attributes(attrs: &ScriptAttributes) -> Self {
        let owned = |name: &str| attrs.get(name).map(str::to_string);

        Self {
            id: attrs.get(ATTR_ID).unwrap_or(DEFAULT_ID).to_string(),
            url: owned(ATTR_URL),
            position: parse_lenient(attrs.get(ATTR_POSITION)),
            mode: parse_lenient(attrs.get(ATTR_MODE)),
            backend: owned(ATTR_BACKEND),
            language: owned(ATTR_LANGUAGE),
            z_index: parse_z_index(attrs.get(ATTR_Z_INDEX)),
            cookie_name: owned(ATTR_COOKIE_NAME),
            cookie_domain: owned(ATTR_COOKIE_DOMAIN),
        }
    }

    /// `true` when the frame covers the whole viewport.
    pub fn is_fullscreen(&self) -> bool {
        self.mode == Some(DisplayMode::Fullscreen)
    }

    /// Resolves the chat URL, falling back to `default_url` when the tag
    /// carries none.
    pub fn target_url<'a>(&'a self, default_url: &'a str) -> &'a str {
        self.url.as_deref().unwrap_or(default_url)
    }
}

fn parse_lenient<T>(raw: Option<&str>) -> Option<T>
where
    T: FromStr<Err = ConfigError>,
{
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring widget attribute: {e}");
            None
        }
    }
}

fn parse_z_index(raw: Option<&str>) -> i32 {
    let Some(raw) = raw else {
        return DEFAULT_Z_INDEX;
    };
    match raw.parse::<i32>() {
        Ok(z) => z,
        Err(_) => {
            warn!("{}; using {DEFAULT_Z_INDEX}", ConfigError::InvalidZIndex(raw.to_string()));
            DEFAULT_Z_INDEX
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
