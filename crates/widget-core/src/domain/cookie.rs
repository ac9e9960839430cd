//! The session cookie mirrored from the host page onto the chat domain.
//!
//! Some tenants authenticate visitors on their own site and want the chat
//! application to see the same session.  The loader copies one named cookie
//! from `document.cookie` into a cookie with a fixed name scoped to the chat
//! domain.  This module only *formats* that cookie; reading and writing
//! `document.cookie` is the host adapter's job.

/// A cookie ready to be assigned to `document.cookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgedCookie {
    pub name: String,
    /// Raw (unencoded) value.
    pub value: String,
    pub domain: String,
}

impl BridgedCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
        }
    }

    /// Serializes the cookie for a `document.cookie` assignment.
    ///
    /// The value is percent-encoded (the `encodeURIComponent` character set)
    /// and the cookie is always `secure`, `samesite=lax`, `path=/`.
    ///
    /// ```rust
    /// use widget_core::BridgedCookie;
    ///
    /// let c = BridgedCookie::new("steno_session", "a b", ".steno.ai");
    /// assert_eq!(
    ///     c.to_header_value(),
    ///     "steno_session=a%20b; domain=.steno.ai; path=/; secure; samesite=lax"
    /// );
    /// ```
    pub fn to_header_value(&self) -> String {
        format!(
            "{}={}; domain={}; path=/; secure; samesite=lax",
            self.name,
            urlencoding::encode(&self.value),
            self.domain
        )
    }
}

/// Finds `name` in a raw `document.cookie` string (`"a=1; b=2"`).
///
/// Returns the raw value of the first match.  An empty value counts as unset.
pub fn find_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}
