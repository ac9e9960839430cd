//! Origin helpers: hostname extraction and the static chat-URL allow-list.

use url::Url;

/// Extracts the lowercase hostname from an absolute URL or a
/// `MessageEvent.origin` string.
///
/// Returns `None` for malformed input, opaque origins (`"null"`), and URLs
/// without a host (`mailto:`, `data:`).
pub fn hostname_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_ascii_lowercase())
}

/// `true` when `candidate` is in `allowed`, either verbatim or by sharing the
/// scheme/host/port origin of an allowed entry.
///
/// Malformed candidates are never allowed.  Malformed allow-list entries
/// only ever match verbatim.
///
/// ```rust
/// use widget_core::is_allowed_target;
///
/// let allowed = ["https://chat.steno.ai"];
/// assert!(is_allowed_target("https://chat.steno.ai/", &allowed));
/// assert!(!is_allowed_target("https://chat.steno.ai.evil.com", &allowed));
/// ```
pub fn is_allowed_target<S: AsRef<str>>(candidate: &str, allowed: &[S]) -> bool {
    if allowed.iter().any(|a| a.as_ref() == candidate) {
        return true;
    }

    let Ok(candidate) = Url::parse(candidate) else {
        return false;
    };
    let origin = candidate.origin();
    if !origin.is_tuple() {
        return false;
    }

    allowed
        .iter()
        .filter_map(|a| Url::parse(a.as_ref()).ok())
        .any(|a| a.origin() == origin)
}
