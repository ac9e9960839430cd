//! Scheme filtering for `navigate` requests from the chat frame.
//!
//! The frame can ask the host page to open links.  Without a scheme check a
//! compromised or spoofed frame could hand the host page a `javascript:` URL
//! and run script in the host's origin.  Only an explicit set of schemes is
//! honoured; everything else is rejected.
//!
//! `tel:` links are special: opening a blank tab for a phone number leaves an
//! empty window behind on desktop, so the current page navigates instead and
//! the OS dialer takes over.

use url::Url;

/// Schemes honoured when the loader profile does not override them.
pub const DEFAULT_NAVIGATION_SCHEMES: &[&str] = &["https", "tel", "mailto"];

/// What the host page should do with a `navigate` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// `window.open(url, "_blank", "noopener,noreferrer")`.
    OpenNewContext(Url),
    /// `window.location.href = url` (telephone links).
    NavigateCurrent(Url),
    /// Do nothing.  The string says why, for the log line.
    Rejected(String),
}

/// Decides how to handle a navigation request to `raw_url`.
///
/// `allowed_schemes` are compared case-insensitively without the trailing
/// colon (`"https"`, not `"https:"`).
///
/// # Example
///
/// ```rust
/// use widget_core::{classify_navigation, NavigationDecision};
///
/// let allowed = ["https", "tel", "mailto"];
/// assert!(matches!(classify_navigation("tel:+1555", &allowed), NavigationDecision::NavigateCurrent(_)));
/// assert!(matches!(classify_navigation("javascript:alert(1)", &allowed), NavigationDecision::Rejected(_)));
/// ```
pub fn classify_navigation<S: AsRef<str>>(raw_url: &str, allowed_schemes: &[S]) -> NavigationDecision {
    let url = match Url::parse(raw_url.trim()) {
        Ok(url) => url,
        Err(e) => return NavigationDecision::Rejected(format!("unparseable URL: {e}")),
    };

    // `Url` lowercases the scheme while parsing.
    let scheme = url.scheme();
    let allowed = allowed_schemes
        .iter()
        .any(|s| s.as_ref().trim_end_matches(':').eq_ignore_ascii_case(scheme));
    if !allowed {
        return NavigationDecision::Rejected(format!("scheme '{scheme}' is not allowed"));
    }

    if scheme == "tel" {
        NavigationDecision::NavigateCurrent(url)
    } else {
        NavigationDecision::OpenNewContext(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(raw: &str) -> NavigationDecision {
        classify_navigation(raw, DEFAULT_NAVIGATION_SCHEMES)
    }

    #[test]
    fn test_https_opens_new_context() {
        match classify("https://x.com") {
            NavigationDecision::OpenNewContext(url) => assert_eq!(url.as_str(), "https://x.com/"),
            other => panic!("expected OpenNewContext, got {:?}", other),
        }
    }

    #[test]
    fn test_tel_navigates_current_page() {
        match classify("tel:+1555") {
            NavigationDecision::NavigateCurrent(url) => assert_eq!(url.as_str(), "tel:+1555"),
            other => panic!("expected NavigateCurrent, got {:?}", other),
        }
    }

    #[test]
    fn test_mailto_opens_new_context() {
        assert!(matches!(
            classify("mailto:help@steno.ai"),
            NavigationDecision::OpenNewContext(_)
        ));
    }

    #[test]
    fn test_javascript_is_rejected() {
        assert!(matches!(classify("javascript:alert(1)"), NavigationDecision::Rejected(_)));
        assert!(matches!(classify("JavaScript:alert(1)"), NavigationDecision::Rejected(_)));
    }

    #[test]
    fn test_plain_http_is_rejected_by_default() {
        assert!(matches!(classify("http://x.com"), NavigationDecision::Rejected(_)));
    }

    #[test]
    fn test_data_url_is_rejected() {
        assert!(matches!(
            classify("data:text/html,<script>alert(1)</script>"),
            NavigationDecision::Rejected(_)
        ));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        assert!(matches!(classify("/pricing"), NavigationDecision::Rejected(_)));
    }

    #[test]
    fn test_custom_scheme_list_with_colons() {
        let allowed = ["https:", "http:"];
        assert!(matches!(
            classify_navigation("http://x.com", &allowed),
            NavigationDecision::OpenNewContext(_)
        ));
        assert!(matches!(
            classify_navigation("tel:+1555", &allowed),
            NavigationDecision::Rejected(_)
        ));
    }
}
