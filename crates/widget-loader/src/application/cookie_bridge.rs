//! Mirrors a host-page cookie onto the chat domain.
//!
//! Runs once, before the frame is mounted, when the tag carries both
//! `data-cookie-name` and `data-cookie-domain`.  Failures are logged and
//! otherwise ignored: the widget works without the bridged session.

use tracing::{debug, info, warn};
use widget_core::domain::cookie::find_cookie;
use widget_core::{BridgedCookie, WidgetConfig};

use super::host::HostPage;

/// What the cookie bridge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieBridgeOutcome {
    /// The tag lacks a cookie name or a cookie domain.
    NotConfigured,
    /// The source cookie is not set on the host page.
    SourceUnset,
    Written(BridgedCookie),
    /// The host refused the write.
    Failed(String),
}

/// Copies the cookie named by `config.cookie_name` into `bridged_name`,
/// scoped to `config.cookie_domain`.
pub fn mirror_cookie<H: HostPage + ?Sized>(
    host: &H,
    config: &WidgetConfig,
    bridged_name: &str,
) -> CookieBridgeOutcome {
    let (Some(source), Some(domain)) = (&config.cookie_name, &config.cookie_domain) else {
        return CookieBridgeOutcome::NotConfigured;
    };

    let header = host.cookie_header();
    let Some(value) = find_cookie(&header, source) else {
        debug!("cookie '{source}' not set; nothing to bridge");
        return CookieBridgeOutcome::SourceUnset;
    };

    let cookie = BridgedCookie::new(bridged_name, value, domain.as_str());
    match host.set_cookie(&cookie.to_header_value()) {
        Ok(()) => {
            info!("bridged cookie '{source}' to {bridged_name} on {domain}");
            CookieBridgeOutcome::Written(cookie)
        }
        Err(e) => {
            warn!("failed to write bridged cookie: {e}");
            CookieBridgeOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::host_page::{HostOp, MemoryHost};

    fn config(name: Option<&str>, domain: Option<&str>) -> WidgetConfig {
        WidgetConfig {
            cookie_name: name.map(String::from),
            cookie_domain: domain.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_encoded_cookie_when_configured() {
        // Arrange
        let host = MemoryHost::new().with_cookies("other=1; sid=abc def");

        // Act
        let outcome = mirror_cookie(&host, &config(Some("sid"), Some(".steno.ai")), "steno_session");

        // Assert
        assert_eq!(
            outcome,
            CookieBridgeOutcome::Written(BridgedCookie::new("steno_session", "abc def", ".steno.ai"))
        );
        assert_eq!(
            host.ops(),
            vec![HostOp::SetCookie(
                "steno_session=abc%20def; domain=.steno.ai; path=/; secure; samesite=lax".into()
            )]
        );
    }

    #[test]
    fn test_noop_without_name_or_domain() {
        let host = MemoryHost::new().with_cookies("sid=abc");

        assert_eq!(
            mirror_cookie(&host, &config(Some("sid"), None), "steno_session"),
            CookieBridgeOutcome::NotConfigured
        );
        assert_eq!(
            mirror_cookie(&host, &config(None, Some(".steno.ai")), "steno_session"),
            CookieBridgeOutcome::NotConfigured
        );
        assert!(host.ops().is_empty());
    }

    #[test]
    fn test_noop_when_source_cookie_unset() {
        let host = MemoryHost::new().with_cookies("other=1; sid=");

        let outcome = mirror_cookie(&host, &config(Some("sid"), Some(".steno.ai")), "steno_session");

        assert_eq!(outcome, CookieBridgeOutcome::SourceUnset);
        assert!(host.ops().is_empty());
    }

    #[test]
    fn test_refused_write_is_reported_not_raised() {
        let host = MemoryHost::new().with_cookies("sid=abc").refuse_cookies();

        let outcome = mirror_cookie(&host, &config(Some("sid"), Some(".steno.ai")), "steno_session");

        assert!(matches!(outcome, CookieBridgeOutcome::Failed(_)));
    }
}
