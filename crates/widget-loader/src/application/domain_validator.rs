//! Domain validation with request coalescing.
//!
//! Before the loader frames a chat URL, and again for every `postMessage`
//! it receives, it must know whether the origin involved is trusted.  The
//! answer comes from a [`DomainCheck`] (normally the remote domain-check
//! service) and is cached per hostname for the lifetime of the session.
//!
//! # Coalescing
//!
//! The first message from the frame typically arrives while the mount-time
//! check for the same hostname is still in flight, and a chatty frame can
//! post several messages before either resolves.  The cache therefore stores
//! the *pending* check, not just its result: every caller for the same
//! hostname awaits the same shared future, so exactly one request is issued
//! per hostname and every caller observes the same answer.
//!
//! # Fail closed
//!
//! Any error from the check (network failure, non-success status, malformed
//! body) and any URL without a hostname resolves to `false`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use thiserror::Error;
use tracing::{debug, info, warn};
use widget_core::hostname_of;

/// Errors a [`DomainCheck`] can report.  The validator turns all of them
/// into `false`.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The request could not be sent or the connection failed.
    #[error("domain-check request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("domain-check service answered HTTP {0}")]
    Status(u16),

    /// The response body was not `{"isValid": bool}`.
    #[error("malformed domain-check response: {0}")]
    Malformed(String),

    /// The configured service base URL is not a valid URL.
    #[error("invalid domain-check service URL '{0}'")]
    InvalidServiceUrl(String),
}

/// Decides whether a single hostname is trusted.
///
/// Implementations are called at most once per hostname per session by
/// [`DomainValidator`]; they do not need their own cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait DomainCheck {
    /// Returns `Ok(true)` only for an explicit positive answer.
    async fn check(&self, hostname: &str) -> Result<bool, CheckError>;
}

type PendingCheck = Shared<LocalBoxFuture<'static, bool>>;

/// Per-session, coalescing cache in front of a [`DomainCheck`].
pub struct DomainValidator {
    checker: Rc<dyn DomainCheck>,
    cache: RefCell<HashMap<String, PendingCheck>>,
}

impl DomainValidator {
    /// Creates a validator with an empty cache.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::rc::Rc;
    /// use widget_loader::application::DomainValidator;
    /// use widget_loader::infrastructure::domain_check::AllowListCheck;
    ///
    /// let validator = DomainValidator::new(Rc::new(AllowListCheck::new(["https://chat.steno.ai"])));
    /// assert!(tokio_test::block_on(validator.validate("https://chat.steno.ai/chat")));
    /// assert!(!tokio_test::block_on(validator.validate("https://evil.example")));
    /// ```
    pub fn new(checker: Rc<dyn DomainCheck>) -> Self {
        Self {
            checker,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolves whether `url`'s hostname is trusted.
    ///
    /// `url` may be a full URL or a bare origin such as
    /// `MessageEvent.origin`.  See the module docs for the coalescing and
    /// fail-closed guarantees.
    pub async fn validate(&self, url: &str) -> bool {
        let Some(hostname) = hostname_of(url) else {
            debug!("no hostname in '{url}'; treating as untrusted");
            return false;
        };

        // The borrow must end before the await below: other callers need
        // the cache while this check is pending.
        let pending = {
            let mut cache = self.cache.borrow_mut();
            cache
                .entry(hostname.clone())
                .or_insert_with(|| self.issue_check(hostname))
                .clone()
        };

        pending.await
    }

    /// Resolved outcome for `hostname`, or `None` if the check has not been
    /// issued or is still pending.
    pub fn cached_outcome(&self, hostname: &str) -> Option<bool> {
        self.cache
            .borrow()
            .get(&hostname.to_ascii_lowercase())
            .and_then(|pending| pending.peek().copied())
    }

    /// Number of hostnames with an issued check.
    pub fn cached_hosts(&self) -> usize {
        self.cache.borrow().len()
    }

    fn issue_check(&self, hostname: String) -> PendingCheck {
        debug!("issuing domain check for {hostname}");
        let checker = Rc::clone(&self.checker);
        async move {
            match checker.check(&hostname).await {
                Ok(valid) => {
                    info!("domain check for {hostname}: {}", if valid { "trusted" } else { "not trusted" });
                    valid
                }
                Err(e) => {
                    warn!("domain check for {hostname} failed closed: {e}");
                    false
                }
            }
        }
        .boxed_local()
        .shared()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
