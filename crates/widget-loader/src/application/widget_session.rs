//! WidgetSession: the lifecycle of one chat widget on one page load.
//!
//! A session owns all per-page state of the loader: the domain-validation
//! cache, the "already loaded" guard, the registered listeners and the
//! mounted frame.  It is created when the loader script runs and dropped on
//! unload.
//!
//! # Flow
//!
//! ```text
//! start()
//!   ├─ crawler UA / frame already on page ─────────────► Skipped
//!   ├─ read <script> attributes → WidgetConfig
//!   ├─ Validating: allow-list + DomainValidator ───────► Rejected
//!   ├─ cookie bridge (fire-and-forget)
//!   ├─ build FrameSpec, wait one animation frame
//!   └─ append frame, register listeners ───────────────► Mounted
//!
//! on_message()   Mounted/Resized only; origin validated per message
//!   ├─ resize   → decide_resize → set_frame_size ──────► Resized
//!   └─ navigate → classify_navigation → open / navigate
//!
//! on_unload() / on_frame_error() ──────────────────────► TornDown
//! ```
//!
//! All methods take `&self`.  The host dispatches events into the session
//! while `start()` may still be awaiting the domain check, so state lives in
//! `Cell`/`RefCell`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use widget_core::{
    build_frame_url, classify_navigation, decide_resize, hostname_of, is_allowed_target,
    parse_frame_message, CrawlerDetector, FrameLayout, FrameMessage, FrameSpec, MessageError,
    NavigationDecision, ResizeDecision, ScriptAttributes, WidgetConfig,
};

use crate::domain::{LoaderProfile, WidgetState};

use super::cookie_bridge::mirror_cookie;
use super::domain_validator::{DomainCheck, DomainValidator};
use super::host::{HostPage, InboundMessage, ListenerId, ListenerKind};

/// Result of [`WidgetSession::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The frame is on the page and listeners are registered.
    Mounted,
    /// A frame with the reserved id already exists.
    AlreadyLoaded,
    /// The user agent looks like a crawler.
    Crawler,
    /// `start()` was already called on this session.
    AlreadyStarted,
    /// The session was torn down while validation was in flight.
    TornDown,
    Rejected(RejectReason),
}

/// Why a session refused to mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The target URL does not parse or has no hostname.
    InvalidTarget(String),
    /// The target URL is not in the profile's allow-list.
    NotAllowed(String),
    /// The domain check answered no, or failed.
    DomainCheckFailed(String),
    /// The host refused to insert the frame.
    Host(String),
}

/// Result of [`WidgetSession::on_message`].  Everything except `Resized`,
/// `OpenedNewContext` and `NavigatedCurrent` means the message was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The session is not in `Mounted`/`Resized`.
    NotListening,
    /// The message did not come from the chat frame's window.
    UntrustedSource,
    /// The message origin is outside the allow-list or failed domain
    /// validation.
    UntrustedOrigin,
    /// `data` is not an object with a string `action`.
    NoAction,
    Malformed,
    /// A known action without the fields it needs.
    Incomplete,
    Unrecognized(String),
    Resized { width: String, height: String },
    /// `resize` in fullscreen mode.
    ResizeIgnored,
    OpenedNewContext(url::Url),
    NavigatedCurrent(url::Url),
    NavigationRejected(String),
    /// The host refused the resulting operation.
    HostFailed(String),
}

/// One widget on one page load.
pub struct WidgetSession<H: HostPage + ?Sized> {
    id: Uuid,
    host: Rc<H>,
    profile: Rc<LoaderProfile>,
    validator: DomainValidator,
    crawler: CrawlerDetector,
    state: Cell<WidgetState>,
    config: RefCell<Option<WidgetConfig>>,
    listeners: RefCell<Vec<ListenerId>>,
    /// Set only when this session inserted the frame.
    mounted_frame: Cell<bool>,
}

impl<H: HostPage + ?Sized> WidgetSession<H> {
    /// Creates a session in `Uninitialized`.
    ///
    /// An invalid `crawler_pattern` in the profile is logged and the
    /// default pattern is used instead.
    pub fn new(host: Rc<H>, profile: Rc<LoaderProfile>, checker: Rc<dyn DomainCheck>) -> Self {
        let crawler = match profile.crawler_pattern.as_deref().map(CrawlerDetector::new) {
            Some(Ok(detector)) => detector,
            Some(Err(e)) => {
                warn!("invalid crawler pattern in profile, using default: {e}");
                CrawlerDetector::default()
            }
            None => CrawlerDetector::default(),
        };

        Self {
            id: Uuid::new_v4(),
            host,
            profile,
            validator: DomainValidator::new(checker),
            crawler,
            state: Cell::new(WidgetState::Uninitialized),
            config: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            mounted_frame: Cell::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> WidgetState {
        self.state.get()
    }

    /// Configuration read from the script tag, once `start()` got that far.
    pub fn config(&self) -> Option<WidgetConfig> {
        self.config.borrow().clone()
    }

    pub fn validator(&self) -> &DomainValidator {
        &self.validator
    }

    pub fn profile(&self) -> &LoaderProfile {
        &self.profile
    }

    // ── Start ─────────────────────────────────────────────────────────────────

    /// Runs the loader: guards, validation, cookie bridge, frame insertion.
    ///
    /// Only the first call does anything; later calls return
    /// [`StartOutcome::AlreadyStarted`].
    pub async fn start(&self) -> StartOutcome {
        if self.state.get() != WidgetState::Uninitialized {
            debug!(session = %self.id, "start() called again in state {}", self.state.get());
            return StartOutcome::AlreadyStarted;
        }

        if self.crawler.is_crawler(&self.host.user_agent()) {
            info!(session = %self.id, "crawler user agent; widget not loaded");
            self.state.set(WidgetState::Skipped);
            return StartOutcome::Crawler;
        }
        if self.host.element_exists(&self.profile.frame_id) {
            info!(session = %self.id, "'{}' already on the page", self.profile.frame_id);
            self.state.set(WidgetState::Skipped);
            return StartOutcome::AlreadyLoaded;
        }

        let attributes = self
            .host
            .script_attributes(&self.profile.script_suffix)
            .unwrap_or_else(|| {
                debug!(session = %self.id, "no script tag ending in '{}'; using defaults", self.profile.script_suffix);
                ScriptAttributes::new()
            });
        let config = WidgetConfig::from_attributes(&attributes);
        *self.config.borrow_mut() = Some(config.clone());
        self.state.set(WidgetState::Validating);

        let target = match self.authorize_target(&config).await {
            Ok(target) => target,
            Err(reason) => return self.reject(reason),
        };
        if self.state.get() != WidgetState::Validating {
            debug!(session = %self.id, "torn down during validation; not mounting");
            return StartOutcome::TornDown;
        }

        mirror_cookie(self.host.as_ref(), &config, &self.profile.bridged_cookie_name);

        let mobile = self.profile.mobile.breakpoint().is_mobile(self.host.viewport());
        let src = match build_frame_url(&target, &self.profile.frame_path, &config, mobile) {
            Ok(src) => src,
            Err(e) => return self.reject(RejectReason::InvalidTarget(e.to_string())),
        };
        let layout = if config.is_fullscreen() {
            FrameLayout::FullViewport
        } else {
            self.profile.layout
        };
        let spec = FrameSpec::new(&self.profile.frame_id, src, &self.profile.frame_title, layout, &config);

        self.host.next_animation_frame().await;

        if self.state.get() != WidgetState::Validating {
            debug!(session = %self.id, "torn down before insertion; not mounting");
            return StartOutcome::TornDown;
        }
        // Another loader instance may have mounted while this one waited.
        if self.host.element_exists(&self.profile.frame_id) {
            info!(session = %self.id, "'{}' appeared while waiting; widget not loaded", self.profile.frame_id);
            self.state.set(WidgetState::Skipped);
            return StartOutcome::AlreadyLoaded;
        }

        if let Err(e) = self.host.append_frame(&spec) {
            return self.reject(RejectReason::Host(e.to_string()));
        }
        self.mounted_frame.set(true);
        self.register_listeners();
        self.state.set(WidgetState::Mounted);
        info!(session = %self.id, "chat frame mounted: {}", spec.src);
        StartOutcome::Mounted
    }

    /// Resolves the target URL and checks it against the allow-list and the
    /// domain validator.
    async fn authorize_target(&self, config: &WidgetConfig) -> Result<String, RejectReason> {
        let target = config.target_url(&self.profile.default_url).to_string();

        let Some(hostname) = hostname_of(&target) else {
            return Err(RejectReason::InvalidTarget(target));
        };
        if !self.profile.allowed_urls.is_empty()
            && !is_allowed_target(&target, self.profile.allowed_urls.as_slice())
        {
            return Err(RejectReason::NotAllowed(target));
        }
        if !self.validator.validate(&target).await {
            return Err(RejectReason::DomainCheckFailed(hostname));
        }
        Ok(target)
    }

    fn reject(&self, reason: RejectReason) -> StartOutcome {
        warn!(session = %self.id, "widget rejected: {reason:?}");
        if self.state.get() != WidgetState::TornDown {
            self.state.set(WidgetState::Rejected);
        }
        StartOutcome::Rejected(reason)
    }

    fn register_listeners(&self) {
        let mut kinds = Vec::with_capacity(3);
        if self.profile.relay_messages {
            kinds.push(ListenerKind::Message);
        }
        kinds.extend([ListenerKind::Unload, ListenerKind::FrameError]);

        let mut listeners = self.listeners.borrow_mut();
        for kind in kinds {
            listeners.push(self.host.add_listener(kind));
        }
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    /// Handles one `postMessage` event.  Never fails: every problem is
    /// logged and the message is dropped.
    pub async fn on_message(&self, message: InboundMessage) -> MessageOutcome {
        if !self.state.get().is_live() {
            return MessageOutcome::NotListening;
        }
        if self.profile.verify_message_source && !message.from_frame {
            debug!(session = %self.id, "dropping message not sent by the chat frame");
            return MessageOutcome::UntrustedSource;
        }
        // The validator caches by hostname; scheme and port must still match
        // an allowed URL exactly.
        if !self.profile.allowed_urls.is_empty()
            && !is_allowed_target(&message.origin, self.profile.allowed_urls.as_slice())
        {
            debug!(session = %self.id, "dropping message from origin '{}' outside the allow-list", message.origin);
            return MessageOutcome::UntrustedOrigin;
        }
        if !self.validator.validate(&message.origin).await {
            debug!(session = %self.id, "dropping message from untrusted origin '{}'", message.origin);
            return MessageOutcome::UntrustedOrigin;
        }
        // Unload may have run while the origin check was pending.
        if !self.state.get().is_live() {
            return MessageOutcome::NotListening;
        }

        let command = match parse_frame_message(&message.data) {
            Ok(command) => command,
            Err(MessageError::MissingAction) => return MessageOutcome::NoAction,
            Err(e) => {
                warn!(session = %self.id, "dropping malformed message: {e}");
                return MessageOutcome::Malformed;
            }
        };

        match command {
            FrameMessage::Resize { width, height } => self.handle_resize(width, height),
            FrameMessage::Navigate { url: Some(url) } => self.handle_navigate(&url),
            FrameMessage::Navigate { url: None } => MessageOutcome::Incomplete,
            FrameMessage::Unknown => {
                let action = message.data["action"].as_str().unwrap_or_default().to_string();
                debug!(session = %self.id, "ignoring unknown action '{action}'");
                MessageOutcome::Unrecognized(action)
            }
        }
    }

    fn handle_resize(&self, width: Option<String>, height: Option<String>) -> MessageOutcome {
        let fullscreen = self
            .config
            .borrow()
            .as_ref()
            .is_some_and(WidgetConfig::is_fullscreen);

        let decision = decide_resize(
            fullscreen,
            width.as_deref(),
            height.as_deref(),
            self.host.viewport(),
            self.profile.mobile.breakpoint(),
        );

        match decision {
            ResizeDecision::Apply { width, height } => {
                match self.host.set_frame_size(&self.profile.frame_id, &width, &height) {
                    Ok(()) => {
                        debug!(session = %self.id, "frame resized to {width}×{height}");
                        self.state.set(WidgetState::Resized);
                        MessageOutcome::Resized { width, height }
                    }
                    Err(e) => {
                        warn!(session = %self.id, "resize failed: {e}");
                        MessageOutcome::HostFailed(e.to_string())
                    }
                }
            }
            ResizeDecision::IgnoredFullscreen => MessageOutcome::ResizeIgnored,
            ResizeDecision::IgnoredIncomplete => MessageOutcome::Incomplete,
        }
    }

    fn handle_navigate(&self, raw_url: &str) -> MessageOutcome {
        let (result, outcome) = match classify_navigation(raw_url, self.profile.navigation_schemes.as_slice()) {
            NavigationDecision::OpenNewContext(url) => (
                self.host.open_new_context(&url),
                MessageOutcome::OpenedNewContext(url),
            ),
            NavigationDecision::NavigateCurrent(url) => (
                self.host.navigate_current(&url),
                MessageOutcome::NavigatedCurrent(url),
            ),
            NavigationDecision::Rejected(reason) => {
                warn!(session = %self.id, "navigation to '{raw_url}' rejected: {reason}");
                return MessageOutcome::NavigationRejected(reason);
            }
        };

        match result {
            Ok(()) => outcome,
            Err(e) => {
                warn!(session = %self.id, "navigation to '{raw_url}' failed: {e}");
                MessageOutcome::HostFailed(e.to_string())
            }
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    /// Page `unload`.
    pub fn on_unload(&self) -> bool {
        self.teardown()
    }

    /// `error` event on the chat frame.
    pub fn on_frame_error(&self) -> bool {
        warn!(session = %self.id, "chat frame failed to load");
        self.teardown()
    }

    /// Removes every listener this session registered and detaches the frame
    /// if this session inserted it.  Returns `false` if already torn down.
    pub fn teardown(&self) -> bool {
        if self.state.get() == WidgetState::TornDown {
            return false;
        }

        for id in self.listeners.borrow_mut().drain(..) {
            self.host.remove_listener(id);
        }
        if self.mounted_frame.replace(false) {
            self.host.remove_element(&self.profile.frame_id);
        }

        info!(session = %self.id, "widget torn down from state {}", self.state.get());
        self.state.set(WidgetState::TornDown);
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
