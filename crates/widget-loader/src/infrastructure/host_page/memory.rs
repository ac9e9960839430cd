//! In-memory host page.
//!
//! `MemoryHost` stands in for the browser: it keeps a map of elements, a
//! cookie jar and the registered listeners, and records every mutating call
//! in order so tests and the `simulate` command can show exactly what the
//! loader did to the page.
//!
//! # Usage in tests
//!
//! ```rust
//! use std::rc::Rc;
//! use widget_loader::infrastructure::host_page::{HostOp, MemoryHost};
//!
//! let host = Rc::new(
//!     MemoryHost::new()
//!         .with_viewport(390, 844)
//!         .with_script("https://cdn.example/steno-chat.js", &[("data-id", "acme")]),
//! );
//! assert!(host.ops().is_empty());
//! ```
//!
//! # Refusal switches
//!
//! `refuse_popups()` and `refuse_cookies()` make the corresponding calls
//! fail with [`HostError::Refused`], the way a popup blocker or a cookie
//! policy would.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;
use widget_core::{FrameSpec, ScriptAttributes, Viewport};

use crate::application::host::{
    HostError, HostPage, LauncherButton, ListenerId, ListenerKind, ScriptElement,
};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// One mutating call made on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    AppendFrame { id: String, src: String },
    SetFrameSize { id: String, width: String, height: String },
    RemoveElement(String),
    HideElement(String),
    AddListener(ListenerKind),
    RemoveListener(ListenerKind),
    OpenNewContext(String),
    NavigateCurrent(String),
    SetCookie(String),
    AppendScript { id: String, src: String },
    AppendLauncher(LauncherButton),
}

/// What an element on the page is.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Frame(FrameSpec),
    Script(ScriptElement),
    Launcher(LauncherButton),
    /// Placed by the page itself (see [`MemoryHost::with_element`]).
    Foreign,
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    style: BTreeMap<String, String>,
}

/// Recording [`HostPage`] for tests and the CLI simulator.
pub struct MemoryHost {
    user_agent: String,
    viewport: Cell<Viewport>,
    /// `(src, attributes)` of the page's script tags, in document order.
    scripts: Vec<(String, ScriptAttributes)>,
    elements: RefCell<BTreeMap<String, Node>>,
    cookies: RefCell<String>,
    listeners: RefCell<BTreeMap<ListenerId, ListenerKind>>,
    next_listener: Cell<u64>,
    ops: RefCell<Vec<HostOp>>,
    refuse_popups: bool,
    refuse_cookies: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: Cell::new(Viewport::new(1280, 800)),
            scripts: Vec::new(),
            elements: RefCell::new(BTreeMap::new()),
            cookies: RefCell::new(String::new()),
            listeners: RefCell::new(BTreeMap::new()),
            next_listener: Cell::new(1),
            ops: RefCell::new(Vec::new()),
            refuse_popups: false,
            refuse_cookies: false,
        }
    }
}

impl MemoryHost {
    /// A desktop page (1280×800, Chrome user agent) with no script tags.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Builders ──────────────────────────────────────────────────────────────

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_viewport(self, width: u32, height: u32) -> Self {
        self.viewport.set(Viewport::new(width, height));
        self
    }

    /// Adds a `<script src>` tag carrying `attributes`.
    pub fn with_script(mut self, src: &str, attributes: &[(&str, &str)]) -> Self {
        self.scripts
            .push((src.to_string(), attributes.iter().copied().collect()));
        self
    }

    /// Sets `document.cookie` as read by the page (`"a=1; b=2"`).
    pub fn with_cookies(self, header: &str) -> Self {
        *self.cookies.borrow_mut() = header.to_string();
        self
    }

    /// Places an element the loader did not create.
    pub fn with_element(self, id: &str) -> Self {
        self.elements.borrow_mut().insert(
            id.to_string(),
            Node {
                element: Element::Foreign,
                style: BTreeMap::new(),
            },
        );
        self
    }

    pub fn refuse_popups(mut self) -> Self {
        self.refuse_popups = true;
        self
    }

    pub fn refuse_cookies(mut self) -> Self {
        self.refuse_cookies = true;
        self
    }

    /// Changes the viewport, as a window resize would.
    pub fn set_viewport(&self, width: u32, height: u32) {
        self.viewport.set(Viewport::new(width, height));
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// Every mutating call so far, in order.
    pub fn ops(&self) -> Vec<HostOp> {
        self.ops.borrow().clone()
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.borrow().contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements.borrow().get(id).map(|node| node.element.clone())
    }

    pub fn frame(&self, id: &str) -> Option<FrameSpec> {
        match self.element(id)? {
            Element::Frame(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn script(&self, id: &str) -> Option<ScriptElement> {
        match self.element(id)? {
            Element::Script(script) => Some(script),
            _ => None,
        }
    }

    /// Number of iframes on the page.
    pub fn frame_count(&self) -> usize {
        self.elements
            .borrow()
            .values()
            .filter(|node| matches!(node.element, Element::Frame(_)))
            .count()
    }

    /// Current inline style value of `property` on element `id`.
    pub fn element_style(&self, id: &str, property: &str) -> Option<String> {
        self.elements
            .borrow()
            .get(id)
            .and_then(|node| node.style.get(property).cloned())
    }

    /// Listeners currently registered, in registration order.
    pub fn active_listeners(&self) -> Vec<ListenerKind> {
        self.listeners.borrow().values().copied().collect()
    }

    /// Raw `document.cookie` as the page would now see it.
    pub fn cookies(&self) -> String {
        self.cookies.borrow().clone()
    }

    fn record(&self, op: HostOp) {
        self.ops.borrow_mut().push(op);
    }

    fn insert(&self, id: &str, element: Element, style: BTreeMap<String, String>) -> Result<(), HostError> {
        let mut elements = self.elements.borrow_mut();
        if elements.contains_key(id) {
            return Err(HostError::DuplicateElement(id.to_string()));
        }
        elements.insert(id.to_string(), Node { element, style });
        Ok(())
    }

    fn style_mut(&self, id: &str, declarations: &[(&str, &str)]) -> Result<(), HostError> {
        let mut elements = self.elements.borrow_mut();
        let node = elements
            .get_mut(id)
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))?;
        for (property, value) in declarations {
            node.style.insert(property.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl HostPage for MemoryHost {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn script_attributes(&self, src_suffix: &str) -> Option<ScriptAttributes> {
        self.scripts
            .iter()
            .find(|(src, _)| {
                let path = src.split(['?', '#']).next().unwrap_or_default();
                path.ends_with(src_suffix)
            })
            .map(|(_, attributes)| attributes.clone())
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn element_exists(&self, id: &str) -> bool {
        self.has_element(id)
    }

    async fn next_animation_frame(&self) {
        tokio::task::yield_now().await;
    }

    fn append_frame(&self, spec: &FrameSpec) -> Result<(), HostError> {
        let style = spec.style.iter().cloned().collect();
        self.insert(&spec.id, Element::Frame(spec.clone()), style)?;
        self.record(HostOp::AppendFrame {
            id: spec.id.clone(),
            src: spec.src.to_string(),
        });
        Ok(())
    }

    fn set_frame_size(&self, id: &str, width: &str, height: &str) -> Result<(), HostError> {
        self.style_mut(id, &[("width", width), ("height", height)])?;
        self.record(HostOp::SetFrameSize {
            id: id.to_string(),
            width: width.to_string(),
            height: height.to_string(),
        });
        Ok(())
    }

    fn remove_element(&self, id: &str) -> bool {
        let removed = self.elements.borrow_mut().remove(id).is_some();
        if removed {
            self.record(HostOp::RemoveElement(id.to_string()));
        }
        removed
    }

    fn hide_element(&self, id: &str) -> Result<(), HostError> {
        self.style_mut(id, &[("display", "none")])?;
        self.record(HostOp::HideElement(id.to_string()));
        Ok(())
    }

    fn add_listener(&self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, kind);
        self.record(HostOp::AddListener(kind));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        match self.listeners.borrow_mut().remove(&id) {
            Some(kind) => {
                self.record(HostOp::RemoveListener(kind));
                true
            }
            None => false,
        }
    }

    fn open_new_context(&self, url: &Url) -> Result<(), HostError> {
        if self.refuse_popups {
            return Err(HostError::Refused("popup blocked".to_string()));
        }
        self.record(HostOp::OpenNewContext(url.to_string()));
        Ok(())
    }

    fn navigate_current(&self, url: &Url) -> Result<(), HostError> {
        self.record(HostOp::NavigateCurrent(url.to_string()));
        Ok(())
    }

    fn cookie_header(&self) -> String {
        self.cookies()
    }

    fn set_cookie(&self, cookie: &str) -> Result<(), HostError> {
        if self.refuse_cookies {
            return Err(HostError::Refused("cookie blocked".to_string()));
        }
        // Attributes after the first ';' are not visible through document.cookie.
        let pair = cookie.split(';').next().unwrap_or_default().trim();
        {
            let mut jar = self.cookies.borrow_mut();
            if jar.is_empty() {
                jar.push_str(pair);
            } else {
                jar.push_str("; ");
                jar.push_str(pair);
            }
        }
        self.record(HostOp::SetCookie(cookie.to_string()));
        Ok(())
    }

    fn append_script(&self, script: &ScriptElement) -> Result<(), HostError> {
        self.insert(&script.id, Element::Script(script.clone()), BTreeMap::new())?;
        self.record(HostOp::AppendScript {
            id: script.id.clone(),
            src: script.src.clone(),
        });
        Ok(())
    }

    fn append_launcher(&self, button: &LauncherButton) -> Result<(), HostError> {
        self.insert(&button.id, Element::Launcher(button.clone()), BTreeMap::new())?;
        self.record(HostOp::AppendLauncher(button.clone()));
        Ok(())
    }
}
