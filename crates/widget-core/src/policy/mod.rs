//! Trust and presentation policies.
//!
//! Everything the chat frame asks for passes through one of these pure
//! functions before the loader touches the host page.  The loader itself
//! (in `widget-loader`) only wires them to DOM events.
//!
//! | Module       | Question answered                                         |
//! |--------------|-----------------------------------------------------------|
//! | `crawler`    | Should the widget load for this user agent at all?        |
//! | `origin`     | Is this chat URL one we are willing to frame?             |
//! | `navigation` | May the frame send the visitor to this URL, and how?      |
//! | `resize`     | What size should the frame actually get?                  |

pub mod crawler;
pub mod navigation;
pub mod origin;
pub mod resize;

pub use crawler::CrawlerDetector;
pub use navigation::{classify_navigation, NavigationDecision, DEFAULT_NAVIGATION_SCHEMES};
pub use origin::{hostname_of, is_allowed_target};
pub use resize::{decide_resize, MobileBreakpoint, ResizeDecision, Viewport};
