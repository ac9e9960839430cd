//! Resize handling and the mobile viewport heuristic.
//!
//! The chat frame starts as a small launcher bubble and asks the host page to
//! grow it when the visitor opens the conversation.  On phones a floating
//! 400×640 panel is unusable, so once the frame asks for anything larger than
//! its collapsed size on a small viewport, it gets the whole screen instead.
//!
//! # The heuristic
//!
//! A resize is forced to `100%`×`100%` when **both** hold:
//!
//! 1. The viewport is "mobile": width ≤ `max_width`, **or** height ≤
//!    `max_height` when a height breakpoint is configured.
//! 2. The request is not a collapse: the requested width is neither `80px`
//!    nor `330px` and the requested height is not `80px`.
//!
//! Condition 1 is a genuine OR: a short landscape viewport counts as mobile
//! even when it is wide.

use crate::domain::frame::{CENTER_COLLAPSED_WIDTH, COLLAPSED_SIZE};

/// Full-viewport size used for the forced mobile layout.
pub const FULL_SIZE: &str = "100%";

/// Visible area of the host page in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Viewport thresholds below which the widget goes full-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileBreakpoint {
    /// Inclusive width threshold.
    pub max_width: u32,
    /// Optional inclusive height threshold.
    pub max_height: Option<u32>,
}

impl Default for MobileBreakpoint {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: None,
        }
    }
}

impl MobileBreakpoint {
    /// Condition 1 of the heuristic (see module docs).
    pub fn is_mobile(&self, viewport: Viewport) -> bool {
        viewport.width <= self.max_width
            || self.max_height.is_some_and(|h| viewport.height <= h)
    }
}

/// Outcome of a `resize` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeDecision {
    /// Set the frame's CSS `width`/`height` to these values.
    Apply { width: String, height: String },
    /// The frame is in fullscreen mode; its size is fixed.
    IgnoredFullscreen,
    /// `width` or `height` was missing or blank.
    IgnoredIncomplete,
}

/// Decides what size the frame gets for a resize request.
///
/// ```rust
/// use widget_core::{decide_resize, MobileBreakpoint, ResizeDecision, Viewport};
///
/// let phone = Viewport::new(390, 844);
/// let d = decide_resize(false, Some("300px"), Some("500px"), phone, MobileBreakpoint::default());
/// assert_eq!(d, ResizeDecision::Apply { width: "100%".into(), height: "100%".into() });
/// ```
pub fn decide_resize(
    fullscreen: bool,
    width: Option<&str>,
    height: Option<&str>,
    viewport: Viewport,
    breakpoint: MobileBreakpoint,
) -> ResizeDecision {
    if fullscreen {
        return ResizeDecision::IgnoredFullscreen;
    }

    let width = width.map(str::trim).filter(|w| !w.is_empty());
    let height = height.map(str::trim).filter(|h| !h.is_empty());
    let (Some(width), Some(height)) = (width, height) else {
        return ResizeDecision::IgnoredIncomplete;
    };

    let is_collapse =
        width == COLLAPSED_SIZE || width == CENTER_COLLAPSED_WIDTH || height == COLLAPSED_SIZE;

    if breakpoint.is_mobile(viewport) && !is_collapse {
        ResizeDecision::Apply {
            width: FULL_SIZE.to_string(),
            height: FULL_SIZE.to_string(),
        }
    } else {
        ResizeDecision::Apply {
            width: width.to_string(),
            height: height.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP: Viewport = Viewport { width: 1440, height: 900 };
    const PHONE: Viewport = Viewport { width: 390, height: 844 };

    fn apply(w: &str, h: &str) -> ResizeDecision {
        ResizeDecision::Apply {
            width: w.to_string(),
            height: h.to_string(),
        }
    }

    #[test]
    fn test_desktop_gets_requested_size() {
        let d = decide_resize(false, Some("400px"), Some("640px"), DESKTOP, MobileBreakpoint::default());
        assert_eq!(d, apply("400px", "640px"));
    }

    #[test]
    fn test_mobile_expansion_goes_full_viewport() {
        // Arrange: a phone-sized viewport and a panel-sized request
        let bp = MobileBreakpoint::default();

        // Act
        let d = decide_resize(false, Some("300px"), Some("500px"), PHONE, bp);

        // Assert: requested values are discarded
        assert_eq!(d, apply("100%", "100%"));
    }

    #[test]
    fn test_breakpoint_is_inclusive() {
        let d = decide_resize(
            false,
            Some("300px"),
            Some("500px"),
            Viewport::new(500, 900),
            MobileBreakpoint::default(),
        );
        assert_eq!(d, apply("100%", "100%"));

        let d = decide_resize(
            false,
            Some("300px"),
            Some("500px"),
            Viewport::new(501, 900),
            MobileBreakpoint::default(),
        );
        assert_eq!(d, apply("300px", "500px"));
    }

    #[test]
    fn test_mobile_collapse_keeps_requested_size() {
        let bp = MobileBreakpoint::default();
        assert_eq!(decide_resize(false, Some("80px"), Some("80px"), PHONE, bp), apply("80px", "80px"));
        assert_eq!(decide_resize(false, Some("330px"), Some("80px"), PHONE, bp), apply("330px", "80px"));
        // Any single collapsed dimension counts as a collapse.
        assert_eq!(decide_resize(false, Some("200px"), Some("80px"), PHONE, bp), apply("200px", "80px"));
    }

    #[test]
    fn test_fullscreen_ignores_resize() {
        let d = decide_resize(true, Some("300px"), Some("500px"), DESKTOP, MobileBreakpoint::default());
        assert_eq!(d, ResizeDecision::IgnoredFullscreen);
    }

    #[test]
    fn test_missing_dimension_is_ignored() {
        let bp = MobileBreakpoint::default();
        assert_eq!(decide_resize(false, Some("300px"), None, DESKTOP, bp), ResizeDecision::IgnoredIncomplete);
        assert_eq!(decide_resize(false, Some(""), Some("1px"), DESKTOP, bp), ResizeDecision::IgnoredIncomplete);
    }

    #[test]
    fn test_short_viewport_counts_as_mobile_when_height_breakpoint_set() {
        // A landscape phone: wide but short.  A width-only check would let
        // this request keep its 300x500 size.
        let bp = MobileBreakpoint {
            max_width: 500,
            max_height: Some(450),
        };
        let landscape = Viewport::new(844, 390);
        let d = decide_resize(false, Some("300px"), Some("500px"), landscape, bp);
        assert_eq!(d, apply("100%", "100%"));
    }

    #[test]
    fn test_height_breakpoint_unset_means_width_only() {
        let landscape = Viewport::new(844, 390);
        assert!(!MobileBreakpoint::default().is_mobile(landscape));
    }
}
