//! Lifecycle states of a widget session.
//!
//! ```text
//! Uninitialized ──► Validating ──► Mounted ──► Resized ⟲
//!       │               │             │           │
//!       ▼               ▼             └─────┬─────┘
//!    Skipped         Rejected               ▼
//!                                        TornDown
//! ```
//!
//! `TornDown` is reachable from every state (unload can happen at any
//! time); teardown itself is idempotent.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// Created, `start()` not called yet.
    Uninitialized,
    /// Waiting for the domain check.
    Validating,
    /// Frame inserted; messages are processed.
    Mounted,
    /// Frame inserted and resized at least once.
    Resized,
    /// Target URL or domain check failed.  Terminal.
    Rejected,
    /// Crawler user agent or a frame already on the page.  Terminal.
    Skipped,
    /// Listeners removed and frame detached.  Terminal.
    TornDown,
}

impl WidgetState {
    /// `true` while the frame is on the page and messages are processed.
    pub fn is_live(self) -> bool {
        matches!(self, WidgetState::Mounted | WidgetState::Resized)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WidgetState::Rejected | WidgetState::Skipped | WidgetState::TornDown
        )
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetState::Uninitialized => "uninitialized",
            WidgetState::Validating => "validating",
            WidgetState::Mounted => "mounted",
            WidgetState::Resized => "resized",
            WidgetState::Rejected => "rejected",
            WidgetState::Skipped => "skipped",
            WidgetState::TornDown => "torn_down",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mounted_states_are_live() {
        assert!(WidgetState::Mounted.is_live());
        assert!(WidgetState::Resized.is_live());
        assert!(!WidgetState::Validating.is_live());
        assert!(!WidgetState::TornDown.is_live());
    }

    #[test]
    fn test_terminal_states() {
        assert!(WidgetState::Rejected.is_terminal());
        assert!(WidgetState::Skipped.is_terminal());
        assert!(WidgetState::TornDown.is_terminal());
        assert!(!WidgetState::Mounted.is_terminal());
        assert!(!WidgetState::Uninitialized.is_terminal());
    }

    #[test]
    fn test_display_uses_snake_case() {
        assert_eq!(WidgetState::TornDown.to_string(), "torn_down");
    }
}
