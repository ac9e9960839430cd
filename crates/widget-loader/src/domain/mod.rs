//! Domain layer for widget-loader.
//!
//! Plain data describing *which* loader is running (its profile) and *where*
//! a session is in its lifecycle.  No I/O, no async.

pub mod profile;
pub mod state;

pub use profile::{
    load_profile, LauncherConfig, LauncherTheme, LoaderProfile, MobileConfig, ProfileError,
    ValidationConfig, ValidationMode,
};
pub use state::WidgetState;
