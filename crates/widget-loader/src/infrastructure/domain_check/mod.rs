//! [`DomainCheck`] implementations.
//!
//! - **`http`** – asks the remote domain-check service.
//! - **`allow_list`** – compares against the profile's `allowed_urls`.
//!
//! [`checker_for`] picks one according to the profile's validation mode.

pub mod allow_list;
pub mod http;

use std::rc::Rc;
use std::time::Duration;

use tracing::info;

pub use allow_list::AllowListCheck;
pub use http::HttpDomainCheck;

use crate::application::domain_validator::{CheckError, DomainCheck};
use crate::domain::{LoaderProfile, ValidationMode};

/// Builds the domain check configured by `profile.validation`.
///
/// # Errors
///
/// Returns [`CheckError::InvalidServiceUrl`] for a remote check whose
/// service URL is malformed.
pub fn checker_for(profile: &LoaderProfile) -> Result<Rc<dyn DomainCheck>, CheckError> {
    match profile.validation.mode {
        ValidationMode::Remote => {
            let timeout = Duration::from_secs(profile.validation.timeout_secs);
            let check = HttpDomainCheck::new(&profile.validation.service_url, timeout)?;
            info!("domain checks via {}", check.endpoint());
            Ok(Rc::new(check))
        }
        ValidationMode::AllowList => {
            info!("domain checks against {} allowed URL(s)", profile.allowed_urls.len());
            Ok(Rc::new(AllowListCheck::new(&profile.allowed_urls)))
        }
    }
}
