//! Static allow-list domain check.
//!
//! Used by deployments that never call the domain-check service: a hostname
//! is trusted when it is the hostname of one of the configured URLs.

use std::collections::BTreeSet;

use async_trait::async_trait;
use widget_core::hostname_of;

use crate::application::domain_validator::{CheckError, DomainCheck};

#[derive(Debug, Clone, Default)]
pub struct AllowListCheck {
    hosts: BTreeSet<String>,
}

impl AllowListCheck {
    /// Builds the check from full URLs such as `https://chat.steno.ai`.
    /// Entries without a hostname are ignored.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = urls
            .into_iter()
            .filter_map(|url| hostname_of(url.as_ref()))
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

#[async_trait(?Send)]
impl DomainCheck for AllowListCheck {
    async fn check(&self, hostname: &str) -> Result<bool, CheckError> {
        Ok(self.hosts.contains(&hostname.to_ascii_lowercase()))
    }
}
