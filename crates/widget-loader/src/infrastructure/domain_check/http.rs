//! Remote domain check over HTTP.
//!
//! ```text
//! GET <service>/api/v1/domains/check?domain=<hostname>
//! 200 {"isValid": true}
//! ```
//!
//! Only a 2xx response whose body says `"isValid": true` counts as trusted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::application::domain_validator::{CheckError, DomainCheck};

/// Path of the check endpoint below the service base URL.
pub const CHECK_PATH: &str = "/api/v1/domains/check";

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(rename = "isValid")]
    is_valid: bool,
}

/// [`DomainCheck`] backed by the domain-check service.
#[derive(Debug, Clone)]
pub struct HttpDomainCheck {
    client: Client,
    endpoint: Url,
}

impl HttpDomainCheck {
    /// Creates a checker for the service at `service_url`
    /// (e.g. `https://api.steno.ai`).
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidServiceUrl`] if `service_url` is not an
    /// absolute HTTP(S) URL and [`CheckError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(service_url: &str, timeout: Duration) -> Result<Self, CheckError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CheckError::Transport(e.to_string()))?;
        Self::with_client(client, service_url)
    }

    /// Like [`new`](Self::new) with a caller-configured client.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidServiceUrl`] if `service_url` is not an
    /// absolute HTTP(S) URL.
    pub fn with_client(client: Client, service_url: &str) -> Result<Self, CheckError> {
        let raw = format!("{}{CHECK_PATH}", service_url.trim().trim_end_matches('/'));
        let endpoint = Url::parse(&raw)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| CheckError::InvalidServiceUrl(service_url.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Full URL of the check endpoint, without the query.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl DomainCheck for HttpDomainCheck {
    async fn check(&self, hostname: &str) -> Result<bool, CheckError> {
        debug!(endpoint = %self.endpoint, "checking domain {hostname}");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("domain", hostname)])
            .send()
            .await
            .map_err(|e| CheckError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Status(status.as_u16()));
        }

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| CheckError::Malformed(e.to_string()))?;
        Ok(body.is_valid)
    }
}
