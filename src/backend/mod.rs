//! Outbound client for the external identity backend.
//!
//! The backend owns the user store and credential verification; every
//! operation here is a single request/response exchange with no retries.

pub mod credentials;
pub mod registration;

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

/// Bounded timeout applied to every outbound call. The transport default is
/// unbounded, which is not acceptable for a request-scoped exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Build the client for the identity backend base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }
}
