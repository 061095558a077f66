// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection and polling configuration.

use std::fmt;
use std::time::Duration;

use reqwest::Client;

use crate::error::ApiError;
use crate::types::DEFAULT_LANGUAGE;

use super::http::ApiClient;
use super::token::TokenManager;

/// Account credentials for the password grant.
///
/// The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for talking to the Meetnet Vlaamse Banken API.
///
/// # Examples
///
/// ```
/// use meetnet_lib::protocol::MeetnetConfig;
/// use std::time::Duration;
///
/// // Defaults: public API, 10 s timeout, English names, 5 min polling
/// let config = MeetnetConfig::new();
///
/// // With all options
/// let config = MeetnetConfig::new()
///     .with_base_url("http://127.0.0.1:8080")
///     .with_timeout(Duration::from_secs(5))
///     .with_language("nl")
///     .with_scan_interval(Duration::from_secs(600));
/// assert_eq!(config.endpoint("/V2/catalog"), "http://127.0.0.1:8080/V2/catalog");
/// ```
#[derive(Debug, Clone)]
pub struct MeetnetConfig {
    base_url: String,
    timeout: Duration,
    language: String,
    scan_interval: Duration,
}

impl MeetnetConfig {
    /// Public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.meetnetvlaamsebanken.be";
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default polling interval.
    pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            language: DEFAULT_LANGUAGE.to_string(),
            scan_interval: Self::DEFAULT_SCAN_INTERVAL,
        }
    }

    /// Sets the API base URL.
    ///
    /// A trailing slash is ignored.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the preferred language for names and descriptions.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the polling interval.
    #[must_use]
    pub fn with_scan_interval(mut self, scan_interval: Duration) -> Self {
        self.scan_interval = scan_interval;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the preferred language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Builds the URL of an API path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Creates an [`ApiClient`] for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not HTTP(S) or the HTTP client
    /// cannot be created.
    pub fn into_client(self, credentials: Credentials) -> Result<ApiClient, ApiError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ApiError::Http)?;

        let tokens = TokenManager::new(
            client.clone(),
            self.endpoint("/Token"),
            credentials,
            self.timeout,
        );

        Ok(ApiClient::new(client, self, tokens))
    }
}

impl Default for MeetnetConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = MeetnetConfig::new();
        assert_eq!(config.base_url(), "https://api.meetnetvlaamsebanken.be");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.language(), "en");
        assert_eq!(config.scan_interval(), Duration::from_secs(300));
    }

    #[test]
    fn endpoint_joins_paths() {
        let config = MeetnetConfig::new().with_base_url("http://localhost:1234/");
        assert_eq!(config.endpoint("/Token"), "http://localhost:1234/Token");
        assert_eq!(
            config.endpoint("V2/currentData"),
            "http://localhost:1234/V2/currentData"
        );
    }

    #[test]
    fn into_client_rejects_non_http_url() {
        let result = MeetnetConfig::new()
            .with_base_url("ftp://example.org")
            .into_client(Credentials::new("user", "pass"));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn into_client_with_defaults() {
        let client = MeetnetConfig::new()
            .into_client(Credentials::new("user", "pass"))
            .unwrap();
        assert_eq!(client.config().language(), "en");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
