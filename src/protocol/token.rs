// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bearer token acquisition and caching.
//!
//! Tokens come from the OAuth password grant at `POST /Token`. The cache is
//! guarded by an async mutex that stays locked while a new token is
//! requested, so concurrent callers never trigger more than one token
//! request between them.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ApiError, Error, ParseError, Result};

use super::config::Credentials;
use super::http::transport_error;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Tokens are treated as expired this many seconds before the server says so.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Upper bound for lifetimes reported by the server.
const MAX_EXPIRES_IN: i64 = 365 * 24 * 3600;

/// A bearer token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    token_type: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires at the given time.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            token_type: "bearer".to_string(),
            expires_at,
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the token type reported by the server.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns when the token stops being used.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true once the expiry time has been reached.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Computes the local expiry for a token lifetime in seconds.
///
/// The margin shrinks to half the lifetime for short-lived tokens so the
/// result always lies in the future.
fn expiry_for(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let lifetime = TimeDelta::seconds(expires_in.clamp(1, MAX_EXPIRES_IN));
    let margin = TimeDelta::seconds(EXPIRY_MARGIN_SECS).min(lifetime / 2);
    now + lifetime - margin
}

/// Obtains and caches bearer tokens.
#[derive(Debug)]
pub struct TokenManager {
    client: Client,
    token_url: String,
    credentials: Credentials,
    timeout: Duration,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    /// Creates a token manager for the given endpoint and credentials.
    #[must_use]
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            credentials,
            timeout,
            cache: Mutex::new(None),
        }
    }

    /// Returns the username this manager authenticates as.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Returns a token that has not expired, requesting one if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if the credentials are rejected, or
    /// `Error::Api` if the token endpoint cannot be reached or answers
    /// with an unusable payload.
    pub async fn get_valid_token(&self) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref().filter(|token| !token.is_expired()) {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Discards the cached token and requests a new one.
    ///
    /// # Errors
    ///
    /// Same as [`get_valid_token`](Self::get_valid_token).
    pub async fn refresh(&self) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        *cache = None;

        let token = self.request_token().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token if it is still `rejected`.
    ///
    /// A token refreshed by another caller in the meantime is kept.
    pub async fn invalidate(&self, rejected: &AccessToken) {
        let mut cache = self.cache.lock().await;
        if cache.as_ref().is_some_and(|token| token.value == rejected.value) {
            *cache = None;
        }
    }

    async fn request_token(&self) -> Result<AccessToken> {
        tracing::debug!(
            url = %self.token_url,
            username = %self.credentials.username,
            "Requesting access token"
        );

        let form = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| transport_error(err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(err, self.timeout))?;

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let details: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            let message = details
                .error_description
                .or(details.error)
                .unwrap_or_else(|| "invalid credentials".to_string());
            tracing::debug!(status = status.as_u16(), message = %message, "Token request rejected");
            return Err(Error::Authentication(message));
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(ParseError::from)?;
        if parsed.access_token.is_empty() {
            return Err(ParseError::UnexpectedFormat("empty access_token".to_string()).into());
        }

        let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        tracing::info!(expires_in, "Successfully authenticated");

        Ok(AccessToken {
            value: parsed.access_token,
            token_type: parsed.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: expiry_for(Utc::now(), expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_applies_margin() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, 3600), now + TimeDelta::seconds(3540));
    }

    #[test]
    fn expiry_for_short_lifetime_stays_in_future() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, 30), now + TimeDelta::seconds(15));
        assert!(expiry_for(now, 1) > now);
        assert!(expiry_for(now, 0) > now);
        assert!(expiry_for(now, -5) > now);
    }

    #[test]
    fn token_expiry_check() {
        let past = AccessToken::new("old", Utc::now() - TimeDelta::seconds(1));
        let future = AccessToken::new("new", Utc::now() + TimeDelta::seconds(60));
        assert!(past.is_expired());
        assert!(!future.is_expired());
    }

    #[test]
    fn token_debug_hides_value() {
        let token = AccessToken::new("secret-token", Utc::now());
        assert!(!format!("{token:?}").contains("secret-token"));
    }

    #[test]
    fn token_response_defaults() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert!(parsed.expires_in.is_none());
        assert!(parsed.token_type.is_none());
    }
}
