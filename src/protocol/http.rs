// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the Meetnet Vlaamse Banken API.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::catalog::Catalog;
use crate::data::{
    CurrentValue, HistoricalSeries, HistoryRequest, parse_current, parse_history,
};
use crate::error::{ApiError, Error, Result};
use crate::types::LocationParameterKey;

use super::MeetnetApi;
use super::config::MeetnetConfig;
use super::token::{AccessToken, TokenManager};

const CATALOG_PATH: &str = "/V2/catalog";
const CURRENT_DATA_PATH: &str = "/V2/currentData";
const GET_DATA_PATH: &str = "/V2/getData";

/// Maps a reqwest failure, singling out timeouts.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(timeout.as_millis() as u64)
    } else {
        ApiError::Http(err)
    }
}

/// Authenticated client for the three data endpoints.
///
/// Every request carries `Authorization: Bearer <token>`. When the API
/// answers 401 the token is discarded and the request is sent exactly once
/// more with a fresh token.
///
/// Clones share the token cache.
///
/// # Examples
///
/// ```no_run
/// use meetnet_lib::protocol::{Credentials, MeetnetApi, MeetnetConfig};
///
/// # async fn example() -> meetnet_lib::Result<()> {
/// let client = MeetnetConfig::new().into_client(Credentials::new("user", "secret"))?;
/// let catalog = client.fetch_catalog().await?;
/// println!("{} locations", catalog.locations().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: MeetnetConfig,
    tokens: Arc<TokenManager>,
}

impl ApiClient {
    pub(crate) fn new(client: Client, config: MeetnetConfig, tokens: TokenManager) -> Self {
        Self {
            client,
            config,
            tokens: Arc::new(tokens),
        }
    }

    /// Returns the configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &MeetnetConfig {
        &self.config
    }

    /// Returns the token manager.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn execute(&self, request: RequestBuilder, token: &AccessToken) -> Result<Response> {
        request
            .bearer_auth(token.value())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| transport_error(err, self.config.timeout()).into())
    }

    /// Sends a request built by `build`, retrying once after a 401.
    async fn send_authorized<F>(&self, build: F) -> Result<String>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = self.tokens.get_valid_token().await?;
        let mut response = self.execute(build(&self.client), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("Token rejected by API, re-authenticating");
            self.tokens.invalidate(&token).await;

            let token = self.tokens.get_valid_token().await?;
            response = self.execute(build(&self.client), &token).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(Error::Authentication(
                    "API rejected a freshly issued token".to_string(),
                ));
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|err| transport_error(err, self.config.timeout()))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Received API response");

        Ok(body)
    }

    fn current_data_url(&self, ids: Option<&[LocationParameterKey]>) -> String {
        let base = self.config.endpoint(CURRENT_DATA_PATH);
        match ids {
            Some(ids) if !ids.is_empty() => {
                let joined = ids
                    .iter()
                    .map(|id| urlencoding::encode(id.as_str()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{base}?ids={joined}")
            }
            _ => base,
        }
    }
}

impl MeetnetApi for ApiClient {
    async fn validate_credentials(&self) -> Result<bool> {
        match self.tokens.refresh().await {
            Ok(_) => Ok(true),
            Err(Error::Authentication(reason)) => {
                tracing::debug!(reason = %reason, "Credentials rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_catalog(&self) -> Result<Catalog> {
        let url = self.config.endpoint(CATALOG_PATH);
        tracing::debug!(url = %url, "Fetching catalog");

        let body = self.send_authorized(|client| client.get(&url)).await?;
        let catalog = Catalog::from_json(&body)?;

        tracing::debug!(
            locations = catalog.locations().len(),
            parameters = catalog.parameters().len(),
            available = catalog.available_data().len(),
            "Loaded catalog"
        );

        Ok(catalog)
    }

    async fn fetch_current(
        &self,
        ids: Option<&[LocationParameterKey]>,
    ) -> Result<BTreeMap<LocationParameterKey, CurrentValue>> {
        if ids.is_some_and(<[_]>::is_empty) {
            return Ok(BTreeMap::new());
        }

        let url = self.current_data_url(ids);
        tracing::debug!(url = %url, "Fetching current data");

        let body = self.send_authorized(|client| client.get(&url)).await?;
        Ok(parse_current(&body)?)
    }

    async fn fetch_history(
        &self,
        ids: &[LocationParameterKey],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<LocationParameterKey, HistoricalSeries>> {
        let request = HistoryRequest::new(ids.to_vec(), start, end)?;
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let url = self.config.endpoint(GET_DATA_PATH);
        tracing::debug!(url = %url, series = ids.len(), %start, %end, "Fetching historical data");

        let body = self
            .send_authorized(|client| client.post(&url).json(&request))
            .await?;
        Ok(parse_history(&body, &request)?)
    }
}
