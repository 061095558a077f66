// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the Meetnet Vlaamse Banken REST API.
//!
//! # Endpoints
//!
//! | Method | Path              | Purpose                              |
//! |--------|-------------------|--------------------------------------|
//! | POST   | `/Token`          | Password grant, returns bearer token |
//! | GET    | `/V2/catalog`     | Locations, parameters, availability  |
//! | GET    | `/V2/currentData` | Latest value per series              |
//! | POST   | `/V2/getData`     | Historical values for a window       |
//!
//! [`ApiClient`] is the production implementation of [`MeetnetApi`]. The
//! coordinator is generic over the trait so it can be driven by a fake in
//! tests.

mod config;
mod http;
mod token;

pub use config::{Credentials, MeetnetConfig};
pub use http::ApiClient;
pub use token::{AccessToken, TokenManager};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::data::{CurrentValue, HistoricalSeries};
use crate::error::Result;
use crate::types::LocationParameterKey;

/// Data operations offered by the Meetnet API.
#[allow(async_fn_in_trait)]
pub trait MeetnetApi {
    /// Checks the credentials by requesting a fresh token.
    ///
    /// Returns `Ok(false)` when the credentials are rejected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` if the token endpoint cannot be reached.
    async fn validate_credentials(&self) -> Result<bool>;

    /// Fetches the catalog of locations, parameters and available series.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if no valid token can be obtained,
    /// or `Error::Api` if the request fails or the payload is malformed.
    async fn fetch_catalog(&self) -> Result<Catalog>;

    /// Fetches the latest value of each series.
    ///
    /// `None` fetches every series the account can see. An empty slice
    /// returns an empty map without contacting the API.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_catalog`](Self::fetch_catalog).
    async fn fetch_current(
        &self,
        ids: Option<&[LocationParameterKey]>,
    ) -> Result<BTreeMap<LocationParameterKey, CurrentValue>>;

    /// Fetches historical values of the given series between `start` and
    /// `end`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if `start >= end`, otherwise the same errors
    /// as [`fetch_catalog`](Self::fetch_catalog).
    async fn fetch_history(
        &self,
        ids: &[LocationParameterKey],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<LocationParameterKey, HistoricalSeries>>;
}

/// Creates API clients for credentials entered during setup.
pub trait ApiFactory {
    /// Client type produced by this factory.
    type Api: MeetnetApi;

    /// Creates a client authenticating with `credentials`.
    ///
    /// No request is made.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be configured.
    fn create(&self, credentials: Credentials) -> Result<Self::Api>;

    /// Preferred language for names shown to the user.
    fn language(&self) -> &str;
}

impl ApiFactory for MeetnetConfig {
    type Api = ApiClient;

    fn create(&self, credentials: Credentials) -> Result<ApiClient> {
        Ok(self.clone().into_client(credentials)?)
    }

    fn language(&self) -> &str {
        MeetnetConfig::language(self)
    }
}
