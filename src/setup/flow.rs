// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Initial setup and reauthentication.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::protocol::{ApiFactory, Credentials, MeetnetApi};

use super::{
    AbortReason, EntryData, FlowError, FlowResult, Form, StepId, location_options,
    validate_selection,
};

/// Validates credentials with a fresh client.
async fn check_credentials<F: ApiFactory>(
    factory: &F,
    credentials: Credentials,
) -> Result<F::Api, FlowError> {
    let api = factory.create(credentials).map_err(|err| FlowError::from_api(&err))?;
    match api.validate_credentials().await {
        Ok(true) => Ok(api),
        Ok(false) => Err(FlowError::InvalidAuth),
        Err(err) => {
            tracing::debug!(error = %err, "Credential check failed");
            Err(FlowError::from_api(&err))
        }
    }
}

/// Adds a new account: credentials first, then the stations to poll.
///
/// # Examples
///
/// ```no_run
/// use meetnet_lib::protocol::MeetnetConfig;
/// use meetnet_lib::setup::{FlowResult, SetupFlow};
///
/// # async fn example() {
/// let mut flow = SetupFlow::new(MeetnetConfig::new());
/// let form = flow.start();
///
/// match flow.submit_credentials("user", "secret").await {
///     FlowResult::Form(form) => println!("{} stations", form.locations.len()),
///     other => println!("{other:?}"),
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct SetupFlow<F> {
    factory: F,
    configured: BTreeSet<String>,
    credentials: Option<Credentials>,
    catalog: Option<Catalog>,
}

impl<F: ApiFactory> SetupFlow<F> {
    /// Creates a flow that builds clients with `factory`.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            configured: BTreeSet::new(),
            credentials: None,
            catalog: None,
        }
    }

    /// Declares usernames that already have an entry.
    #[must_use]
    pub fn with_configured_usernames<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configured.extend(usernames.into_iter().map(Into::into));
        self
    }

    /// Returns the credentials form.
    #[must_use]
    pub fn start(&self) -> FlowResult {
        FlowResult::Form(Form::credentials(StepId::User, None))
    }

    /// Handles the credentials form.
    ///
    /// On success the catalog is loaded and the location form returned.
    pub async fn submit_credentials(&mut self, username: &str, password: &str) -> FlowResult {
        let credentials = Credentials::new(username, password);
        let api = match check_credentials(&self.factory, credentials.clone()).await {
            Ok(api) => api,
            Err(error) => return FlowResult::Form(Form::credentials(StepId::User, Some(error))),
        };

        let catalog = match api.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load catalog during setup");
                let error = FlowError::from_api(&err);
                return FlowResult::Form(Form::credentials(StepId::User, Some(error)));
            }
        };

        tracing::debug!(
            username = %username,
            locations = catalog.locations().len(),
            "Credentials accepted"
        );

        self.credentials = Some(credentials);
        self.catalog = Some(catalog);
        self.locations_form(None)
    }

    /// Handles the location form.
    pub fn submit_locations<S: AsRef<str>>(&self, selected: &[S]) -> FlowResult {
        let (Some(credentials), Some(catalog)) = (&self.credentials, &self.catalog) else {
            return self.start();
        };

        let locations = match validate_selection(catalog, selected) {
            Ok(locations) => locations,
            Err(err) => return self.locations_form(Some((&err).into())),
        };

        if self.configured.contains(&credentials.username) {
            return FlowResult::Abort(AbortReason::AlreadyConfigured);
        }

        let data = EntryData::new(&credentials.username, &credentials.password, locations);
        FlowResult::CreateEntry {
            title: data.title(),
            data,
        }
    }

    fn locations_form(&self, error: Option<FlowError>) -> FlowResult {
        let locations = self
            .catalog
            .as_ref()
            .map(|catalog| location_options(catalog, self.factory.language()))
            .unwrap_or_default();
        FlowResult::Form(Form {
            step: StepId::Locations,
            error,
            locations,
            selected: Vec::new(),
        })
    }
}

/// Replaces the credentials of an existing entry.
#[derive(Debug)]
pub struct ReauthFlow<F> {
    factory: F,
    entry: EntryData,
}

impl<F: ApiFactory> ReauthFlow<F> {
    /// Creates a flow for `entry`.
    #[must_use]
    pub fn new(factory: F, entry: EntryData) -> Self {
        Self { factory, entry }
    }

    /// Returns the credentials form.
    #[must_use]
    pub fn start(&self) -> FlowResult {
        FlowResult::Form(Form::credentials(StepId::ReauthConfirm, None))
    }

    /// Handles the credentials form.
    ///
    /// On success the entry keeps its locations and takes the new
    /// credentials.
    pub async fn submit(&self, username: &str, password: &str) -> FlowResult {
        let credentials = Credentials::new(username, password);
        if let Err(error) = check_credentials(&self.factory, credentials).await {
            return FlowResult::Form(Form::credentials(StepId::ReauthConfirm, Some(error)));
        }

        tracing::info!(username = %username, "Reauthenticated");
        FlowResult::UpdateEntry {
            data: EntryData::new(username, password, self.entry.locations.clone()),
            reason: Some(AbortReason::ReauthSuccessful),
        }
    }
}
