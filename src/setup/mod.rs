// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration flows.
//!
//! The host renders forms and stores entries; these types decide what to
//! show next. Each step returns a [`FlowResult`]:
//!
//! - [`SetupFlow`]: credentials, then location selection, then a new entry
//! - [`ReauthFlow`]: new credentials for an existing entry
//! - [`OptionsFlow`]: change the selected locations of an existing entry
//!
//! Error and abort codes match the host's translation keys, e.g.
//! `invalid_auth` or `already_configured`.

mod entry;
mod flow;
mod options;

pub use entry::{EntryData, validate_selection};
pub use flow::{ReauthFlow, SetupFlow};
pub use options::OptionsFlow;

use crate::catalog::Catalog;
use crate::error::{ConfigurationError, Error};
use crate::types::LocationKey;

/// Form identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    /// Credentials entry.
    User,
    /// Location selection during setup.
    Locations,
    /// Credentials entry during reauthentication.
    ReauthConfirm,
    /// Location selection in the options flow.
    Init,
}

impl StepId {
    /// Returns the host step identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Locations => "locations",
            Self::ReauthConfirm => "reauth_confirm",
            Self::Init => "init",
        }
    }
}

/// Errors shown on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    /// Credentials were rejected.
    InvalidAuth,
    /// The API could not be reached.
    CannotConnect,
    /// Anything else.
    Unknown,
    /// The selection was empty.
    NoLocationsSelected,
    /// The selection named a location missing from the catalog.
    UnknownLocation,
}

impl FlowError {
    /// Returns the host error code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::CannotConnect => "cannot_connect",
            Self::Unknown => "unknown",
            Self::NoLocationsSelected => "no_locations_selected",
            Self::UnknownLocation => "unknown_location",
        }
    }

    /// Classifies an error raised while talking to the API.
    pub(crate) fn from_api(err: &Error) -> Self {
        match err {
            Error::Authentication(_) => Self::InvalidAuth,
            Error::Api(_) => Self::CannotConnect,
            Error::Configuration(_) | Error::Value(_) => {
                tracing::error!(error = %err, "Unexpected error during setup");
                Self::Unknown
            }
        }
    }
}

impl From<&ConfigurationError> for FlowError {
    fn from(err: &ConfigurationError) -> Self {
        match err {
            ConfigurationError::NoLocationsSelected => Self::NoLocationsSelected,
            ConfigurationError::UnknownLocation(_) | ConfigurationError::InvalidLocation(_) => {
                Self::UnknownLocation
            }
        }
    }
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons for ending a flow without a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// An entry for this username exists.
    AlreadyConfigured,
    /// The entry's credentials were replaced.
    ReauthSuccessful,
    /// The catalog could not be loaded.
    CannotConnect,
}

impl AbortReason {
    /// Returns the host abort code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyConfigured => "already_configured",
            Self::ReauthSuccessful => "reauth_successful",
            Self::CannotConnect => "cannot_connect",
        }
    }
}

/// A selectable station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationOption {
    /// Station key.
    pub key: LocationKey,
    /// Localized station name.
    pub name: String,
}

/// Stations of `catalog`, sorted by display name.
pub(crate) fn location_options(catalog: &Catalog, language: &str) -> Vec<LocationOption> {
    catalog
        .locations_sorted_by_name(language)
        .into_iter()
        .map(|(key, name)| LocationOption {
            key: key.clone(),
            name: name.to_string(),
        })
        .collect()
}

/// A form for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Which form.
    pub step: StepId,
    /// Error to display, if any.
    pub error: Option<FlowError>,
    /// Selectable stations; empty for credential forms.
    pub locations: Vec<LocationOption>,
    /// Preselected stations.
    pub selected: Vec<LocationKey>,
}

impl Form {
    pub(crate) fn credentials(step: StepId, error: Option<FlowError>) -> Self {
        Self {
            step,
            error,
            locations: Vec::new(),
            selected: Vec::new(),
        }
    }
}

/// Outcome of a flow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// Show a form.
    Form(Form),
    /// Create a new entry.
    CreateEntry {
        /// Entry title.
        title: String,
        /// Data to store.
        data: EntryData,
    },
    /// Replace the data of the existing entry and reload it.
    UpdateEntry {
        /// New data.
        data: EntryData,
        /// Abort reason to report afterwards, if the flow ends with one.
        reason: Option<AbortReason>,
    },
    /// End the flow.
    Abort(AbortReason),
}

impl FlowResult {
    /// Returns the form error, if this is a form showing one.
    #[must_use]
    pub fn error(&self) -> Option<FlowError> {
        match self {
            Self::Form(form) => form.error,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::catalog;

    #[test]
    fn codes() {
        assert_eq!(StepId::ReauthConfirm.as_str(), "reauth_confirm");
        assert_eq!(FlowError::NoLocationsSelected.to_string(), "no_locations_selected");
        assert_eq!(AbortReason::AlreadyConfigured.as_str(), "already_configured");
    }

    #[test]
    fn api_errors_are_classified() {
        let auth = Error::Authentication("nope".to_string());
        assert_eq!(FlowError::from_api(&auth), FlowError::InvalidAuth);

        let timeout = Error::from(ApiError::Timeout(10_000));
        assert_eq!(FlowError::from_api(&timeout), FlowError::CannotConnect);

        let config = Error::from(ConfigurationError::NoLocationsSelected);
        assert_eq!(FlowError::from_api(&config), FlowError::Unknown);
    }

    #[test]
    fn options_are_sorted_by_name() {
        let names: Vec<_> = location_options(&catalog(), "en")
            .into_iter()
            .map(|option| option.name)
            .collect();
        assert_eq!(names, vec!["Akkaert boei", "Heist buoy", "Nieuwpoort"]);
    }
}
