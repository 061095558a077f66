// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Published coordinator state.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::CurrentValue;
use crate::error::{ApiError, Error};
use crate::types::LocationParameterKey;

/// Why the most recent refresh failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    message: String,
    requires_reauth: bool,
}

impl RefreshFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(message: impl Into<String>, requires_reauth: bool) -> Self {
        Self {
            message: message.into(),
            requires_reauth,
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the stored credentials were rejected.
    ///
    /// Retrying will not help until the entry is reauthenticated.
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        self.requires_reauth
    }
}

impl From<&Error> for RefreshFailure {
    fn from(err: &Error) -> Self {
        Self::new(err.to_string(), err.is_auth_error())
    }
}

impl From<&RefreshFailure> for Error {
    fn from(failure: &RefreshFailure) -> Self {
        if failure.requires_reauth {
            Self::Authentication(failure.message.clone())
        } else {
            Self::Api(ApiError::SharedRefresh(failure.message.clone()))
        }
    }
}

impl std::fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The values known after a refresh.
///
/// Snapshots carry no wall-clock data of their own, so two refreshes that
/// receive identical upstream data produce equal snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: BTreeMap<LocationParameterKey, CurrentValue>,
    stale: BTreeSet<LocationParameterKey>,
    last_error: Option<RefreshFailure>,
}

impl Snapshot {
    /// Creates a snapshot from a successful fetch.
    #[must_use]
    pub fn new(values: BTreeMap<LocationParameterKey, CurrentValue>) -> Self {
        Self {
            values,
            stale: BTreeSet::new(),
            last_error: None,
        }
    }

    /// Marks `keys` as stale.
    #[must_use]
    pub fn with_stale(mut self, keys: impl IntoIterator<Item = LocationParameterKey>) -> Self {
        self.stale.extend(keys);
        self
    }

    /// Records a refresh failure.
    #[must_use]
    pub fn with_failure(mut self, failure: RefreshFailure) -> Self {
        self.last_error = Some(failure);
        self
    }

    /// Returns every known value, stale ones included.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<LocationParameterKey, CurrentValue> {
        &self.values
    }

    /// Returns the value for `key`, stale or not.
    #[must_use]
    pub fn get(&self, key: &LocationParameterKey) -> Option<&CurrentValue> {
        self.values.get(key)
    }

    /// Returns the keys whose values were not confirmed by the last refresh.
    #[must_use]
    pub fn stale(&self) -> &BTreeSet<LocationParameterKey> {
        &self.stale
    }

    /// Returns true if `key` was not confirmed by the last refresh.
    #[must_use]
    pub fn is_stale(&self, key: &LocationParameterKey) -> bool {
        self.stale.contains(key)
    }

    /// Returns true if `key` has a value from the last refresh.
    #[must_use]
    pub fn is_available(&self, key: &LocationParameterKey) -> bool {
        self.values.contains_key(key) && !self.is_stale(key)
    }

    /// Returns the failure of the last refresh, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&RefreshFailure> {
        self.last_error.as_ref()
    }

    /// Returns true if the last refresh succeeded.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.last_error.is_none()
    }

    /// Returns true if the last refresh failed on authentication.
    #[must_use]
    pub fn requires_reauth(&self) -> bool {
        self.last_error
            .as_ref()
            .is_some_and(RefreshFailure::requires_reauth)
    }
}
