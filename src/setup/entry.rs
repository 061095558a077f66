// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted entry data and selection validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::protocol::Credentials;
use crate::types::LocationKey;

/// What the host stores for a configured account.
///
/// Serialized as `{"username", "password", "locations"}`. The password is
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    /// Account username; also the entry's unique id.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Selected stations.
    pub locations: Vec<LocationKey>,
}

impl EntryData {
    /// Creates entry data.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        locations: Vec<LocationKey>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            locations,
        }
    }

    /// Returns the stored credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Returns the entry title shown by the host.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Meetnet ({})", self.username)
    }
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryData")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("locations", &self.locations)
            .finish()
    }
}

/// Validates a location selection against the catalog.
///
/// Returns the selected keys in the given order, without duplicates.
///
/// # Errors
///
/// Returns `ConfigurationError::NoLocationsSelected` for an empty
/// selection, `InvalidLocation` for a malformed key and `UnknownLocation`
/// for a key absent from the catalog.
///
/// # Examples
///
/// ```
/// use meetnet_lib::catalog::Catalog;
/// use meetnet_lib::error::ConfigurationError;
/// use meetnet_lib::setup::validate_selection;
///
/// let catalog = Catalog::default();
/// assert_eq!(
///     validate_selection(&catalog, &[] as &[&str]),
///     Err(ConfigurationError::NoLocationsSelected)
/// );
/// ```
pub fn validate_selection<S: AsRef<str>>(
    catalog: &Catalog,
    selected: &[S],
) -> Result<Vec<LocationKey>, ConfigurationError> {
    if selected.is_empty() {
        return Err(ConfigurationError::NoLocationsSelected);
    }

    let mut keys: Vec<LocationKey> = Vec::with_capacity(selected.len());
    for raw in selected {
        let raw = raw.as_ref();
        let key = LocationKey::new(raw)
            .map_err(|_| ConfigurationError::InvalidLocation(raw.to_string()))?;
        if !catalog.contains_location(&key) {
            return Err(ConfigurationError::UnknownLocation(raw.to_string()));
        }
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::catalog;

    fn location(s: &str) -> LocationKey {
        LocationKey::new(s).unwrap()
    }

    #[test]
    fn selection_keeps_order_and_drops_duplicates() {
        let keys = validate_selection(&catalog(), &["NPT", "A2B", "NPT"]).unwrap();
        assert_eq!(keys, vec![location("NPT"), location("A2B")]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &Vec::<String>::new()),
            Err(ConfigurationError::NoLocationsSelected)
        );
    }

    #[test]
    fn unknown_location_is_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &["NPT", "ZZZ"]),
            Err(ConfigurationError::UnknownLocation("ZZZ".to_string()))
        );
    }

    #[test]
    fn malformed_location_is_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &["NIEUWPOORT"]),
            Err(ConfigurationError::InvalidLocation("NIEUWPOORT".to_string()))
        );
    }

    #[test]
    fn entry_data_round_trips_through_json() {
        let data = EntryData::new("alice", "hunter2", vec![location("NPT")]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"username": "alice", "password": "hunter2", "locations": ["NPT"]})
        );
        assert_eq!(serde_json::from_value::<EntryData>(json).unwrap(), data);
    }

    #[test]
    fn stored_invalid_location_fails_to_load() {
        let json = serde_json::json!({"username": "a", "password": "b", "locations": ["TOOLONG"]});
        assert!(serde_json::from_value::<EntryData>(json).is_err());
    }

    #[test]
    fn entry_title_and_debug() {
        let data = EntryData::new("alice", "hunter2", vec![]);
        assert_eq!(data.title(), "Meetnet (alice)");
        assert!(!format!("{data:?}").contains("hunter2"));
        assert_eq!(data.credentials().username, "alice");
    }
}
