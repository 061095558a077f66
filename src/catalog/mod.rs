// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The API catalog: stations, quantities and the series published for them.
//!
//! A [`Catalog`] is fetched once per configured entry. Parsing validates the
//! invariants the rest of the library relies on:
//!
//! - every [`AvailableData`] entry references a known location and parameter
//! - every [`AvailableData`] key is the concatenation of those two keys
//! - every name is a non-empty [`LocalizedText`](crate::types::LocalizedText)
//!
//! Any violation is a fatal [`ParseError`].
//!
//! # Examples
//!
//! ```
//! use meetnet_lib::catalog::Catalog;
//! use meetnet_lib::types::LocationKey;
//!
//! let json = r#"{
//!     "Locations": [{"ID": "NPT", "Name": [{"Culture": "nl", "Message": "Nieuwpoort"}]}],
//!     "Parameters": [{"ID": "WVC", "Name": [{"Culture": "en", "Message": "Wind speed"}], "Unit": "m/s"}],
//!     "ParameterTypes": [],
//!     "AvailableData": [{"ID": "NPTWVC", "Location": "NPT", "Parameter": "WVC", "CurrentInterval": 10}]
//! }"#;
//!
//! let catalog = Catalog::from_json(json).unwrap();
//! let npt = LocationKey::new("NPT").unwrap();
//! assert_eq!(catalog.available_for_location(&npt).count(), 1);
//! ```

mod model;
mod wire;

use std::collections::BTreeMap;

pub use model::{AvailableData, Location, Parameter, ParameterType};

use crate::error::ParseError;
use crate::types::{LocationKey, LocationParameterKey, ParameterKey};

/// Parsed catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    locations: BTreeMap<LocationKey, Location>,
    parameters: BTreeMap<ParameterKey, Parameter>,
    parameter_types: BTreeMap<i64, ParameterType>,
    available_data: Vec<AvailableData>,
    projection_wkt: Option<String>,
}

impl Catalog {
    /// Parses a catalog from the JSON body of `GET /V2/catalog`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for malformed JSON or violated invariants.
    pub fn from_json(body: &str) -> Result<Self, ParseError> {
        let raw: wire::RawCatalog = serde_json::from_str(body)?;
        Self::try_from(raw)
    }

    /// Returns all locations keyed by identifier.
    #[must_use]
    pub fn locations(&self) -> &BTreeMap<LocationKey, Location> {
        &self.locations
    }

    /// Returns all parameters keyed by identifier.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<ParameterKey, Parameter> {
        &self.parameters
    }

    /// Returns all parameter types keyed by identifier.
    #[must_use]
    pub fn parameter_types(&self) -> &BTreeMap<i64, ParameterType> {
        &self.parameter_types
    }

    /// Returns all available series in the order the API listed them.
    #[must_use]
    pub fn available_data(&self) -> &[AvailableData] {
        &self.available_data
    }

    /// Returns the projection of the position strings, if reported.
    #[must_use]
    pub fn projection_wkt(&self) -> Option<&str> {
        self.projection_wkt.as_deref()
    }

    /// Looks up a location.
    #[must_use]
    pub fn location(&self, key: &LocationKey) -> Option<&Location> {
        self.locations.get(key)
    }

    /// Looks up a parameter.
    #[must_use]
    pub fn parameter(&self, key: &ParameterKey) -> Option<&Parameter> {
        self.parameters.get(key)
    }

    /// Looks up the type a parameter belongs to.
    #[must_use]
    pub fn parameter_type_of(&self, parameter: &Parameter) -> Option<&ParameterType> {
        parameter
            .parameter_type_id
            .and_then(|id| self.parameter_types.get(&id))
    }

    /// Looks up an available series.
    #[must_use]
    pub fn available(&self, key: &LocationParameterKey) -> Option<&AvailableData> {
        self.available_data.iter().find(|entry| &entry.key == key)
    }

    /// Returns true if the location exists.
    #[must_use]
    pub fn contains_location(&self, key: &LocationKey) -> bool {
        self.locations.contains_key(key)
    }

    /// Returns the series published for one location.
    pub fn available_for_location<'a>(
        &'a self,
        location: &'a LocationKey,
    ) -> impl Iterator<Item = &'a AvailableData> + 'a {
        self.available_data
            .iter()
            .filter(move |entry| &entry.location == location)
    }

    /// Returns the series published for any of the given locations, in
    /// catalog order.
    #[must_use]
    pub fn available_for_locations(&self, locations: &[LocationKey]) -> Vec<&AvailableData> {
        self.available_data
            .iter()
            .filter(|entry| locations.contains(&entry.location))
            .collect()
    }

    /// Returns `(key, display name)` for every location, sorted by name.
    ///
    /// Used to populate location pickers.
    #[must_use]
    pub fn locations_sorted_by_name(&self, language: &str) -> Vec<(&LocationKey, &str)> {
        let mut sorted: Vec<_> = self
            .locations
            .values()
            .map(|loc| (&loc.key, loc.display_name(language)))
            .collect();
        sorted.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }

    /// Returns parameters ordered by their type's sort order, then key.
    ///
    /// Parameters without a known type come last.
    #[must_use]
    pub fn parameters_by_type(&self) -> Vec<&Parameter> {
        let mut sorted: Vec<_> = self.parameters.values().collect();
        sorted.sort_by_key(|p| {
            let order = self
                .parameter_type_of(p)
                .map_or(i64::MAX, |t| t.sort_order);
            (order, p.key.clone())
        });
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "Locations": [
            {
                "ID": "NPT",
                "Name": [{"Culture": "nl", "Message": "Nieuwpoort"}, {"Culture": "en", "Message": "Nieuwpoort"}],
                "Description": [{"Culture": "nl", "Message": "Nieuwpoort paal"}],
                "PositionWKT": "POINT (2.7299 51.1524)"
            },
            {
                "ID": "A2B",
                "Name": [{"Culture": "nl", "Message": "Akkaert boei"}],
                "Description": []
            }
        ],
        "Parameters": [
            {"ID": "WVC", "Name": [{"Culture": "en", "Message": "Wind speed"}], "Unit": "m/s", "ParameterTypeID": 2},
            {"ID": "WRS", "Name": [{"Culture": "en", "Message": "Wind direction"}], "Unit": "deg", "ParameterTypeID": 2},
            {"ID": "GH1", "Name": [{"Culture": "en", "Message": "Wave height"}], "Unit": "cm", "ParameterTypeID": 1, "MinValue": 0, "MaxValue": 2000}
        ],
        "ParameterTypes": [
            {"ID": 1, "SortOrder": 1, "Name": [{"Culture": "en", "Message": "Waves"}]},
            {"ID": 2, "SortOrder": 2, "Name": [{"Culture": "en", "Message": "Wind"}]}
        ],
        "AvailableData": [
            {"ID": "NPTWVC", "Location": "NPT", "Parameter": "WVC", "CurrentInterval": 10, "Publications": ["Meetnet", "Public"]},
            {"ID": "NPTWRS", "Location": "NPT", "Parameter": "WRS", "CurrentInterval": 10},
            {"ID": "A2BGH1", "Location": "A2B", "Parameter": "GH1", "CurrentInterval": 30}
        ],
        "ProjectionWKT": "GEOGCS[\"WGS 84\"]"
    }"#;

    fn key(s: &str) -> LocationKey {
        LocationKey::new(s).unwrap()
    }

    #[test]
    fn parse_full_catalog() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.locations().len(), 2);
        assert_eq!(catalog.parameters().len(), 3);
        assert_eq!(catalog.parameter_types().len(), 2);
        assert_eq!(catalog.available_data().len(), 3);
        assert_eq!(catalog.projection_wkt(), Some("GEOGCS[\"WGS 84\"]"));

        let npt = catalog.location(&key("NPT")).unwrap();
        assert_eq!(npt.display_description("en"), Some("Nieuwpoort paal"));
        assert!(catalog.location(&key("A2B")).unwrap().description.is_none());

        let gh1 = catalog.parameter(&ParameterKey::new("GH1").unwrap()).unwrap();
        assert_eq!(gh1.max_value, Some(2000.0));
    }

    #[test]
    fn available_data_fields() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let entry = catalog
            .available(&LocationParameterKey::new("NPTWVC").unwrap())
            .unwrap();
        assert_eq!(entry.current_interval, Some(10));
        assert!(entry.publications.contains("Meetnet"));
        assert_eq!(entry.location, key("NPT"));
    }

    #[test]
    fn available_for_locations_keeps_catalog_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let entries = catalog.available_for_locations(&[key("A2B"), key("NPT")]);
        let ids: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(ids, vec!["NPTWVC", "NPTWRS", "A2BGH1"]);

        assert_eq!(catalog.available_for_location(&key("A2B")).count(), 1);
        assert!(catalog.available_for_locations(&[key("ZZZ")]).is_empty());
    }

    #[test]
    fn locations_sorted_by_display_name() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let sorted = catalog.locations_sorted_by_name("en");
        assert_eq!(sorted[0].1, "Akkaert boei");
        assert_eq!(sorted[1].1, "Nieuwpoort");
    }

    #[test]
    fn parameters_ordered_by_type() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let keys: Vec<_> = catalog
            .parameters_by_type()
            .iter()
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(keys, vec!["GH1", "WRS", "WVC"]);
    }

    #[test]
    fn dangling_location_is_rejected() {
        let json = r#"{
            "Locations": [],
            "Parameters": [{"ID": "WVC", "Name": [{"Culture": "en", "Message": "Wind speed"}]}],
            "AvailableData": [{"ID": "NPTWVC", "Location": "NPT", "Parameter": "WVC"}]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DanglingReference {
                kind: "location",
                ..
            }
        ));
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let json = r#"{
            "Locations": [{"ID": "NPT", "Name": [{"Culture": "nl", "Message": "Nieuwpoort"}]}],
            "Parameters": [{"ID": "WVC", "Name": [{"Culture": "en", "Message": "Wind speed"}]}],
            "AvailableData": [{"ID": "NPTWRS", "Location": "NPT", "Parameter": "WVC"}]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, ParseError::KeyMismatch { .. }));
    }

    #[test]
    fn empty_name_is_fatal() {
        let json = r#"{"Locations": [{"ID": "NPT", "Name": []}]}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, ParseError::EmptyMessageList(ref what) if what == "location NPT name"));
    }

    #[test]
    fn invalid_key_is_rejected() {
        let json = r#"{"Locations": [{"ID": "NIEUWPOORT", "Name": [{"Culture": "nl", "Message": "x"}]}]}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, ParseError::InvalidKey { .. }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            Catalog::from_json("[1, 2, 3]"),
            Err(ParseError::Json(_))
        ));
    }
}
