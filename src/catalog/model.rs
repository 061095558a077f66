// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog entities.

use std::collections::BTreeSet;

use crate::types::{LocalizedText, LocationKey, LocationParameterKey, ParameterKey};

/// A monitoring station.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Station identifier.
    pub key: LocationKey,
    /// Localized station name.
    pub name: LocalizedText,
    /// Localized description, when the API provides one.
    pub description: Option<LocalizedText>,
    /// Position as a WKT point, e.g. `POINT (2.7 51.2)`.
    pub position_wkt: Option<String>,
}

impl Location {
    /// Returns the display name in the preferred language.
    #[must_use]
    pub fn display_name(&self, language: &str) -> &str {
        self.name.resolve(language)
    }

    /// Returns the description in the preferred language.
    #[must_use]
    pub fn display_description(&self, language: &str) -> Option<&str> {
        self.description.as_ref().map(|d| d.resolve(language))
    }

    /// Returns the `(x, y)` coordinates of a WKT `POINT`, if parseable.
    ///
    /// # Examples
    ///
    /// ```
    /// use meetnet_lib::catalog::Location;
    /// use meetnet_lib::types::{LocalizedText, LocationKey};
    ///
    /// let location = Location {
    ///     key: LocationKey::new("NPT").unwrap(),
    ///     name: LocalizedText::single("nl", "Nieuwpoort"),
    ///     description: None,
    ///     position_wkt: Some("POINT (2.7299 51.1524)".to_string()),
    /// };
    /// assert_eq!(location.coordinates(), Some((2.7299, 51.1524)));
    /// ```
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let wkt = self.position_wkt.as_deref()?.trim();
        let rest = wkt
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("POINT"))
            .map(|_| wkt[5..].trim())?;
        let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
        let mut parts = inner.split_whitespace();
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        Some((x, y))
    }
}

/// A measured quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter identifier.
    pub key: ParameterKey,
    /// Localized parameter name.
    pub name: LocalizedText,
    /// Physical unit as reported by the API; may be empty.
    pub unit: String,
    /// Reference to the grouping [`ParameterType`].
    pub parameter_type_id: Option<i64>,
    /// Lower bound of plausible values.
    pub min_value: Option<f64>,
    /// Upper bound of plausible values.
    pub max_value: Option<f64>,
}

impl Parameter {
    /// Returns the display name in the preferred language.
    #[must_use]
    pub fn display_name(&self, language: &str) -> &str {
        self.name.resolve(language)
    }

    /// Returns the unit, or `None` when the API left it empty.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        let unit = self.unit.trim();
        (!unit.is_empty()).then_some(unit)
    }
}

/// Grouping of parameters for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterType {
    /// Type identifier.
    pub id: i64,
    /// Position when ordering groups.
    pub sort_order: i64,
    /// Localized group name.
    pub name: LocalizedText,
}

/// A (location, parameter) combination the API publishes data for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableData {
    /// Series identifier; always `location` + `parameter`.
    pub key: LocationParameterKey,
    /// The station.
    pub location: LocationKey,
    /// The measured quantity.
    pub parameter: ParameterKey,
    /// Current sampling interval in minutes.
    pub current_interval: Option<u32>,
    /// Publication tags.
    pub publications: BTreeSet<String>,
}
