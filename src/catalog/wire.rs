// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire format of `GET /V2/catalog` and its conversion into the model.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ParseError, ValueError};
use crate::types::{LocalizedText, LocationKey, LocationParameterKey, Message, ParameterKey};

use super::Catalog;
use super::model::{AvailableData, Location, Parameter, ParameterType};

#[derive(Debug, Deserialize)]
pub(super) struct RawCatalog {
    #[serde(rename = "Locations", default)]
    locations: Vec<RawLocation>,
    #[serde(rename = "Parameters", default)]
    parameters: Vec<RawParameter>,
    #[serde(rename = "ParameterTypes", default)]
    parameter_types: Vec<RawParameterType>,
    #[serde(rename = "AvailableData", default)]
    available_data: Vec<RawAvailableData>,
    #[serde(rename = "ProjectionWKT", default)]
    projection_wkt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: Vec<Message>,
    #[serde(rename = "Description", default)]
    description: Option<Vec<Message>>,
    #[serde(rename = "PositionWKT", default)]
    position_wkt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name", default)]
    name: Vec<Message>,
    #[serde(rename = "Unit", default)]
    unit: Option<String>,
    #[serde(rename = "ParameterTypeID", default)]
    parameter_type_id: Option<i64>,
    #[serde(rename = "MinValue", alias = "Minimum", default)]
    min_value: Option<f64>,
    #[serde(rename = "MaxValue", alias = "Maximum", default)]
    max_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawParameterType {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "SortOrder", default)]
    sort_order: i64,
    #[serde(rename = "Name", default)]
    name: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct RawAvailableData {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Parameter")]
    parameter: String,
    #[serde(rename = "CurrentInterval", default)]
    current_interval: Option<u32>,
    #[serde(rename = "Publications", default)]
    publications: Vec<Value>,
}

fn localized(
    messages: Vec<Message>,
    what: impl FnOnce() -> String,
) -> Result<LocalizedText, ParseError> {
    LocalizedText::new(messages).map_err(|_| ParseError::EmptyMessageList(what()))
}

fn key<K: FromStr<Err = ValueError>>(raw: &str) -> Result<K, ParseError> {
    raw.parse().map_err(|source| ParseError::InvalidKey {
        key: raw.to_string(),
        source,
    })
}

fn publication_tag(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = ParseError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        let mut locations = BTreeMap::new();
        for loc in raw.locations {
            let location_key = key::<LocationKey>(&loc.id)?;
            let name = localized(loc.name, || format!("location {} name", loc.id))?;
            // Descriptions are optional; an empty list means none.
            let description = loc
                .description
                .filter(|d| !d.is_empty())
                .map(|d| localized(d, || format!("location {} description", loc.id)))
                .transpose()?;

            locations.insert(
                location_key.clone(),
                Location {
                    key: location_key,
                    name,
                    description,
                    position_wkt: loc.position_wkt,
                },
            );
        }

        let mut parameters = BTreeMap::new();
        for param in raw.parameters {
            let parameter_key = key::<ParameterKey>(&param.id)?;
            let name = localized(param.name, || format!("parameter {} name", param.id))?;

            parameters.insert(
                parameter_key.clone(),
                Parameter {
                    key: parameter_key,
                    name,
                    unit: param.unit.unwrap_or_default(),
                    parameter_type_id: param.parameter_type_id,
                    min_value: param.min_value,
                    max_value: param.max_value,
                },
            );
        }

        let mut parameter_types = BTreeMap::new();
        for ptype in raw.parameter_types {
            let name = localized(ptype.name, || format!("parameter type {} name", ptype.id))?;
            parameter_types.insert(
                ptype.id,
                ParameterType {
                    id: ptype.id,
                    sort_order: ptype.sort_order,
                    name,
                },
            );
        }

        let mut available_data = Vec::with_capacity(raw.available_data.len());
        for entry in raw.available_data {
            let entry_key = key::<LocationParameterKey>(&entry.id)?;
            let location = key::<LocationKey>(&entry.location)?;
            let parameter = key::<ParameterKey>(&entry.parameter)?;

            if LocationParameterKey::from_parts(&location, &parameter) != entry_key {
                return Err(ParseError::KeyMismatch {
                    entry: entry.id,
                    location: entry.location,
                    parameter: entry.parameter,
                });
            }
            if !locations.contains_key(&location) {
                return Err(ParseError::DanglingReference {
                    entry: entry.id,
                    kind: "location",
                    key: entry.location,
                });
            }
            if !parameters.contains_key(&parameter) {
                return Err(ParseError::DanglingReference {
                    entry: entry.id,
                    kind: "parameter",
                    key: entry.parameter,
                });
            }

            available_data.push(AvailableData {
                key: entry_key,
                location,
                parameter,
                current_interval: entry.current_interval,
                publications: entry
                    .publications
                    .into_iter()
                    .filter_map(publication_tag)
                    .collect::<BTreeSet<_>>(),
            });
        }

        Ok(Catalog {
            locations,
            parameters,
            parameter_types,
            available_data,
            projection_wkt: raw.projection_wkt,
        })
    }
}
