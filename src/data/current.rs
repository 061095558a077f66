// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Latest readings from `GET /V2/currentData`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{LocationParameterKey, parse_timestamp};

/// The latest reading of one series.
///
/// A `value` of `None` means the station has no recent reading; it is
/// never substituted with zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentValue {
    /// Series identifier.
    pub key: LocationParameterKey,
    /// Measurement time.
    pub timestamp: DateTime<Utc>,
    /// Measured value, if any.
    pub value: Option<f64>,
}

impl CurrentValue {
    /// Returns true if the reading carries a value.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RawCurrentValue {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Timestamp", default)]
    timestamp: Option<String>,
    #[serde(rename = "Value", default)]
    value: Option<f64>,
}

/// Parses the body of `GET /V2/currentData`.
///
/// The endpoint answers with a bare JSON array; there is no wrapping
/// object. Rows with an unusable identifier or timestamp are skipped with
/// a warning so one bad row does not hide the rest.
///
/// # Errors
///
/// Returns `ParseError` if the body is not a JSON array of readings.
///
/// # Examples
///
/// ```
/// use meetnet_lib::data::parse_current;
///
/// let body = r#"[{"ID":"NPTWVC","Timestamp":"2024-01-15T12:00:00Z","Value":5.2}]"#;
/// let values = parse_current(body).unwrap();
/// let reading = values.values().next().unwrap();
/// assert_eq!(reading.value, Some(5.2));
/// ```
pub fn parse_current(
    body: &str,
) -> Result<BTreeMap<LocationParameterKey, CurrentValue>, ParseError> {
    if body.trim_start().starts_with('{') {
        return Err(ParseError::UnexpectedFormat(
            "expected a JSON array of current values, got an object".to_string(),
        ));
    }

    let rows: Vec<RawCurrentValue> = serde_json::from_str(body)?;
    let mut values = BTreeMap::new();

    for row in rows {
        let key = match LocationParameterKey::new(row.id.as_str()) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(id = %row.id, error = %err, "Skipping current value with invalid id");
                continue;
            }
        };

        let Some(timestamp) = row.timestamp.as_deref().and_then(parse_timestamp) else {
            tracing::warn!(
                id = %row.id,
                timestamp = ?row.timestamp,
                "Skipping current value with unparseable timestamp"
            );
            continue;
        };

        values.insert(
            key.clone(),
            CurrentValue {
                key,
                timestamp,
                value: row.value,
            },
        );
    }

    Ok(values)
}
