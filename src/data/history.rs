// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Historical readings from `POST /V2/getData`.
//!
//! The request body names the series and the window:
//!
//! ```json
//! {"IDs": ["NPTWVC"], "StartTime": "2024-01-15T00:00:00Z", "EndTime": "2024-01-16T00:00:00Z"}
//! ```
//!
//! The response wraps a `Values` array. Each element is either a per-series
//! object carrying its own nested `Values`, or a flat
//! `{ID, Timestamp, Value}` row. Flat rows are grouped by `ID`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValueError};
use crate::types::{LocationParameterKey, datetime};

/// One point of a historical series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    /// Measurement time.
    pub timestamp: DateTime<Utc>,
    /// Measured value; `None` marks a gap.
    pub value: Option<f64>,
}

/// Readings of one series over a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    /// Series identifier.
    pub key: LocationParameterKey,
    /// Start of the covered window.
    pub from: DateTime<Utc>,
    /// End of the covered window.
    pub till: DateTime<Utc>,
    /// Smallest value in the window.
    pub min_value: Option<f64>,
    /// Largest value in the window.
    pub max_value: Option<f64>,
    /// Points in ascending timestamp order, gaps included.
    pub points: Vec<HistoryPoint>,
}

impl HistoricalSeries {
    /// Returns the number of points that carry a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

/// Body of a `POST /V2/getData` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRequest {
    /// Requested series.
    #[serde(rename = "IDs")]
    pub ids: Vec<LocationParameterKey>,
    /// Window start.
    #[serde(rename = "StartTime", serialize_with = "datetime::serialize")]
    pub start: DateTime<Utc>,
    /// Window end.
    #[serde(rename = "EndTime", serialize_with = "datetime::serialize")]
    pub end: DateTime<Utc>,
}

impl HistoryRequest {
    /// Creates a request, rejecting empty or reversed windows.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTimeRange` if `start >= end`.
    pub fn new(
        ids: Vec<LocationParameterKey>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ValueError> {
        if start >= end {
            return Err(ValueError::InvalidTimeRange);
        }
        Ok(Self { ids, start, end })
    }
}

#[derive(Debug, Deserialize)]
struct RawHistoryResponse {
    #[serde(
        rename = "From",
        alias = "StartTime",
        default,
        deserialize_with = "datetime::deserialize_option"
    )]
    from: Option<DateTime<Utc>>,
    #[serde(
        rename = "Till",
        alias = "EndTime",
        default,
        deserialize_with = "datetime::deserialize_option"
    )]
    till: Option<DateTime<Utc>>,
    #[serde(rename = "Values", default)]
    values: Vec<RawHistoryRow>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHistoryRow {
    Series(RawSeries),
    Point(RawFlatPoint),
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(rename = "ID")]
    id: String,
    #[serde(
        rename = "StartTime",
        alias = "From",
        default,
        deserialize_with = "datetime::deserialize_option"
    )]
    from: Option<DateTime<Utc>>,
    #[serde(
        rename = "EndTime",
        alias = "Till",
        default,
        deserialize_with = "datetime::deserialize_option"
    )]
    till: Option<DateTime<Utc>>,
    #[serde(rename = "MinValue", default)]
    min_value: Option<f64>,
    #[serde(rename = "MaxValue", default)]
    max_value: Option<f64>,
    #[serde(rename = "Values")]
    values: Vec<RawPoint>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(rename = "Timestamp", deserialize_with = "datetime::deserialize")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Value", default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFlatPoint {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Timestamp", deserialize_with = "datetime::deserialize")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Value", default)]
    value: Option<f64>,
}

#[derive(Default)]
struct SeriesBuilder {
    from: Option<DateTime<Utc>>,
    till: Option<DateTime<Utc>>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    points: Vec<HistoryPoint>,
}

fn series_key(raw: &str) -> Result<LocationParameterKey, ParseError> {
    LocationParameterKey::new(raw).map_err(|source| ParseError::InvalidKey {
        key: raw.to_string(),
        source,
    })
}

/// Parses the body of `POST /V2/getData` for the window of `request`.
///
/// Series without reported bounds fall back to the response window, then to
/// the requested window. Missing min/max are computed from present values.
///
/// # Errors
///
/// Returns `ParseError` for malformed JSON or invalid identifiers.
pub fn parse_history(
    body: &str,
    request: &HistoryRequest,
) -> Result<BTreeMap<LocationParameterKey, HistoricalSeries>, ParseError> {
    let raw: RawHistoryResponse = serde_json::from_str(body)?;
    let mut builders: BTreeMap<LocationParameterKey, SeriesBuilder> = BTreeMap::new();

    for row in raw.values {
        match row {
            RawHistoryRow::Series(series) => {
                let builder = builders.entry(series_key(&series.id)?).or_default();
                builder.from = builder.from.or(series.from);
                builder.till = builder.till.or(series.till);
                builder.min_value = builder.min_value.or(series.min_value);
                builder.max_value = builder.max_value.or(series.max_value);
                builder
                    .points
                    .extend(series.values.into_iter().map(|p| HistoryPoint {
                        timestamp: p.timestamp,
                        value: p.value,
                    }));
            }
            RawHistoryRow::Point(point) => {
                builders
                    .entry(series_key(&point.id)?)
                    .or_default()
                    .points
                    .push(HistoryPoint {
                        timestamp: point.timestamp,
                        value: point.value,
                    });
            }
        }
    }

    let window_from = raw.from.unwrap_or(request.start);
    let window_till = raw.till.unwrap_or(request.end);

    Ok(builders
        .into_iter()
        .map(|(key, mut builder)| {
            builder.points.sort_by_key(|p| p.timestamp);
            let present = || builder.points.iter().filter_map(|p| p.value);
            let min_value = builder.min_value.or_else(|| present().reduce(f64::min));
            let max_value = builder.max_value.or_else(|| present().reduce(f64::max));

            let series = HistoricalSeries {
                key: key.clone(),
                from: builder.from.unwrap_or(window_from),
                till: builder.till.unwrap_or(window_till),
                min_value,
                max_value,
                points: builder.points,
            };
            (key, series)
        })
        .collect())
}
