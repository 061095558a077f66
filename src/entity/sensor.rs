// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor entities backed by a coordinator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::catalog::AvailableData;
use crate::coordinator::Coordinator;
use crate::data::HistoryPoint;
use crate::error::{Result, ValueError};
use crate::protocol::MeetnetApi;
use crate::types::{LocationKey, LocationParameterKey, ParameterKey, format_timestamp};

use super::description::{
    DEFAULT_ICON, DeviceClass, ParameterDescription, StateClass, describe,
};

/// Integration domain, used as the unique-id prefix and device namespace.
pub const DOMAIN: &str = "meetnet_vlaamse_banken";

/// Manufacturer reported for every station device.
pub const MANUFACTURER: &str = "Meetnet Vlaamse Banken";

/// Model reported for every station device.
pub const MODEL: &str = "Monitoring Station";

/// State of a sensor.
///
/// A missing reading is `Unknown`, never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorState {
    /// Measured value.
    Value(f64),
    /// No value available.
    Unknown,
}

impl SensorState {
    /// Returns the value, if known.
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl From<Option<f64>> for SensorState {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unknown, Self::Value)
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// The host device a sensor belongs to. One device per station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// `(domain, location key)`.
    pub identifier: (String, String),
    /// Localized station name.
    pub name: String,
    /// Device manufacturer.
    pub manufacturer: String,
    /// Device model.
    pub model: String,
}

impl DeviceInfo {
    /// Creates the device of a station.
    #[must_use]
    pub fn for_location(location: &LocationKey, name: impl Into<String>) -> Self {
        Self {
            identifier: (DOMAIN.to_string(), location.to_string()),
            name: name.into(),
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
        }
    }
}

/// Capabilities a host expects from a sensor entity.
pub trait SensorEntity {
    /// Stable identifier across restarts.
    fn unique_id(&self) -> &str;

    /// Display name, without the device name.
    fn name(&self) -> &str;

    /// Current state.
    fn state(&self) -> SensorState;

    /// Native unit of measurement.
    fn unit_of_measurement(&self) -> Option<&str>;

    /// Host device class.
    fn device_class(&self) -> Option<DeviceClass>;

    /// Host state class.
    fn state_class(&self) -> StateClass;

    /// Material Design icon.
    fn icon(&self) -> &str;

    /// Whether the last refresh delivered a value for this sensor.
    fn available(&self) -> bool;

    /// Measurement time of the current state.
    fn last_updated(&self) -> Option<DateTime<Utc>>;

    /// Device grouping.
    fn device_info(&self) -> &DeviceInfo;

    /// Additional state attributes.
    fn extra_attributes(&self) -> BTreeMap<&'static str, String>;
}

/// A sensor for one series of one station.
pub struct MeetnetSensor<A> {
    coordinator: Arc<Coordinator<A>>,
    key: LocationParameterKey,
    location: LocationKey,
    parameter: ParameterKey,
    unique_id: String,
    name: String,
    unit: Option<String>,
    description: Option<&'static ParameterDescription>,
    device_info: DeviceInfo,
}

impl<A: MeetnetApi> MeetnetSensor<A> {
    /// Creates the sensor of a catalog series.
    ///
    /// Returns `None` if the series' location or parameter is not in the
    /// coordinator's catalog.
    #[must_use]
    pub fn new(
        coordinator: Arc<Coordinator<A>>,
        entry: &AvailableData,
        language: &str,
    ) -> Option<Self> {
        let catalog = coordinator.catalog();
        let location = catalog.location(&entry.location)?;
        let parameter = catalog.parameter(&entry.parameter)?;
        let description = describe(&entry.parameter);

        let name = match (parameter.name.get(language), description) {
            (Some(localized), _) => localized,
            (None, Some(d)) => d.name,
            (None, None) => parameter.display_name(language),
        }
        .to_string();
        let unit = parameter
            .unit()
            .or(description.map(|d| d.unit))
            .map(str::to_string);
        let device_info =
            DeviceInfo::for_location(&entry.location, location.display_name(language));

        Some(Self {
            unique_id: format!("{DOMAIN}_{}", entry.key),
            key: entry.key.clone(),
            location: entry.location.clone(),
            parameter: entry.parameter.clone(),
            name,
            unit,
            description,
            device_info,
            coordinator,
        })
    }

    /// Returns the series identifier.
    #[must_use]
    pub fn key(&self) -> &LocationParameterKey {
        &self.key
    }

    /// Returns the station key.
    #[must_use]
    pub fn location(&self) -> &LocationKey {
        &self.location
    }

    /// Returns the parameter key.
    #[must_use]
    pub fn parameter(&self) -> &ParameterKey {
        &self.parameter
    }

    /// Fetches the readings of this series between `start` and `end`.
    ///
    /// Gaps are returned as points without a value; nothing is
    /// interpolated.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if `start >= end`, otherwise any error of
    /// [`MeetnetApi::fetch_history`].
    pub async fn statistics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoryPoint>> {
        if start >= end {
            return Err(ValueError::InvalidTimeRange.into());
        }

        let mut series = self
            .coordinator
            .api()
            .fetch_history(std::slice::from_ref(&self.key), start, end)
            .await?;

        let points = series.remove(&self.key).map(|s| s.points).unwrap_or_default();
        tracing::debug!(key = %self.key, points = points.len(), "Loaded statistics");
        Ok(points)
    }
}

impl<A: MeetnetApi> SensorEntity for MeetnetSensor<A> {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> SensorState {
        self.coordinator
            .current_value(&self.key)
            .and_then(|current| current.value)
            .into()
    }

    fn unit_of_measurement(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn device_class(&self) -> Option<DeviceClass> {
        self.description.and_then(|d| d.device_class)
    }

    fn state_class(&self) -> StateClass {
        self.description.map(|d| d.state_class).unwrap_or_default()
    }

    fn icon(&self) -> &str {
        self.description.map_or(DEFAULT_ICON, |d| d.icon)
    }

    fn available(&self) -> bool {
        self.coordinator.is_available(&self.key)
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.coordinator
            .current_value(&self.key)
            .map(|current| current.timestamp)
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn extra_attributes(&self) -> BTreeMap<&'static str, String> {
        let mut attributes = BTreeMap::from([
            ("data_id", self.key.to_string()),
            ("location_id", self.location.to_string()),
            ("parameter_id", self.parameter.to_string()),
        ]);
        if let Some(time) = self.last_updated() {
            attributes.insert("measurement_time", format_timestamp(&time));
        }
        attributes
    }
}

impl<A> fmt::Debug for MeetnetSensor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetnetSensor")
            .field("unique_id", &self.unique_id)
            .field("name", &self.name)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

/// Creates one sensor per series polled by `coordinator`.
#[must_use]
pub fn build_sensors<A: MeetnetApi>(
    coordinator: &Arc<Coordinator<A>>,
    language: &str,
) -> Vec<MeetnetSensor<A>> {
    let catalog = coordinator.catalog();
    let sensors: Vec<_> = coordinator
        .keys()
        .iter()
        .filter_map(|key| catalog.available(key))
        .filter_map(|entry| MeetnetSensor::new(Arc::clone(coordinator), entry, language))
        .collect();

    tracing::debug!(sensors = sensors.len(), "Created sensor entities");
    sensors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricalSeries;
    use crate::error::{ApiError, Error};
    use crate::testing::{FakeApi, catalog, current, timestamp};
    use chrono::TimeDelta;
    use std::time::Duration;

    fn key(s: &str) -> LocationParameterKey {
        LocationParameterKey::new(s).unwrap()
    }

    async fn sensors(api: FakeApi, locations: &[&str]) -> Vec<MeetnetSensor<FakeApi>> {
        sensors_in(api, locations, "en").await
    }

    async fn sensors_in(
        api: FakeApi,
        locations: &[&str],
        language: &str,
    ) -> Vec<MeetnetSensor<FakeApi>> {
        let locations: Vec<_> = locations
            .iter()
            .map(|l| LocationKey::new(*l).unwrap())
            .collect();
        let coordinator = Coordinator::setup(api, &locations, Duration::from_secs(300))
            .await
            .unwrap();
        build_sensors(&Arc::new(coordinator), language)
    }

    fn find<'a, A: MeetnetApi>(sensors: &'a [MeetnetSensor<A>], id: &str) -> &'a MeetnetSensor<A> {
        sensors.iter().find(|s| s.key().as_str() == id).unwrap()
    }

    #[test]
    fn sensor_state_display() {
        assert_eq!(SensorState::Value(5.2).to_string(), "5.2");
        assert_eq!(SensorState::Unknown.to_string(), "unknown");
        assert_eq!(SensorState::from(None), SensorState::Unknown);
        assert_eq!(SensorState::from(Some(0.0)).value(), Some(0.0));
    }

    #[tokio::test]
    async fn one_sensor_per_polled_series() {
        let sensors = sensors(FakeApi::new(catalog()), &["NPT", "BVH"]).await;
        let ids: Vec<_> = sensors.iter().map(SensorEntity::unique_id).collect();
        assert_eq!(
            ids,
            vec![
                "meetnet_vlaamse_banken_NPTWVC",
                "meetnet_vlaamse_banken_NPTWRS",
                "meetnet_vlaamse_banken_BVHWC3",
                "meetnet_vlaamse_banken_BVHXYZ",
            ]
        );
    }

    #[tokio::test]
    async fn known_parameter_presentation() {
        let sensors = sensors(FakeApi::new(catalog()), &["NPT"]).await;
        let wvc = find(&sensors, "NPTWVC");

        assert_eq!(wvc.name(), "Average wind speed");
        assert_eq!(wvc.unit_of_measurement(), Some("m/s"));
        assert_eq!(wvc.device_class(), Some(DeviceClass::WindSpeed));
        assert_eq!(wvc.state_class(), StateClass::Measurement);
        assert_eq!(wvc.icon(), "mdi:weather-windy");

        let device = wvc.device_info();
        assert_eq!(device.identifier, (DOMAIN.to_string(), "NPT".to_string()));
        assert_eq!(device.name, "Nieuwpoort");
        assert_eq!(device.manufacturer, MANUFACTURER);
        assert_eq!(device.model, MODEL);
    }

    #[tokio::test]
    async fn name_follows_configured_language() {
        let sensors = sensors_in(FakeApi::new(catalog()), &["NPT", "BVH"], "nl").await;

        assert_eq!(find(&sensors, "NPTWVC").name(), "Windsnelheid");
        // No Dutch name in the catalog, so the described name is used.
        assert_eq!(find(&sensors, "BVHWC3").name(), "Wind Gust");
        assert_eq!(find(&sensors, "BVHXYZ").name(), "Saliniteit");
    }

    #[tokio::test]
    async fn undescribed_code_keeps_catalog_presentation() {
        let sensors = sensors(FakeApi::new(catalog()), &["A2B"]).await;
        let gh1 = find(&sensors, "A2BGH1");

        assert_eq!(gh1.name(), "Wave height");
        assert_eq!(gh1.unit_of_measurement(), Some("cm"));
        assert_eq!(gh1.device_class(), None);
        assert_eq!(gh1.icon(), DEFAULT_ICON);
    }

    #[tokio::test]
    async fn catalog_unit_wins_over_description() {
        let sensors = sensors(FakeApi::new(catalog()), &["NPT"]).await;
        assert_eq!(find(&sensors, "NPTWRS").unit_of_measurement(), Some("deg"));
    }

    #[tokio::test]
    async fn empty_catalog_unit_falls_back_to_description() {
        let sensors = sensors(FakeApi::new(catalog()), &["BVH"]).await;
        assert_eq!(find(&sensors, "BVHWC3").unit_of_measurement(), Some("m/s"));
    }

    #[tokio::test]
    async fn unknown_parameter_uses_catalog_name() {
        let sensors = sensors(FakeApi::new(catalog()), &["BVH"]).await;
        let xyz = find(&sensors, "BVHXYZ");

        // Only a Dutch name exists, so it is used for "en".
        assert_eq!(xyz.name(), "Saliniteit");
        assert_eq!(xyz.unit_of_measurement(), Some("PSU"));
        assert_eq!(xyz.device_class(), None);
        assert_eq!(xyz.icon(), DEFAULT_ICON);
        assert_eq!(xyz.device_info().name, "Heist buoy");
    }

    #[tokio::test]
    async fn state_follows_coordinator() {
        let api = FakeApi::new(catalog());
        api.push_current(Ok(current(&[("NPTWVC", Some(5.2)), ("NPTWRS", None)])));
        let sensors = sensors(api, &["NPT"]).await;
        let wvc = find(&sensors, "NPTWVC");
        let wrs = find(&sensors, "NPTWRS");

        assert_eq!(wvc.state(), SensorState::Unknown);
        assert!(!wvc.available());

        wvc.coordinator.refresh().await;

        assert_eq!(wvc.state(), SensorState::Value(5.2));
        assert!(wvc.available());
        assert_eq!(wvc.last_updated(), Some(timestamp()));

        assert_eq!(wrs.state(), SensorState::Unknown);
        assert_eq!(wrs.state().to_string(), "unknown");
        assert!(wrs.available());
    }

    #[tokio::test]
    async fn failed_refresh_makes_sensor_unavailable() {
        let api = FakeApi::new(catalog());
        api.push_current(Ok(current(&[("NPTWVC", Some(5.2))])));
        api.push_current(Err(ApiError::Timeout(10_000).into()));
        let sensors = sensors(api, &["NPT"]).await;
        let wvc = find(&sensors, "NPTWVC");

        wvc.coordinator.refresh().await;
        wvc.coordinator.refresh().await;

        assert!(!wvc.available());
        assert_eq!(wvc.state(), SensorState::Value(5.2));
    }

    #[tokio::test]
    async fn extra_attributes() {
        let api = FakeApi::new(catalog());
        api.push_current(Ok(current(&[("NPTWVC", Some(5.2))])));
        let sensors = sensors(api, &["NPT"]).await;
        let wvc = find(&sensors, "NPTWVC");

        let attributes = wvc.extra_attributes();
        assert_eq!(attributes["data_id"], "NPTWVC");
        assert_eq!(attributes["location_id"], "NPT");
        assert_eq!(attributes["parameter_id"], "WVC");
        assert!(!attributes.contains_key("measurement_time"));

        wvc.coordinator.refresh().await;
        assert_eq!(
            wvc.extra_attributes()["measurement_time"],
            "2024-01-15T10:00:00Z"
        );
    }

    #[tokio::test]
    async fn statistics_pass_gaps_through() {
        let start = timestamp();
        let end = start + TimeDelta::hours(1);
        let points = vec![
            HistoryPoint {
                timestamp: start,
                value: Some(4.0),
            },
            HistoryPoint {
                timestamp: start + TimeDelta::minutes(10),
                value: None,
            },
            HistoryPoint {
                timestamp: start + TimeDelta::minutes(20),
                value: Some(6.0),
            },
        ];
        let series = HistoricalSeries {
            key: key("NPTWVC"),
            from: start,
            till: end,
            min_value: Some(4.0),
            max_value: Some(6.0),
            points: points.clone(),
        };

        let api = FakeApi::new(catalog());
        api.push_history(Ok(BTreeMap::from([(key("NPTWVC"), series)])));
        let sensors = sensors(api, &["NPT"]).await;

        let result = find(&sensors, "NPTWVC").statistics(start, end).await.unwrap();
        assert_eq!(result, points);
    }

    #[tokio::test]
    async fn statistics_reject_reversed_window() {
        let sensors = sensors(FakeApi::new(catalog()), &["NPT"]).await;
        let start = timestamp();

        let err = find(&sensors, "NPTWVC")
            .statistics(start, start)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(ValueError::InvalidTimeRange)));
    }

    #[tokio::test]
    async fn statistics_for_missing_series_are_empty() {
        let sensors = sensors(FakeApi::new(catalog()), &["NPT"]).await;
        let start = timestamp();

        let points = find(&sensors, "NPTWRS")
            .statistics(start, start + TimeDelta::hours(1))
            .await
            .unwrap();
        assert!(points.is_empty());
    }
}
