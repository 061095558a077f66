// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presentation hints for well-known parameters.

use crate::types::ParameterKey;

/// Icon used when a parameter has no description.
pub const DEFAULT_ICON: &str = "mdi:chart-line";

/// Kind of quantity a sensor measures, as understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Wind speed.
    WindSpeed,
    /// Temperature.
    Temperature,
    /// Atmospheric pressure.
    Pressure,
}

impl DeviceClass {
    /// Returns the host identifier of this class.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WindSpeed => "wind_speed",
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the host aggregates a sensor's history into statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StateClass {
    /// Instantaneous measurement; mean, min and max are tracked.
    #[default]
    Measurement,
}

impl StateClass {
    /// Returns the host identifier of this class.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
        }
    }
}

/// Display defaults for a parameter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescription {
    /// Parameter code, matched exactly.
    pub code: &'static str,
    /// English sensor name.
    pub name: &'static str,
    /// Host device class.
    pub device_class: Option<DeviceClass>,
    /// Host state class.
    pub state_class: StateClass,
    /// Unit used when the catalog gives none.
    pub unit: &'static str,
    /// Material Design icon.
    pub icon: &'static str,
}

const fn measurement(
    code: &'static str,
    name: &'static str,
    device_class: Option<DeviceClass>,
    unit: &'static str,
    icon: &'static str,
) -> ParameterDescription {
    ParameterDescription {
        code,
        name,
        device_class,
        state_class: StateClass::Measurement,
        unit,
        icon,
    }
}

/// Known parameters.
#[rustfmt::skip]
pub const PARAMETER_DESCRIPTIONS: &[ParameterDescription] = &[
    // Wind
    measurement("WVC", "Wind Speed", Some(DeviceClass::WindSpeed), "m/s", "mdi:weather-windy"),
    measurement("WRS", "Wind Direction", None, "°", "mdi:compass"),
    measurement("WC3", "Wind Gust", Some(DeviceClass::WindSpeed), "m/s", "mdi:weather-windy-variant"),
    measurement("WC1", "Wind Speed (1 min avg)", Some(DeviceClass::WindSpeed), "m/s", "mdi:weather-windy"),
    // Temperature
    measurement("WT", "Water Temperature", Some(DeviceClass::Temperature), "°C", "mdi:thermometer-water"),
    measurement("LT", "Air Temperature", Some(DeviceClass::Temperature), "°C", "mdi:thermometer"),
    // Pressure
    measurement("LP", "Air Pressure", Some(DeviceClass::Pressure), "hPa", "mdi:gauge"),
    // Water
    measurement("WL", "Water Level", None, "m", "mdi:waves"),
    measurement("GH", "Wave Height", None, "m", "mdi:wave"),
];

/// Looks up the description of a parameter.
///
/// Only an exact code match counts: `GH1` is not described by `GH`.
#[must_use]
pub fn describe(parameter: &ParameterKey) -> Option<&'static ParameterDescription> {
    PARAMETER_DESCRIPTIONS
        .iter()
        .find(|d| d.code == parameter.as_str())
}
