// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping of polled series to host sensor entities.
//!
//! Each polled series becomes one [`MeetnetSensor`]. Sensors of the same
//! station share a [`DeviceInfo`], so the host groups them under one
//! device. Well-known parameters get a name, device class and icon from
//! [`PARAMETER_DESCRIPTIONS`]; the catalog unit is preferred when it is
//! not empty.

mod description;
mod sensor;

pub use description::{
    DEFAULT_ICON, DeviceClass, PARAMETER_DESCRIPTIONS, ParameterDescription, StateClass, describe,
};
pub use sensor::{
    DOMAIN, DeviceInfo, MANUFACTURER, MODEL, MeetnetSensor, SensorEntity, SensorState,
    build_sensors,
};
