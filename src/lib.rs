// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Meetnet` Lib - A Rust library for the Meetnet Vlaamse Banken API.
//!
//! Meetnet Vlaamse Banken is the monitoring network of the Flemish banks
//! in the North Sea. Its stations publish wind, wave, temperature and water
//! level readings through an authenticated REST API. This library turns
//! those readings into sensor entities for a home-automation host.
//!
//! # Supported Features
//!
//! - **Authentication**: password grant with cached, auto-refreshed tokens
//! - **Catalog**: stations, parameters and published series, localized
//! - **Polling**: periodic current values with staleness tracking
//! - **Sensors**: one entity per series, grouped by station
//! - **Statistics**: historical readings for backfill
//! - **Setup flows**: credentials, station selection, reauth, options
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use meetnet_lib::entity::SensorEntity;
//! use meetnet_lib::protocol::MeetnetConfig;
//! use meetnet_lib::setup::EntryData;
//! use meetnet_lib::types::LocationKey;
//! use meetnet_lib::Integration;
//!
//! #[tokio::main]
//! async fn main() -> meetnet_lib::Result<()> {
//!     let entry = EntryData::new("user", "secret", vec![LocationKey::new("NPT")?]);
//!     let integration = Integration::setup(MeetnetConfig::new(), entry).await?;
//!
//!     for sensor in integration.sensors() {
//!         println!(
//!             "{} = {} {}",
//!             sensor.name(),
//!             sensor.state(),
//!             sensor.unit_of_measurement().unwrap_or("")
//!         );
//!     }
//!
//!     // Poll every five minutes for a day
//!     integration
//!         .run_until(tokio::time::sleep(Duration::from_secs(24 * 3600)))
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! # Listening for Updates
//!
//! ```no_run
//! use meetnet_lib::subscription::Subscribable;
//! # fn example(integration: &meetnet_lib::Integration) {
//! integration.coordinator().on_update(|snapshot| {
//!     println!("{} values, {} stale", snapshot.values().len(), snapshot.stale().len());
//! });
//!
//! integration.coordinator().on_refresh_failed(|failure| {
//!     if failure.requires_reauth() {
//!         println!("credentials rejected: {failure}");
//!     }
//! });
//! # }
//! ```
//!
//! # Driving the API Directly
//!
//! ```no_run
//! use meetnet_lib::protocol::{Credentials, MeetnetApi, MeetnetConfig};
//!
//! # async fn example() -> meetnet_lib::Result<()> {
//! let client = MeetnetConfig::new()
//!     .with_language("nl")
//!     .into_client(Credentials::new("user", "secret"))?;
//!
//! let catalog = client.fetch_catalog().await?;
//! for (key, name) in catalog.locations_sorted_by_name("nl") {
//!     println!("{key}: {name}");
//! }
//!
//! let current = client.fetch_current(None).await?;
//! println!("{} series", current.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod coordinator;
pub mod data;
pub mod entity;
pub mod error;
mod integration;
pub mod protocol;
pub mod setup;
pub mod subscription;
#[cfg(test)]
mod testing;
pub mod types;

pub use catalog::Catalog;
pub use coordinator::{Coordinator, CoordinatorState, RefreshFailure, Snapshot};
pub use data::{CurrentValue, HistoricalSeries, HistoryPoint};
pub use entity::{MeetnetSensor, SensorEntity, SensorState};
pub use error::{ApiError, ConfigurationError, Error, ParseError, Result, ValueError};
pub use integration::Integration;
pub use protocol::{ApiClient, Credentials, MeetnetApi, MeetnetConfig};
pub use setup::{EntryData, FlowResult, OptionsFlow, ReauthFlow, SetupFlow};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{LocalizedText, LocationKey, LocationParameterKey, ParameterKey};
