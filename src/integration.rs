// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wiring of one configured entry.
//!
//! [`Integration::setup`] turns stored [`EntryData`] into a running
//! client, coordinator and sensor set. After a reauth or options flow the
//! host calls [`Integration::reload`] with the updated data.

use std::future::Future;
use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::entity::{MeetnetSensor, build_sensors};
use crate::error::Result;
use crate::protocol::{ApiClient, MeetnetConfig};
use crate::setup::{EntryData, OptionsFlow, ReauthFlow};

/// A set-up entry.
#[derive(Debug)]
pub struct Integration {
    config: MeetnetConfig,
    entry: EntryData,
    coordinator: Arc<Coordinator<ApiClient>>,
    sensors: Vec<MeetnetSensor<ApiClient>>,
}

impl Integration {
    /// Sets up an entry: fetches the catalog, performs the first refresh
    /// and creates the sensors.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be built, the catalog cannot be
    /// fetched or the first refresh fails. An `Error::Authentication`
    /// means the host should start a [`ReauthFlow`].
    pub async fn setup(config: MeetnetConfig, entry: EntryData) -> Result<Self> {
        let client = config.clone().into_client(entry.credentials())?;
        let coordinator =
            Coordinator::setup(client, &entry.locations, config.scan_interval()).await?;
        coordinator.first_refresh().await?;

        let coordinator = Arc::new(coordinator);
        let sensors = build_sensors(&coordinator, config.language());

        tracing::info!(
            username = %entry.username,
            sensors = sensors.len(),
            "Entry set up"
        );

        Ok(Self {
            config,
            entry,
            coordinator,
            sensors,
        })
    }

    /// Tears the entry down and sets it up again with `entry`.
    ///
    /// # Errors
    ///
    /// Same as [`setup`](Self::setup).
    pub async fn reload(self, entry: EntryData) -> Result<Self> {
        tracing::debug!(username = %entry.username, "Reloading entry");
        let Self { config, .. } = self;
        Self::setup(config, entry).await
    }

    /// Returns the stored entry data.
    #[must_use]
    pub fn entry(&self) -> &EntryData {
        &self.entry
    }

    /// Returns the API configuration.
    #[must_use]
    pub fn config(&self) -> &MeetnetConfig {
        &self.config
    }

    /// Returns the coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<Coordinator<ApiClient>> {
        &self.coordinator
    }

    /// Returns the sensors of this entry.
    #[must_use]
    pub fn sensors(&self) -> &[MeetnetSensor<ApiClient>] {
        &self.sensors
    }

    /// Starts an options flow using this entry's client.
    #[must_use]
    pub fn options_flow(&self) -> OptionsFlow<'_, ApiClient> {
        OptionsFlow::new(
            self.coordinator.api(),
            self.entry.clone(),
            self.config.language(),
        )
    }

    /// Starts a reauthentication flow for this entry.
    #[must_use]
    pub fn reauth_flow(&self) -> ReauthFlow<MeetnetConfig> {
        ReauthFlow::new(self.config.clone(), self.entry.clone())
    }

    /// Polls on the configured interval until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.coordinator.run_until(shutdown).await;
    }
}
