// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling of current values.
//!
//! A [`Coordinator`] owns the catalog of one configured entry and the keys
//! it polls. Each refresh fetches the current values of exactly those keys
//! and publishes a [`Snapshot`], even when nothing changed.
//!
//! # Failures
//!
//! A failed refresh keeps the previous values, marks every polled key
//! stale and records the error in the snapshot. The next tick is the retry;
//! errors never escape [`Coordinator::refresh`].
//!
//! # Coalescing
//!
//! Refreshes are serialized. A caller that had to wait for an in-flight
//! refresh returns that refresh's snapshot instead of starting another.

mod snapshot;

pub use snapshot::{RefreshFailure, Snapshot};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::catalog::Catalog;
use crate::data::CurrentValue;
use crate::error::{Error, Result};
use crate::protocol::MeetnetApi;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::{LocationKey, LocationParameterKey};

/// Shortest accepted polling interval.
const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Refresh state of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Waiting for the next tick.
    Idle,
    /// A fetch is in flight.
    Refreshing,
}

/// Resets the state to idle when a refresh ends or is cancelled.
struct RefreshingGuard<'a>(&'a RwLock<CoordinatorState>);

impl<'a> RefreshingGuard<'a> {
    fn enter(state: &'a RwLock<CoordinatorState>) -> Self {
        *state.write() = CoordinatorState::Refreshing;
        Self(state)
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        *self.0.write() = CoordinatorState::Idle;
    }
}

/// Polls current values for the selected series of one entry.
pub struct Coordinator<A> {
    api: A,
    catalog: Catalog,
    keys: Vec<LocationParameterKey>,
    scan_interval: Duration,
    state: RwLock<CoordinatorState>,
    snapshot: watch::Sender<Snapshot>,
    callbacks: CallbackRegistry,
    refresh_lock: Mutex<()>,
    completed: AtomicU64,
}

impl<A: MeetnetApi> Coordinator<A> {
    /// Creates a coordinator polling `keys`.
    ///
    /// The initial snapshot is empty until the first refresh.
    #[must_use]
    pub fn new(
        api: A,
        catalog: Catalog,
        keys: Vec<LocationParameterKey>,
        scan_interval: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        Self {
            api,
            catalog,
            keys,
            scan_interval: scan_interval.max(MIN_SCAN_INTERVAL),
            state: RwLock::new(CoordinatorState::Idle),
            snapshot,
            callbacks: CallbackRegistry::new(),
            refresh_lock: Mutex::new(()),
            completed: AtomicU64::new(0),
        }
    }

    /// Fetches the catalog and polls every series of `locations`.
    ///
    /// Locations missing from the catalog are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the catalog cannot be fetched.
    pub async fn setup(
        api: A,
        locations: &[LocationKey],
        scan_interval: Duration,
    ) -> Result<Self> {
        let catalog = api.fetch_catalog().await?;

        let known: Vec<LocationKey> = locations
            .iter()
            .filter(|location| {
                let present = catalog.contains_location(location);
                if !present {
                    tracing::warn!(
                        location = %location,
                        "Selected location not in catalog, skipping"
                    );
                }
                present
            })
            .cloned()
            .collect();

        let keys: Vec<LocationParameterKey> = catalog
            .available_for_locations(&known)
            .into_iter()
            .map(|entry| entry.key.clone())
            .collect();

        tracing::debug!(
            locations = known.len(),
            series = keys.len(),
            "Coordinator set up"
        );

        Ok(Self::new(api, catalog, keys, scan_interval))
    }

    /// Returns the API used for polling.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the catalog fetched at setup.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the polled keys, in catalog order.
    #[must_use]
    pub fn keys(&self) -> &[LocationParameterKey] {
        &self.keys
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Returns the current refresh state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        *self.state.read()
    }

    /// Returns the most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Returns the latest reading of `key`, stale or not.
    #[must_use]
    pub fn current_value(&self, key: &LocationParameterKey) -> Option<CurrentValue> {
        self.snapshot.borrow().get(key).cloned()
    }

    /// Returns true if the last refresh delivered a value for `key`.
    #[must_use]
    pub fn is_available(&self, key: &LocationParameterKey) -> bool {
        self.snapshot.borrow().is_available(key)
    }

    /// Returns a receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Fetches current values and publishes the resulting snapshot.
    ///
    /// Never fails: errors are logged and recorded in the snapshot.
    pub async fn refresh(&self) -> Snapshot {
        self.refresh_inner().await.0
    }

    /// Refreshes like [`refresh`](Self::refresh), but also returns the
    /// error of a failed fetch.
    ///
    /// Used for the first refresh of an entry, where a failure aborts
    /// setup.
    ///
    /// # Errors
    ///
    /// Returns the error of the current-values request, including one made
    /// by a concurrent refresh this call joined.
    pub async fn first_refresh(&self) -> Result<Snapshot> {
        match self.refresh_inner().await {
            (snapshot, None) => Ok(snapshot),
            (_, Some(err)) => Err(err),
        }
    }

    async fn refresh_inner(&self) -> (Snapshot, Option<Error>) {
        let observed = self.completed.load(Ordering::Acquire);
        let _lock = self.refresh_lock.lock().await;

        if self.completed.load(Ordering::Acquire) != observed {
            tracing::debug!("Joined in-flight refresh");
            let snapshot = self.snapshot();
            let error = snapshot.last_error().map(Error::from);
            return (snapshot, error);
        }

        let (next, error) = {
            let _state = RefreshingGuard::enter(&self.state);
            self.fetch_snapshot().await
        };

        self.publish(&next);
        self.completed.fetch_add(1, Ordering::Release);
        (next, error)
    }

    async fn fetch_snapshot(&self) -> (Snapshot, Option<Error>) {
        match self.api.fetch_current(Some(&self.keys)).await {
            Ok(mut values) => {
                values.retain(|key, _| self.keys.contains(key));
                tracing::debug!(
                    polled = self.keys.len(),
                    received = values.len(),
                    "Refreshed current values"
                );
                (Snapshot::new(values), None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to refresh current values");
                let previous = self.snapshot.borrow().values().clone();
                let snapshot = Snapshot::new(previous)
                    .with_stale(self.keys.iter().cloned())
                    .with_failure((&err).into());
                (snapshot, Some(err))
            }
        }
    }

    fn publish(&self, snapshot: &Snapshot) {
        self.snapshot.send_replace(snapshot.clone());
        self.callbacks.dispatch(snapshot);
    }

    /// Refreshes on every tick of the scan interval until `shutdown`
    /// completes.
    ///
    /// The first tick fires one interval after the call. Ticks missed while
    /// a refresh runs are delayed rather than bunched.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.scan_interval, self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::debug!("Polling stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh().await;
                }
            }
        }
    }
}

impl<A: MeetnetApi> Subscribable for Coordinator<A> {
    fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.callbacks.on_update(callback)
    }

    fn on_refresh_failed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RefreshFailure) + Send + Sync + 'static,
    {
        self.callbacks.on_refresh_failed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

impl<A> std::fmt::Debug for Coordinator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("keys", &self.keys)
            .field("scan_interval", &self.scan_interval)
            .field("state", &*self.state.read())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}
