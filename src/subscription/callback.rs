// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback storage for coordinator listeners.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry that stores and dispatches callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::coordinator::{RefreshFailure, Snapshot};

/// Unique identifier for a subscription.
///
/// Returned when registering a callback and used to remove it again. IDs
/// are unique for the lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type UpdateCallback = Arc<dyn Fn(&Snapshot) + Send + Sync>;

type FailureCallback = Arc<dyn Fn(&RefreshFailure) + Send + Sync>;

/// Registry of snapshot listeners.
///
/// Callbacks are invoked synchronously, in no particular order, after the
/// registry lock has been released, so a callback may register or remove
/// other callbacks.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    update_callbacks: RwLock<HashMap<SubscriptionId, UpdateCallback>>,
    failure_callbacks: RwLock<HashMap<SubscriptionId, FailureCallback>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            update_callbacks: RwLock::new(HashMap::new()),
            failure_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a callback invoked with every published snapshot.
    pub fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.update_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback invoked when a refresh fails.
    pub fn on_refresh_failed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RefreshFailure) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.failure_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Removes a callback.
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.update_callbacks.write().remove(&id).is_some()
            || self.failure_callbacks.write().remove(&id).is_some()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.update_callbacks.write().clear();
        self.failure_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Hands a snapshot to every update callback, and its failure to every
    /// failure callback.
    pub fn dispatch(&self, snapshot: &Snapshot) {
        let updates: Vec<UpdateCallback> =
            self.update_callbacks.read().values().cloned().collect();
        for callback in updates {
            callback(snapshot);
        }

        if let Some(failure) = snapshot.last_error() {
            let failures: Vec<FailureCallback> =
                self.failure_callbacks.read().values().cloned().collect();
            for callback in failures {
                callback(failure);
            }
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.update_callbacks.read().len() + self.failure_callbacks.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
