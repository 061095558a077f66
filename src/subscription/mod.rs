// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener registration for coordinator snapshots.
//!
//! Every refresh publishes a [`Snapshot`](crate::coordinator::Snapshot).
//! Callbacks registered through [`Subscribable`] receive it synchronously;
//! hosts that prefer polling can use
//! [`Coordinator::subscribe`](crate::coordinator::Coordinator::subscribe)
//! for a `tokio::sync::watch` receiver instead.
//!
//! ```no_run
//! use meetnet_lib::subscription::Subscribable;
//! # fn example(coordinator: &meetnet_lib::Coordinator<meetnet_lib::ApiClient>) {
//! let id = coordinator.on_update(|snapshot| {
//!     println!("{} values", snapshot.values().len());
//! });
//!
//! coordinator.unsubscribe(id);
//! # }
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};

use crate::coordinator::{RefreshFailure, Snapshot};

/// Types that publish snapshots to registered callbacks.
pub trait Subscribable {
    /// Subscribes to every published snapshot, successful or not.
    fn on_update<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static;

    /// Subscribes to refresh failures.
    fn on_refresh_failed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&RefreshFailure) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
