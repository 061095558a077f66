// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement data: latest readings and historical series.
//!
//! Both are ephemeral. Current values are refetched every poll cycle and
//! historical series on each statistics backfill request.

mod current;
mod history;

pub use current::{CurrentValue, parse_current};
pub use history::{HistoricalSeries, HistoryPoint, HistoryRequest, parse_history};
