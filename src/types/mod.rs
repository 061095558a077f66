// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! # Types
//!
//! - [`LocationKey`] - 3-character station identifier
//! - [`ParameterKey`] - 3-character measured-quantity identifier
//! - [`LocationParameterKey`] - 6-character series identifier
//! - [`LocalizedText`] - Non-empty culture/message list
//! - [`parse_timestamp`] - Tolerant UTC timestamp parsing

pub(crate) mod datetime;
mod keys;
mod localized;

pub use datetime::{format_timestamp, parse_timestamp};
pub use keys::{LocationKey, LocationParameterKey, ParameterKey};
pub use localized::{
    DEFAULT_LANGUAGE, EmptyMessageList, FALLBACK_LANGUAGE, LocalizedText, Message,
    extract_message,
};
