// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types for stations, measured quantities and series.
//!
//! The API identifies a station with a 3-character [`LocationKey`] (e.g.
//! `NPT`), a measured quantity with a 3-character [`ParameterKey`] (e.g.
//! `WVC`), and one measurable series at one station with the 6-character
//! [`LocationParameterKey`] formed by concatenating the two (`NPTWVC`).
//!
//! All keys are validated at construction: exact length and ASCII
//! alphanumeric characters only.
//!
//! # Examples
//!
//! ```
//! use meetnet_lib::types::{LocationKey, LocationParameterKey, ParameterKey};
//!
//! let location = LocationKey::new("NPT").unwrap();
//! let parameter = ParameterKey::new("WVC").unwrap();
//! let key = LocationParameterKey::from_parts(&location, &parameter);
//!
//! assert_eq!(key.as_str(), "NPTWVC");
//! assert_eq!(key.location(), location);
//! assert_eq!(key.parameter(), parameter);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

fn validate(value: &str, expected: usize) -> Result<(), ValueError> {
    let actual = value.chars().count();
    if actual != expected {
        return Err(ValueError::InvalidKeyLength { expected, actual });
    }
    match value.chars().find(|c| !c.is_ascii_alphanumeric()) {
        Some(c) => Err(ValueError::InvalidKeyCharacter(c)),
        None => Ok(()),
    }
}

macro_rules! short_key {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Number of characters in this key.
            pub const LEN: usize = $len;

            /// Creates a key after validating length and charset.
            ///
            /// # Errors
            ///
            /// Returns `ValueError` if the value is not exactly
            #[doc = concat!(stringify!($len), " ASCII alphanumeric characters.")]
            pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
                let value = value.into();
                validate(&value, Self::LEN)?;
                Ok(Self(value))
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

short_key!(
    /// Identifier of a monitoring station, e.g. `NPT`.
    LocationKey,
    3
);

short_key!(
    /// Identifier of a measured quantity, e.g. `WVC` (wind speed).
    ParameterKey,
    3
);

short_key!(
    /// Identifier of one series at one station, e.g. `NPTWVC`.
    ///
    /// Always the concatenation of a [`LocationKey`] and a [`ParameterKey`].
    LocationParameterKey,
    6
);

impl LocationParameterKey {
    /// Builds the composite key for a location and parameter.
    #[must_use]
    pub fn from_parts(location: &LocationKey, parameter: &ParameterKey) -> Self {
        Self(format!("{}{}", location.as_str(), parameter.as_str()))
    }

    /// Returns the station part of the key.
    #[must_use]
    pub fn location(&self) -> LocationKey {
        LocationKey(self.0[..LocationKey::LEN].to_string())
    }

    /// Returns the quantity part of the key.
    #[must_use]
    pub fn parameter(&self) -> ParameterKey {
        ParameterKey(self.0[LocationKey::LEN..].to_string())
    }

    /// Returns true if this series belongs to the given station.
    #[must_use]
    pub fn belongs_to(&self, location: &LocationKey) -> bool {
        self.0.starts_with(location.as_str())
    }
}
