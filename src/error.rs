// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `meetnet_lib` library.
//!
//! The hierarchy mirrors how failures are surfaced to a host:
//!
//! - [`Error::Authentication`] blocks setup and reauthentication flows.
//! - [`Error::Api`] covers transport failures, non-2xx answers and malformed
//!   payloads. During polling these are logged and recorded, never raised.
//! - [`Error::Configuration`] is only produced while validating a setup or
//!   reconfigure selection.
//! - [`Error::Value`] rejects invalid identifiers and arguments.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials were rejected, or the API kept answering 401 after a
    /// fresh token was obtained.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Error occurred while talking to the API or decoding its answer.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The stored selection does not match the catalog.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

impl Error {
    /// Returns true for authentication failures.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns true for transient API failures (network, status, payload).
    #[must_use]
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Api(ApiError::Payload(err))
    }
}

/// Errors related to HTTP communication with the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} - {reason}")]
    Status {
        /// The numeric status code.
        status: u16,
        /// The canonical reason phrase.
        reason: String,
    },

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The configured base URL is not usable.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The response body could not be decoded.
    #[error("malformed payload: {0}")]
    Payload(#[from] ParseError),

    /// A concurrent refresh this caller waited on failed.
    #[error("shared refresh failed: {0}")]
    SharedRefresh(String),
}

/// Errors related to decoding API payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A localized text array contained no entries.
    #[error("empty message list for {0}")]
    EmptyMessageList(String),

    /// An identifier in the payload is not a valid key.
    #[error("invalid key '{key}': {source}")]
    InvalidKey {
        /// The offending identifier.
        key: String,
        /// Why it was rejected.
        source: ValueError,
    },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An available-data entry points at a location or parameter that the
    /// catalog does not define.
    #[error("available data {entry} references unknown {kind} {key}")]
    DanglingReference {
        /// The available-data identifier.
        entry: String,
        /// `"location"` or `"parameter"`.
        kind: &'static str,
        /// The missing key.
        key: String,
    },

    /// An available-data identifier is not the concatenation of its parts.
    #[error("available data {entry} does not match {location}{parameter}")]
    KeyMismatch {
        /// The available-data identifier.
        entry: String,
        /// The referenced location.
        location: String,
        /// The referenced parameter.
        parameter: String,
    },

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors raised while validating a setup or reconfigure selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No location was selected.
    #[error("no locations selected")]
    NoLocationsSelected,

    /// A selected location is not present in the catalog.
    #[error("location {0} is not present in the catalog")]
    UnknownLocation(String),

    /// A selected location identifier is not a valid key.
    #[error("invalid location identifier '{0}'")]
    InvalidLocation(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A key has the wrong number of characters.
    #[error("expected {expected} characters, got {actual}")]
    InvalidKeyLength {
        /// Required length.
        expected: usize,
        /// Length that was provided.
        actual: usize,
    },

    /// A key contains a character that is not ASCII alphanumeric.
    #[error("invalid character {0:?}")]
    InvalidKeyCharacter(char),

    /// A time window is empty or reversed.
    #[error("time range start must be before end")]
    InvalidTimeRange,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
