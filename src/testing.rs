// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::catalog::Catalog;
use crate::data::{CurrentValue, HistoricalSeries};
use crate::error::{ApiError, Error, Result, ValueError};
use crate::protocol::{ApiFactory, Credentials, MeetnetApi};
use crate::types::LocationParameterKey;

pub(crate) const CATALOG_JSON: &str = r#"{
    "Locations": [
        {
            "ID": "NPT",
            "Name": [{"Culture": "nl", "Message": "Nieuwpoort"}, {"Culture": "en", "Message": "Nieuwpoort"}],
            "PositionWKT": "POINT (2.7299 51.1524)"
        },
        {
            "ID": "A2B",
            "Name": [{"Culture": "nl", "Message": "Akkaert boei"}]
        },
        {
            "ID": "BVH",
            "Name": [{"Culture": "nl", "Message": "Bol van Heist"}, {"Culture": "en", "Message": "Heist buoy"}]
        }
    ],
    "Parameters": [
        {"ID": "WVC", "Name": [{"Culture": "nl", "Message": "Windsnelheid"}, {"Culture": "en", "Message": "Average wind speed"}], "Unit": "m/s", "ParameterTypeID": 2},
        {"ID": "WRS", "Name": [{"Culture": "en", "Message": "Wind direction"}], "Unit": "deg", "ParameterTypeID": 2},
        {"ID": "GH1", "Name": [{"Culture": "en", "Message": "Wave height"}], "Unit": "cm", "ParameterTypeID": 1},
        {"ID": "WC3", "Name": [{"Culture": "en", "Message": "Wind gust"}], "Unit": "", "ParameterTypeID": 2},
        {"ID": "XYZ", "Name": [{"Culture": "nl", "Message": "Saliniteit"}], "Unit": "PSU"}
    ],
    "ParameterTypes": [
        {"ID": 1, "SortOrder": 1, "Name": [{"Culture": "en", "Message": "Waves"}]},
        {"ID": 2, "SortOrder": 2, "Name": [{"Culture": "en", "Message": "Wind"}]}
    ],
    "AvailableData": [
        {"ID": "NPTWVC", "Location": "NPT", "Parameter": "WVC", "CurrentInterval": 10},
        {"ID": "NPTWRS", "Location": "NPT", "Parameter": "WRS", "CurrentInterval": 10},
        {"ID": "A2BGH1", "Location": "A2B", "Parameter": "GH1", "CurrentInterval": 30},
        {"ID": "BVHWC3", "Location": "BVH", "Parameter": "WC3"},
        {"ID": "BVHXYZ", "Location": "BVH", "Parameter": "XYZ"}
    ]
}"#;

pub(crate) fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).unwrap()
}

pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

pub(crate) fn current(
    values: &[(&str, Option<f64>)],
) -> BTreeMap<LocationParameterKey, CurrentValue> {
    values
        .iter()
        .map(|(id, value)| {
            let key = LocationParameterKey::new(*id).unwrap();
            let reading = CurrentValue {
                key: key.clone(),
                timestamp: timestamp(),
                value: *value,
            };
            (key, reading)
        })
        .collect()
}

type CurrentResult = Result<BTreeMap<LocationParameterKey, CurrentValue>>;
type HistoryResult = Result<BTreeMap<LocationParameterKey, HistoricalSeries>>;

/// Scripted API. Queued results are returned in order; an empty queue
/// yields empty maps.
pub(crate) struct FakeApi {
    catalog: Catalog,
    validation: Mutex<VecDeque<Result<bool>>>,
    catalog_errors: Mutex<VecDeque<Error>>,
    current: Mutex<VecDeque<CurrentResult>>,
    history: Mutex<VecDeque<HistoryResult>>,
    requested: Mutex<Vec<Option<Vec<LocationParameterKey>>>>,
    current_calls: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            validation: Mutex::new(VecDeque::new()),
            catalog_errors: Mutex::new(VecDeque::new()),
            current: Mutex::new(VecDeque::new()),
            history: Mutex::new(VecDeque::new()),
            requested: Mutex::new(Vec::new()),
            current_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn push_validation(&self, result: Result<bool>) {
        self.validation.lock().push_back(result);
    }

    pub(crate) fn push_catalog_error(&self, err: Error) {
        self.catalog_errors.lock().push_back(err);
    }

    pub(crate) fn push_current(&self, result: CurrentResult) {
        self.current.lock().push_back(result);
    }

    pub(crate) fn push_history(&self, result: HistoryResult) {
        self.history.lock().push_back(result);
    }

    pub(crate) fn requested(&self) -> Vec<Option<Vec<LocationParameterKey>>> {
        self.requested.lock().clone()
    }

    pub(crate) fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }
}

impl MeetnetApi for FakeApi {
    async fn validate_credentials(&self) -> Result<bool> {
        self.validation.lock().pop_front().unwrap_or(Ok(true))
    }

    async fn fetch_catalog(&self) -> Result<Catalog> {
        match self.catalog_errors.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(self.catalog.clone()),
        }
    }

    async fn fetch_current(
        &self,
        ids: Option<&[LocationParameterKey]>,
    ) -> CurrentResult {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(ids.map(<[_]>::to_vec));
        tokio::task::yield_now().await;
        self.current.lock().pop_front().unwrap_or_else(|| Ok(BTreeMap::new()))
    }

    async fn fetch_history(
        &self,
        _ids: &[LocationParameterKey],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HistoryResult {
        if start >= end {
            return Err(ValueError::InvalidTimeRange.into());
        }
        self.history.lock().pop_front().unwrap_or_else(|| Ok(BTreeMap::new()))
    }
}

/// Hands out fake clients that accept only `password`.
pub(crate) struct FakeFactory {
    pub(crate) password: &'static str,
    pub(crate) unreachable: bool,
    pub(crate) catalog_unreachable: bool,
}

impl FakeFactory {
    pub(crate) fn accepting(password: &'static str) -> Self {
        Self {
            password,
            unreachable: false,
            catalog_unreachable: false,
        }
    }
}

impl ApiFactory for FakeFactory {
    type Api = FakeApi;

    fn create(&self, credentials: Credentials) -> Result<FakeApi> {
        let api = FakeApi::new(catalog());
        if self.unreachable {
            api.push_validation(Err(ApiError::Timeout(10_000).into()));
        } else {
            api.push_validation(Ok(credentials.password == self.password));
        }
        if self.catalog_unreachable {
            api.push_catalog_error(ApiError::Timeout(10_000).into());
        }
        Ok(api)
    }

    fn language(&self) -> &str {
        "en"
    }
}
