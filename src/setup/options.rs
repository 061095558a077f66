// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconfiguration of the selected stations.

use crate::catalog::Catalog;
use crate::protocol::MeetnetApi;

use super::{
    AbortReason, EntryData, FlowError, FlowResult, Form, StepId, location_options,
    validate_selection,
};

/// Changes the stations of a configured entry.
///
/// Uses the running entry's client; the catalog is fetched fresh so newly
/// published stations can be selected.
#[derive(Debug)]
pub struct OptionsFlow<'a, A> {
    api: &'a A,
    entry: EntryData,
    language: String,
    catalog: Option<Catalog>,
}

impl<'a, A: MeetnetApi> OptionsFlow<'a, A> {
    /// Creates a flow for `entry`.
    #[must_use]
    pub fn new(api: &'a A, entry: EntryData, language: impl Into<String>) -> Self {
        Self {
            api,
            entry,
            language: language.into(),
            catalog: None,
        }
    }

    /// Loads the catalog and returns the selection form, preselecting the
    /// entry's current stations.
    pub async fn start(&mut self) -> FlowResult {
        if !self.load_catalog().await {
            return FlowResult::Abort(AbortReason::CannotConnect);
        }
        FlowResult::Form(self.form(None))
    }

    /// Handles the selection form.
    pub async fn submit<S: AsRef<str>>(&mut self, selected: &[S]) -> FlowResult {
        if !self.load_catalog().await {
            return FlowResult::Abort(AbortReason::CannotConnect);
        }
        let Some(catalog) = &self.catalog else {
            return FlowResult::Abort(AbortReason::CannotConnect);
        };

        match validate_selection(catalog, selected) {
            Ok(locations) => {
                tracing::debug!(locations = locations.len(), "Selection updated");
                let mut data = self.entry.clone();
                data.locations = locations;
                FlowResult::UpdateEntry { data, reason: None }
            }
            Err(err) => FlowResult::Form(self.form(Some(FlowError::from(&err)))),
        }
    }

    /// Fetches the catalog once. Returns false if it is unavailable.
    async fn load_catalog(&mut self) -> bool {
        if self.catalog.is_none() {
            match self.api.fetch_catalog().await {
                Ok(catalog) => self.catalog = Some(catalog),
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to fetch catalog for options");
                    return false;
                }
            }
        }
        true
    }

    fn form(&self, error: Option<FlowError>) -> Form {
        let locations = self
            .catalog
            .as_ref()
            .map(|catalog| location_options(catalog, &self.language))
            .unwrap_or_default();
        Form {
            step: StepId::Init,
            error,
            locations,
            selected: self.entry.locations.clone(),
        }
    }
}
