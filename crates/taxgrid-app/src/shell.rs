// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::thread;

use crate::{Country, RecordGateway, TaxRecord, TransportError};

pub const LOAD_FAILED: &str = "Failed to load data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Owner of the canonical record list.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub load: LoadState,
    pub records: Vec<TaxRecord>,
    pub countries: Vec<Country>,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            load: LoadState::Loading,
            records: Vec::new(),
            countries: Vec::new(),
        }
    }
}

impl Shell {
    /// Fetch records and countries together. Both must succeed; a failure of
    /// either leaves the lists empty and the shell in `Failed`.
    pub fn load<G: RecordGateway + Sync + ?Sized>(&mut self, gateway: &G) {
        self.load = LoadState::Loading;
        match fetch_initial(gateway) {
            Ok((records, countries)) => {
                tracing::info!(
                    records = records.len(),
                    countries = countries.len(),
                    "initial data loaded"
                );
                self.records = records;
                self.countries = countries;
                self.load = LoadState::Ready;
            }
            Err(error) => {
                tracing::error!(%error, "initial data load failed");
                self.records.clear();
                self.countries.clear();
                self.load = LoadState::Failed(LOAD_FAILED.to_owned());
            }
        }
    }

    /// Swap in the server's copy of one record, keeping list order. Returns
    /// false when no record carries that id.
    pub fn replace_record(&mut self, updated: TaxRecord) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.id == updated.id)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => {
                tracing::warn!(record = %updated.id, "saved record not in working set");
                false
            }
        }
    }
}

fn fetch_initial<G: RecordGateway + Sync + ?Sized>(
    gateway: &G,
) -> Result<(Vec<TaxRecord>, Vec<Country>), TransportError> {
    thread::scope(|scope| {
        let countries = scope.spawn(|| gateway.list_reference_values());
        let records = gateway.list_records();
        let countries = match countries.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        Ok((records?, countries?))
    })
}
