// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::{Arc, Mutex, MutexGuard};
use taxgrid_app::{Country, RecordGateway, RecordId, TaxRecord, TransportError};

const RECORDS_URL: &str = "memory://taxes";
const COUNTRIES_URL: &str = "memory://countries";

pub type UpdateLog = Vec<(RecordId, TaxRecord)>;

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<TaxRecord>,
    countries: Vec<Country>,
    fail_records: usize,
    fail_countries: usize,
    fail_updates: usize,
    updates: UpdateLog,
}

/// In-process collection used by `--demo` and by tests. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new(records: Vec<TaxRecord>, countries: Vec<Country>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                records,
                countries,
                ..MemoryState::default()
            })),
        }
    }

    pub fn records(&self) -> Vec<TaxRecord> {
        self.state().records.clone()
    }

    pub fn updates(&self) -> UpdateLog {
        self.state().updates.clone()
    }

    /// Make the next `count` record listings fail with HTTP 500.
    pub fn fail_next_record_lists(&self, count: usize) {
        self.state().fail_records = count;
    }

    pub fn fail_next_country_lists(&self, count: usize) {
        self.state().fail_countries = count;
    }

    pub fn fail_next_updates(&self, count: usize) {
        self.state().fail_updates = count;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn take_failure(remaining: &mut usize, url: &str) -> Result<(), TransportError> {
    if *remaining == 0 {
        return Ok(());
    }
    *remaining -= 1;
    Err(TransportError::Status {
        url: url.to_owned(),
        status: 500,
    })
}

impl RecordGateway for MemoryGateway {
    fn list_records(&self) -> Result<Vec<TaxRecord>, TransportError> {
        let mut state = self.state();
        take_failure(&mut state.fail_records, RECORDS_URL)?;
        Ok(state.records.clone())
    }

    fn list_reference_values(&self) -> Result<Vec<Country>, TransportError> {
        let mut state = self.state();
        take_failure(&mut state.fail_countries, COUNTRIES_URL)?;
        Ok(state.countries.clone())
    }

    fn update_record(
        &self,
        id: &RecordId,
        record: &TaxRecord,
    ) -> Result<TaxRecord, TransportError> {
        let mut state = self.state();
        state.updates.push((id.clone(), record.clone()));
        let url = format!("{RECORDS_URL}/{id}");
        take_failure(&mut state.fail_updates, &url)?;

        let Some(slot) = state.records.iter_mut().find(|stored| stored.id == *id) else {
            return Err(TransportError::Status { url, status: 404 });
        };
        *slot = TaxRecord {
            id: id.clone(),
            ..record.clone()
        };
        Ok(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryGateway;
    use taxgrid_app::{Country, RecordGateway, RecordId};
    use taxgrid_testkit::record;

    fn gateway() -> MemoryGateway {
        MemoryGateway::new(
            vec![
                record("1", "Ada", "India"),
                record("2", "Bo", "Japan"),
            ],
            vec![Country::new("1", "India"), Country::new("2", "Japan")],
        )
    }

    #[test]
    fn update_replaces_stored_record_and_logs_call() -> anyhow::Result<()> {
        let gateway = gateway();
        let edited = record("2", "Bea", "India");
        let saved = gateway.update_record(&RecordId::new("2"), &edited)?;

        assert_eq!(saved, edited);
        assert_eq!(gateway.records()[1], edited);
        assert_eq!(gateway.updates().len(), 1);
        Ok(())
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let gateway = gateway();
        let error = gateway
            .update_record(&RecordId::new("9"), &record("9", "x", "y"))
            .expect_err("unknown id");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn scheduled_failures_are_consumed_in_order() -> anyhow::Result<()> {
        let gateway = gateway();
        gateway.fail_next_country_lists(1);
        assert!(gateway.list_reference_values().is_err());
        assert_eq!(gateway.list_reference_values()?.len(), 2);

        gateway.fail_next_record_lists(2);
        assert!(gateway.list_records().is_err());
        assert!(gateway.list_records().is_err());
        assert_eq!(gateway.list_records()?.len(), 2);
        Ok(())
    }

    #[test]
    fn clones_share_state() -> anyhow::Result<()> {
        let gateway = gateway();
        let clone = gateway.clone();
        clone.update_record(&RecordId::new("1"), &record("1", "Ada L.", "India"))?;
        assert_eq!(gateway.records()[0].name, "Ada L.");
        Ok(())
    }
}
