// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{Country, PointerBus, Popover, RecordGateway, RecordId, TaxRecord, TransportError};

pub const NAME_REQUIRED: &str = "Name is required";
pub const SAVE_FAILED: &str = "Failed to save changes";
pub const COUNTRIES_LOAD_FAILED: &str = "Failed to load countries";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{message}")]
    Validation { message: &'static str },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("no record is being edited")]
    NotOpen,
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("no save is in flight")]
    NotSaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Closed,
    Clean,
    Dirty,
    Saving,
    Error(String),
}

impl EditState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Name,
    Country,
}

/// Body of the single update call a save produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub id: RecordId,
    pub body: TaxRecord,
}

#[derive(Debug, Default)]
pub struct CountryDropdown {
    popover: Popover,
    cursor: usize,
}

impl CountryDropdown {
    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn toggle(&mut self, bus: &PointerBus) {
        self.popover.toggle(bus);
    }

    fn close(&mut self) {
        self.popover.close();
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let max = len as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }
}

/// Modal editor bound to one record at a time.
#[derive(Debug)]
pub struct EditForm {
    bus: PointerBus,
    target: Option<TaxRecord>,
    name: String,
    country: String,
    countries: Vec<Country>,
    dropdown: CountryDropdown,
    focus: EditField,
    saving: bool,
    error: Option<String>,
}

impl EditForm {
    pub fn new(bus: PointerBus) -> Self {
        Self {
            bus,
            target: None,
            name: String::new(),
            country: String::new(),
            countries: Vec::new(),
            dropdown: CountryDropdown::default(),
            focus: EditField::Name,
            saving: false,
            error: None,
        }
    }

    pub fn state(&self) -> EditState {
        let Some(target) = &self.target else {
            return EditState::Closed;
        };
        if self.saving {
            return EditState::Saving;
        }
        if let Some(error) = &self.error {
            return EditState::Error(error.clone());
        }
        if self.name != target.name || self.country != target.country {
            EditState::Dirty
        } else {
            EditState::Clean
        }
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&TaxRecord> {
        self.target.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focus(&self) -> EditField {
        self.focus
    }

    pub fn dropdown(&self) -> &CountryDropdown {
        &self.dropdown
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Open the editor on `target` and reload the country list.
    pub fn open<G: RecordGateway + ?Sized>(&mut self, target: TaxRecord, gateway: &G) {
        self.open_with(target);
        let result = gateway.list_reference_values();
        self.load_countries(result);
    }

    /// Open without touching the network; countries arrive through
    /// [`EditForm::load_countries`].
    pub fn open_with(&mut self, target: TaxRecord) {
        self.name = target.name.clone();
        self.country = target.country.clone();
        self.target = Some(target);
        self.countries.clear();
        self.dropdown = CountryDropdown::default();
        self.focus = EditField::Name;
        self.saving = false;
        self.error = None;
    }

    pub fn load_countries(&mut self, result: Result<Vec<Country>, TransportError>) {
        if self.target.is_none() {
            return;
        }
        match result {
            Ok(countries) => self.countries = countries,
            Err(error) => {
                tracing::warn!(%error, "country list reload failed");
                self.error = Some(COUNTRIES_LOAD_FAILED.to_owned());
            }
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if self.accepts_input() {
            self.name = name.into();
        }
    }

    pub fn push_name_char(&mut self, value: char) {
        if self.accepts_input() {
            self.name.push(value);
        }
    }

    pub fn pop_name_char(&mut self) {
        if self.accepts_input() {
            self.name.pop();
        }
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        if self.accepts_input() {
            self.country = country.into();
        }
    }

    pub fn cycle_focus(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.focus = match self.focus {
            EditField::Name => EditField::Country,
            EditField::Country => EditField::Name,
        };
        self.dropdown.close();
    }

    pub fn toggle_country_dropdown(&mut self) {
        if !self.accepts_input() {
            return;
        }
        self.focus = EditField::Country;
        if !self.dropdown.is_open() {
            self.dropdown.cursor = self
                .countries
                .iter()
                .position(|country| country.name == self.country)
                .unwrap_or(0);
        }
        self.dropdown.toggle(&self.bus);
    }

    pub fn close_country_dropdown(&mut self) {
        self.dropdown.close();
    }

    pub fn move_dropdown_cursor(&mut self, delta: isize) {
        self.dropdown.move_cursor(delta, self.countries.len());
    }

    /// Pick the country under the dropdown cursor. Does not save.
    pub fn select_highlighted_country(&mut self) {
        let Some(name) = self
            .countries
            .get(self.dropdown.cursor)
            .map(|country| country.name.clone())
        else {
            return;
        };
        self.select_country(name);
    }

    pub fn select_country(&mut self, name: impl Into<String>) {
        self.set_country(name);
        self.dropdown.close();
    }

    /// Close the dropdown when a pointer press landed outside it.
    pub fn dismiss_outside(&mut self, outside: &[crate::ListenerId]) -> bool {
        self.dropdown.popover.dismiss_if_outside(outside)
    }

    pub fn can_save(&self) -> bool {
        self.target.is_some() && !self.saving && !self.name.trim().is_empty()
    }

    /// Validate and enter the saving state. The returned request carries the
    /// pre-edit record with only `name` and `country` replaced.
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditError> {
        let Some(target) = &self.target else {
            return Err(EditError::NotOpen);
        };
        if self.saving {
            return Err(EditError::SaveInFlight);
        }
        let name = self.name.trim();
        if name.is_empty() {
            self.error = Some(NAME_REQUIRED.to_owned());
            return Err(EditError::Validation {
                message: NAME_REQUIRED,
            });
        }

        let request = SaveRequest {
            id: target.id.clone(),
            body: target.with_edits(name, &self.country),
        };
        self.saving = true;
        self.error = None;
        self.dropdown.close();
        Ok(request)
    }

    /// Apply the outcome of the update call. On success `on_saved` runs once
    /// with the server's record and the editor closes.
    pub fn finish_save(
        &mut self,
        result: Result<TaxRecord, TransportError>,
        on_saved: impl FnOnce(TaxRecord),
    ) -> Result<(), EditError> {
        if !self.saving {
            return Err(EditError::NotSaving);
        }
        self.saving = false;
        match result {
            Ok(record) => {
                tracing::info!(record = %record.id, "record saved");
                on_saved(record);
                self.close();
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "record save failed");
                self.error = Some(SAVE_FAILED.to_owned());
                Err(error.into())
            }
        }
    }

    pub fn save<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
        on_saved: impl FnOnce(TaxRecord),
    ) -> Result<(), EditError> {
        let request = self.begin_save()?;
        let result = gateway.update_record(&request.id, &request.body);
        self.finish_save(result, on_saved)
    }

    /// Discard local edits and close. Ignored while a save is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.target.is_none() || self.saving {
            return false;
        }
        self.close();
        true
    }

    fn close(&mut self) {
        self.target = None;
        self.name.clear();
        self.country.clear();
        self.countries.clear();
        self.dropdown = CountryDropdown::default();
        self.focus = EditField::Name;
        self.saving = false;
        self.error = None;
    }

    fn accepts_input(&self) -> bool {
        self.target.is_some() && !self.saving
    }
}
