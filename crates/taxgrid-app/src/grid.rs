// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{
    Country, EditError, EditForm, GridRow, ListenerId, PointerBus, Popover, RecordGateway,
    RecordId, TaxRecord, TransportError,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Selected country names. Empty means unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryFilter {
    selected: BTreeSet<String>,
}

impl CountryFilter {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn set(&mut self, name: &str, checked: bool) {
        if checked {
            self.selected.insert(name.to_owned());
        } else {
            self.selected.remove(name);
        }
    }

    /// Flip membership and return the new checked state.
    pub fn toggle(&mut self, name: &str) -> bool {
        let checked = !self.is_selected(name);
        self.set(name, checked);
        checked
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn matches(&self, record: &TaxRecord) -> bool {
        self.selected.is_empty() || self.selected.contains(&record.country)
    }
}

pub fn filter_records<'a>(records: &'a [TaxRecord], filter: &CountryFilter) -> Vec<&'a TaxRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_index: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// A zero page size is bumped to one row per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn last_page(&self, total: usize) -> usize {
        self.page_count(total).saturating_sub(1)
    }

    /// Row range of the current page within a list of `total` rows.
    pub fn page_range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.page_index.saturating_mul(self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index < self.last_page(total)
    }

    pub fn next(&mut self, total: usize) -> bool {
        if !self.can_next(total) {
            return false;
        }
        self.page_index += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    pub fn first(&mut self) -> bool {
        let moved = self.page_index != 0;
        self.page_index = 0;
        moved
    }

    pub fn last(&mut self, total: usize) -> bool {
        let last = self.last_page(total);
        let moved = self.page_index != last;
        self.page_index = last;
        moved
    }

    /// Pull the page index back onto the last valid page.
    pub fn clamp(&mut self, total: usize) -> bool {
        let last = self.last_page(total);
        if self.page_index > last {
            self.page_index = last;
            return true;
        }
        false
    }
}

/// Checkbox panel attached to the country column header.
#[derive(Debug, Default)]
pub struct FilterPanel {
    popover: Popover,
    cursor: usize,
}

impl FilterPanel {
    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    MoveRow(isize),
    ToggleFilterPanel,
    CloseFilterPanel,
    MoveFilterCursor(isize),
    ToggleCountryAtCursor,
    ToggleCountry(String),
    ClearFilter,
    EditSelected,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    PageChanged { page: usize, pages: usize },
    PageUnchanged,
    RowSelected(usize),
    FilterPanelOpened,
    FilterPanelClosed,
    FilterChanged { selected: usize, visible: usize },
    EditRequested(TaxRecord),
    NothingToEdit,
}

impl GridEvent {
    pub fn message(&self) -> Option<String> {
        match self {
            Self::PageChanged { page, pages } => Some(format!("page {} of {}", page + 1, pages)),
            Self::PageUnchanged => Some("no more pages".to_owned()),
            Self::RowSelected(_) => None,
            Self::FilterPanelOpened => Some("country filter open".to_owned()),
            Self::FilterPanelClosed => Some("country filter closed".to_owned()),
            Self::FilterChanged { selected: 0, visible } => {
                Some(format!("filter cleared ({visible} records)"))
            }
            Self::FilterChanged { selected, visible } => Some(format!(
                "{selected} countries selected ({visible} records)"
            )),
            Self::EditRequested(record) => Some(format!("editing {}", record.name)),
            Self::NothingToEdit => Some("nothing to edit".to_owned()),
        }
    }
}

/// Filtered, paginated view over the shell's record list plus the editor it
/// opens. The grid never owns records; every call borrows the current list.
#[derive(Debug)]
pub struct RecordGrid {
    bus: PointerBus,
    filter: CountryFilter,
    pagination: Pagination,
    selected_row: usize,
    panel: FilterPanel,
    editor: EditForm,
}

impl RecordGrid {
    pub fn new(bus: PointerBus, page_size: usize) -> Self {
        Self {
            editor: EditForm::new(bus.clone()),
            bus,
            filter: CountryFilter::default(),
            pagination: Pagination::new(page_size),
            selected_row: 0,
            panel: FilterPanel::default(),
        }
    }

    pub fn filter(&self) -> &CountryFilter {
        &self.filter
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn panel(&self) -> &FilterPanel {
        &self.panel
    }

    pub fn editor(&self) -> &EditForm {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditForm {
        &mut self.editor
    }

    pub fn filtered<'a>(&self, records: &'a [TaxRecord]) -> Vec<&'a TaxRecord> {
        filter_records(records, &self.filter)
    }

    pub fn page_records<'a>(&self, records: &'a [TaxRecord]) -> Vec<&'a TaxRecord> {
        let filtered = self.filtered(records);
        let range = self.pagination.page_range(filtered.len());
        filtered[range].to_vec()
    }

    pub fn page_rows(&self, records: &[TaxRecord]) -> Vec<GridRow> {
        self.page_records(records)
            .into_iter()
            .map(GridRow::project)
            .collect()
    }

    /// Re-clamp page and cursor after the record list changed underneath.
    pub fn sync(&mut self, records: &[TaxRecord]) {
        let total = self.filtered(records).len();
        self.pagination.clamp(total);
        self.clamp_selected_row(records);
    }

    pub fn dispatch(
        &mut self,
        records: &[TaxRecord],
        countries: &[Country],
        command: GridCommand,
    ) -> Vec<GridEvent> {
        match command {
            GridCommand::NextPage => {
                let total = self.filtered(records).len();
                let moved = self.pagination.next(total);
                self.page_event(records, moved)
            }
            GridCommand::PreviousPage => {
                let moved = self.pagination.previous();
                self.page_event(records, moved)
            }
            GridCommand::FirstPage => {
                let moved = self.pagination.first();
                self.page_event(records, moved)
            }
            GridCommand::LastPage => {
                let total = self.filtered(records).len();
                let moved = self.pagination.last(total);
                self.page_event(records, moved)
            }
            GridCommand::MoveRow(delta) => {
                let rows = self.page_records(records).len();
                if rows == 0 {
                    self.selected_row = 0;
                } else {
                    let max = rows as isize - 1;
                    self.selected_row = (self.selected_row as isize + delta).clamp(0, max) as usize;
                }
                vec![GridEvent::RowSelected(self.selected_row)]
            }
            GridCommand::ToggleFilterPanel => {
                self.panel.popover.toggle(&self.bus);
                if self.panel.is_open() {
                    self.panel.cursor = self.panel.cursor.min(countries.len().saturating_sub(1));
                    vec![GridEvent::FilterPanelOpened]
                } else {
                    vec![GridEvent::FilterPanelClosed]
                }
            }
            GridCommand::CloseFilterPanel => {
                if !self.panel.is_open() {
                    return Vec::new();
                }
                self.panel.popover.close();
                vec![GridEvent::FilterPanelClosed]
            }
            GridCommand::MoveFilterCursor(delta) => {
                if countries.is_empty() {
                    self.panel.cursor = 0;
                } else {
                    let max = countries.len() as isize - 1;
                    self.panel.cursor = (self.panel.cursor as isize + delta).clamp(0, max) as usize;
                }
                Vec::new()
            }
            GridCommand::ToggleCountryAtCursor => {
                let Some(name) = countries
                    .get(self.panel.cursor)
                    .map(|country| country.name.clone())
                else {
                    return Vec::new();
                };
                self.toggle_country(records, &name)
            }
            GridCommand::ToggleCountry(name) => self.toggle_country(records, &name),
            GridCommand::ClearFilter => {
                self.filter.clear();
                self.filter_event(records)
            }
            GridCommand::EditSelected => {
                let record = self.page_records(records).get(self.selected_row).copied();
                match record {
                    Some(record) => vec![GridEvent::EditRequested(record.clone())],
                    None => vec![GridEvent::NothingToEdit],
                }
            }
            GridCommand::Edit(id) => match records.iter().find(|record| record.id == id) {
                Some(record) => vec![GridEvent::EditRequested(record.clone())],
                None => vec![GridEvent::NothingToEdit],
            },
        }
    }

    /// Open the editor on the record carrying `id`. Returns false when the
    /// id is not in `records`.
    pub fn request_edit<G: RecordGateway + ?Sized>(
        &mut self,
        records: &[TaxRecord],
        id: &RecordId,
        gateway: &G,
    ) -> bool {
        let Some(record) = records.iter().find(|record| record.id == *id) else {
            return false;
        };
        self.open_editor(record.clone(), gateway);
        true
    }

    /// Designate `record` as the editing target and show the editor.
    pub fn open_editor<G: RecordGateway + ?Sized>(&mut self, record: TaxRecord, gateway: &G) {
        self.panel.popover.close();
        self.editor.open(record, gateway);
    }

    /// Save through the gateway; `on_update` receives the server's record.
    pub fn save_edit<G: RecordGateway + ?Sized>(
        &mut self,
        gateway: &G,
        on_update: impl FnOnce(TaxRecord),
    ) -> Result<(), EditError> {
        self.editor.save(gateway, on_update)
    }

    pub fn finish_edit(
        &mut self,
        result: Result<TaxRecord, TransportError>,
        on_update: impl FnOnce(TaxRecord),
    ) -> Result<(), EditError> {
        self.editor.finish_save(result, on_update)
    }

    /// Route a pointer press to every open popover. Returns whether anything
    /// closed.
    pub fn pointer_pressed(&mut self, column: u16, row: u16) -> bool {
        let outside: Vec<ListenerId> = self.bus.dispatch(column, row);
        let panel_closed = self.panel.popover.dismiss_if_outside(&outside);
        let dropdown_closed = self.editor.dismiss_outside(&outside);
        panel_closed || dropdown_closed
    }

    fn toggle_country(&mut self, records: &[TaxRecord], name: &str) -> Vec<GridEvent> {
        self.filter.toggle(name);
        self.filter_event(records)
    }

    fn filter_event(&mut self, records: &[TaxRecord]) -> Vec<GridEvent> {
        let visible = self.filtered(records).len();
        let mut events = Vec::new();
        if self.pagination.clamp(visible) {
            events.push(GridEvent::PageChanged {
                page: self.pagination.page_index(),
                pages: self.pagination.page_count(visible),
            });
        }
        self.clamp_selected_row(records);
        events.push(GridEvent::FilterChanged {
            selected: self.filter.len(),
            visible,
        });
        events
    }

    fn page_event(&mut self, records: &[TaxRecord], moved: bool) -> Vec<GridEvent> {
        if !moved {
            return vec![GridEvent::PageUnchanged];
        }
        self.selected_row = 0;
        let total = self.filtered(records).len();
        vec![GridEvent::PageChanged {
            page: self.pagination.page_index(),
            pages: self.pagination.page_count(total),
        }]
    }

    fn clamp_selected_row(&mut self, records: &[TaxRecord]) {
        let rows = self.page_records(records).len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryFilter, GridCommand, GridEvent, Pagination, RecordGrid, filter_records};
    use crate::{Country, PointerBus, RecordGateway, RecordId, TaxRecord, TransportError};
    use std::cell::Cell;

    const COUNTRIES: [&str; 4] = ["France", "Germany", "India", "Japan"];

    fn records(count: usize) -> Vec<TaxRecord> {
        (0..count)
            .map(|index| {
                TaxRecord::new(
                    index.to_string().as_str(),
                    &format!("Customer {index}"),
                    COUNTRIES[index % COUNTRIES.len()],
                )
            })
            .collect()
    }

    fn countries() -> Vec<Country> {
        COUNTRIES
            .iter()
            .enumerate()
            .map(|(index, name)| Country::new(index.to_string().as_str(), name))
            .collect()
    }

    #[derive(Debug, Default)]
    struct EchoGateway {
        updates: Cell<usize>,
    }

    impl RecordGateway for EchoGateway {
        fn list_records(&self) -> Result<Vec<TaxRecord>, TransportError> {
            Ok(Vec::new())
        }

        fn list_reference_values(&self) -> Result<Vec<Country>, TransportError> {
            Ok(countries())
        }

        fn update_record(
            &self,
            _id: &RecordId,
            record: &TaxRecord,
        ) -> Result<TaxRecord, TransportError> {
            self.updates.set(self.updates.get() + 1);
            Ok(record.clone())
        }
    }

    #[test]
    fn request_edit_opens_a_full_copy_of_the_record() {
        let all = records(4);
        let gateway = EchoGateway::default();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);

        assert!(!grid.request_edit(&all, &RecordId::new("missing"), &gateway));
        assert!(!grid.editor().is_open());

        assert!(grid.request_edit(&all, &RecordId::new("2"), &gateway));
        assert_eq!(grid.editor().target(), Some(&all[2]));
        assert_eq!(grid.editor().countries().len(), COUNTRIES.len());
        assert_eq!(gateway.updates.get(), 0);
    }

    #[test]
    fn empty_filter_keeps_every_record() {
        let all = records(7);
        let filtered = filter_records(&all, &CountryFilter::default());
        assert_eq!(filtered.len(), all.len());
        assert!(filtered.iter().zip(&all).all(|(left, right)| *left == right));
    }

    #[test]
    fn filter_is_exact_subset_without_false_negatives() {
        let all = records(13);
        let mut filter = CountryFilter::default();
        filter.set("India", true);
        filter.set("France", true);

        let filtered = filter_records(&all, &filter);
        assert!(
            filtered
                .iter()
                .all(|record| record.country == "India" || record.country == "France")
        );
        let expected = all
            .iter()
            .filter(|record| record.country == "India" || record.country == "France")
            .count();
        assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn filter_matching_is_case_sensitive() {
        let all = vec![TaxRecord::new("1", "a", "india")];
        let mut filter = CountryFilter::default();
        filter.set("India", true);
        assert!(filter_records(&all, &filter).is_empty());
    }

    #[test]
    fn toggle_adds_and_removes_names() {
        let mut filter = CountryFilter::default();
        assert!(filter.toggle("Japan"));
        assert!(filter.is_selected("Japan"));
        assert!(!filter.toggle("Japan"));
        assert!(filter.is_empty());
    }

    #[test]
    fn page_count_is_ceiling_of_total_over_size() {
        let pagination = Pagination::new(10);
        assert_eq!(pagination.page_count(0), 0);
        assert_eq!(pagination.page_count(1), 1);
        assert_eq!(pagination.page_count(10), 1);
        assert_eq!(pagination.page_count(11), 2);
        assert_eq!(pagination.page_count(95), 10);
    }

    #[test]
    fn concatenated_pages_reproduce_the_list() {
        let all = records(23);
        let mut pagination = Pagination::new(10);
        let mut seen = Vec::new();
        loop {
            seen.extend(all[pagination.page_range(all.len())].iter().cloned());
            if !pagination.next(all.len()) {
                break;
            }
        }
        assert_eq!(pagination.page_index(), 2);
        assert_eq!(seen, all);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        assert_eq!(Pagination::new(0).page_size(), 1);
    }

    #[test]
    fn page_navigation_stops_at_edges() {
        let all = records(25);
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);

        assert_eq!(
            grid.dispatch(&all, &countries, GridCommand::PreviousPage),
            vec![GridEvent::PageUnchanged]
        );
        assert_eq!(
            grid.dispatch(&all, &countries, GridCommand::LastPage),
            vec![GridEvent::PageChanged { page: 2, pages: 3 }]
        );
        assert_eq!(
            grid.dispatch(&all, &countries, GridCommand::NextPage),
            vec![GridEvent::PageUnchanged]
        );
        assert_eq!(grid.page_rows(&all).len(), 5);
        grid.dispatch(&all, &countries, GridCommand::FirstPage);
        assert_eq!(grid.pagination().page_index(), 0);
    }

    #[test]
    fn narrowing_the_filter_clamps_to_last_valid_page() {
        let all = records(40);
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);
        grid.dispatch(&all, &countries, GridCommand::LastPage);
        assert_eq!(grid.pagination().page_index(), 3);

        let events = grid.dispatch(
            &all,
            &countries,
            GridCommand::ToggleCountry("Japan".to_owned()),
        );
        assert_eq!(
            events,
            vec![
                GridEvent::PageChanged { page: 0, pages: 1 },
                GridEvent::FilterChanged {
                    selected: 1,
                    visible: 10
                },
            ]
        );
        assert_eq!(grid.page_rows(&all).len(), 10);
        assert!(grid.page_rows(&all).iter().all(|row| row.country == "Japan"));
    }

    #[test]
    fn filter_with_no_matches_lands_on_page_zero() {
        let all = records(30);
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);
        grid.dispatch(&all, &countries, GridCommand::NextPage);
        grid.dispatch(
            &all,
            &countries,
            GridCommand::ToggleCountry("Atlantis".to_owned()),
        );
        assert_eq!(grid.pagination().page_index(), 0);
        assert!(grid.page_rows(&all).is_empty());
    }

    #[test]
    fn filter_panel_cursor_toggles_countries() {
        let bus = PointerBus::new();
        let all = records(8);
        let countries = countries();
        let mut grid = RecordGrid::new(bus.clone(), 10);

        assert_eq!(
            grid.dispatch(&all, &countries, GridCommand::ToggleFilterPanel),
            vec![GridEvent::FilterPanelOpened]
        );
        assert_eq!(bus.listener_count(), 1);

        grid.dispatch(&all, &countries, GridCommand::MoveFilterCursor(2));
        grid.dispatch(&all, &countries, GridCommand::ToggleCountryAtCursor);
        assert!(grid.filter().is_selected("India"));
        assert_eq!(grid.filtered(&all).len(), 2);

        grid.dispatch(&all, &countries, GridCommand::MoveFilterCursor(10));
        assert_eq!(grid.panel().cursor(), 3);

        grid.dispatch(&all, &countries, GridCommand::CloseFilterPanel);
        assert!(!grid.panel().is_open());
        assert_eq!(bus.listener_count(), 0);
        assert!(grid.filter().is_selected("India"));
    }

    #[test]
    fn pointer_press_outside_closes_filter_panel() {
        let all = records(3);
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);
        grid.dispatch(&all, &countries, GridCommand::ToggleFilterPanel);
        grid.panel()
            .popover()
            .set_bounds(crate::Bounds::new(40, 2, 20, 6));

        assert!(!grid.pointer_pressed(45, 3));
        assert!(grid.panel().is_open());
        assert!(grid.pointer_pressed(1, 1));
        assert!(!grid.panel().is_open());
    }

    #[test]
    fn edit_selected_carries_the_full_record() {
        let mut all = records(12);
        all[11]
            .attributes
            .insert("tax".to_owned(), serde_json::Value::from(7));
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);
        grid.dispatch(&all, &countries, GridCommand::NextPage);
        grid.dispatch(&all, &countries, GridCommand::MoveRow(5));
        assert_eq!(grid.selected_row(), 1);

        let events = grid.dispatch(&all, &countries, GridCommand::EditSelected);
        assert_eq!(events, vec![GridEvent::EditRequested(all[11].clone())]);
    }

    #[test]
    fn edit_on_empty_page_reports_nothing() {
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);
        assert_eq!(
            grid.dispatch(&[], &countries, GridCommand::EditSelected),
            vec![GridEvent::NothingToEdit]
        );
    }

    #[test]
    fn saved_record_reaches_the_update_callback_once() -> anyhow::Result<()> {
        let gateway = EchoGateway::default();
        let mut all = records(3);
        let countries = countries();
        let mut grid = RecordGrid::new(PointerBus::new(), 10);

        let events = grid.dispatch(&all, &countries, GridCommand::Edit("1".into()));
        let [GridEvent::EditRequested(record)] = events.as_slice() else {
            panic!("expected edit request, got {events:?}");
        };
        grid.open_editor(record.clone(), &gateway);
        grid.editor_mut().set_name("Renamed");

        let mut calls = 0;
        grid.save_edit(&gateway, |updated| {
            calls += 1;
            if let Some(slot) = all.iter_mut().find(|record| record.id == updated.id) {
                *slot = updated;
            }
        })?;
        grid.sync(&all);

        assert_eq!(calls, 1);
        assert_eq!(gateway.updates.get(), 1);
        assert_eq!(all[1].name, "Renamed");
        assert!(!grid.editor().is_open());
        Ok(())
    }

    #[test]
    fn opening_the_editor_closes_the_filter_panel() {
        let gateway = EchoGateway::default();
        let bus = PointerBus::new();
        let all = records(3);
        let countries = countries();
        let mut grid = RecordGrid::new(bus.clone(), 10);
        grid.dispatch(&all, &countries, GridCommand::ToggleFilterPanel);
        grid.open_editor(all[0].clone(), &gateway);
        assert!(!grid.panel().is_open());
        assert_eq!(bus.listener_count(), 0);
    }
}
