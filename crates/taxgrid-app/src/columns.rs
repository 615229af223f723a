// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{RecordId, TaxRecord};

pub const EDIT_GLYPH: &str = "✎";

// Date-only inputs tried in order after the timestamp forms.
const DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 8] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none] [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none] [year]"),
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
];

static SHORT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{3}\s+\d{1,2},\s+\d{4}$").expect("short date pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridColumn {
    Entity,
    Gender,
    RequestDate,
    Country,
    Action,
}

impl GridColumn {
    pub const ALL: [Self; 5] = [
        Self::Entity,
        Self::Gender,
        Self::RequestDate,
        Self::Country,
        Self::Action,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Entity => "Entity",
            Self::Gender => "Gender",
            Self::RequestDate => "Request date",
            Self::Country => "Country",
            Self::Action => "",
        }
    }
}

/// Badge category derived from the free-text gender field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderCategory {
    Male,
    Female,
    Other,
}

impl GenderCategory {
    pub fn from_gender(gender: &str) -> Self {
        if gender.eq_ignore_ascii_case("male") {
            Self::Male
        } else if gender.eq_ignore_ascii_case("female") {
            Self::Female
        } else {
            Self::Other
        }
    }

    /// Badge color as an RGB triple.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Male => (0xec, 0x48, 0x99),
            Self::Female => (0x93, 0xc5, 0xfd),
            Self::Other => (0x9c, 0xa3, 0xaf),
        }
    }
}

/// Render a stored request date as `Jun 16, 2025`.
///
/// Strings already in that shape pass through untouched, as does anything
/// that does not parse as a calendar date. Instants are reduced to their UTC
/// calendar date.
pub fn format_request_date(raw: &str) -> String {
    if raw.is_empty() || SHORT_DATE.is_match(raw) {
        return raw.to_owned();
    }

    let Some(date) = parse_calendar_date(raw.trim()) else {
        return raw.to_owned();
    };

    date.format(format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| raw.to_owned())
}

fn parse_calendar_date(raw: &str) -> Option<Date> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value.to_offset(UtcOffset::UTC).date());
    }

    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Some(value.to_offset(UtcOffset::UTC).date());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(value.date());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.date());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(raw, format).ok())
}

/// One grid row projected from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub record_id: RecordId,
    pub entity: String,
    pub gender: String,
    pub gender_category: GenderCategory,
    pub request_date: String,
    pub country: String,
}

impl GridRow {
    pub fn project(record: &TaxRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            entity: record.entity.clone(),
            gender: record.gender.clone(),
            gender_category: GenderCategory::from_gender(&record.gender),
            request_date: format_request_date(&record.request_date),
            country: record.country.clone(),
        }
    }

    pub fn cell(&self, column: GridColumn) -> &str {
        match column {
            GridColumn::Entity => &self.entity,
            GridColumn::Gender => &self.gender,
            GridColumn::RequestDate => &self.request_date,
            GridColumn::Country => &self.country,
            GridColumn::Action => EDIT_GLYPH,
        }
    }
}
