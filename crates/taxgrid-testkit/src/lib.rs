// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use taxgrid_app::{Country, TaxRecord};
use time::macros::{date, format_description};
use time::{Date, Duration};

const COUNTRIES: [&str; 8] = [
    "India",
    "United States",
    "Germany",
    "France",
    "Japan",
    "Brazil",
    "Canada",
    "Australia",
];

const ENTITIES: [&str; 10] = [
    "Acme Holdings",
    "Globex Corp",
    "Initech",
    "Umbrella Trading",
    "Stark Industries",
    "Wayne Enterprises",
    "Hooli",
    "Vandelay Imports",
    "Soylent Foods",
    "Tyrell Systems",
];

const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Rowan",
];

const LAST_NAMES: [&str; 9] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz",
];

const GENDERS: [&str; 5] = ["Male", "Female", "female", "MALE", "Other"];

const FIRST_REQUEST: Date = date!(2025 - 01 - 06);

/// Country reference list in the order the API returns it.
pub fn countries() -> Vec<Country> {
    COUNTRIES
        .iter()
        .enumerate()
        .map(|(index, name)| Country::new((index + 1).to_string(), name))
        .collect()
}

/// A plain record with only the fields the editor touches.
pub fn record(id: &str, name: &str, country: &str) -> TaxRecord {
    TaxRecord::new(id, name, country)
}

/// Deterministic record set shaped like the mockapi collection: request dates
/// alternate between ISO instants and pre-formatted short dates, tax amounts
/// alternate between numbers and strings, and a few rows carry a null
/// `normalizedCountry`.
pub fn records(count: usize) -> Vec<TaxRecord> {
    (0..count).map(demo_record).collect()
}

fn demo_record(index: usize) -> TaxRecord {
    let id = (index + 1).to_string();
    let name = format!(
        "{} {}",
        FIRST_NAMES[index % FIRST_NAMES.len()],
        LAST_NAMES[index % LAST_NAMES.len()]
    );
    let country = COUNTRIES[index % COUNTRIES.len()];
    let requested = FIRST_REQUEST + Duration::days(index as i64 * 3);

    let mut record = TaxRecord::new(id.as_str(), &name, country);
    record.entity = ENTITIES[index % ENTITIES.len()].to_owned();
    record.gender = GENDERS[index % GENDERS.len()].to_owned();
    record.request_date = if index % 2 == 0 {
        iso_midnight(requested)
    } else {
        short_date(requested)
    };
    record.created_at = iso_midnight(requested);

    let tax = if index % 3 == 0 {
        Value::from(format!("{}.50", 100 + index * 7))
    } else {
        Value::from(100 + index * 7)
    };
    record.attributes.insert("tax".to_owned(), tax);
    record.attributes.insert(
        "countryId".to_owned(),
        Value::from((index % COUNTRIES.len() + 1).to_string()),
    );
    let normalized = if index % 4 == 0 {
        Value::Null
    } else {
        Value::from(country.to_ascii_lowercase())
    };
    record
        .attributes
        .insert("normalizedCountry".to_owned(), normalized);
    record
}

fn iso_midnight(date: Date) -> String {
    date.format(format_description!(
        "[year]-[month]-[day]T00:00:00.000Z"
    ))
    .unwrap_or_default()
}

fn short_date(date: Date) -> String {
    date.format(format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_default()
}
