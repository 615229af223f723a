// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::*;

/// One row of the taxes collection.
///
/// Only the attributes the grid and the editor look at are typed. Everything
/// else the server sends (`tax`, `countryId`, `normalizedCountry`, counters)
/// rides along in `attributes` and is written back untouched, so a `null`
/// stays `null` and an absent key stays absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub request_date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl TaxRecord {
    pub fn new(id: impl Into<RecordId>, name: &str, country: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_owned(),
            entity: String::new(),
            gender: String::new(),
            country: country.to_owned(),
            request_date: String::new(),
            created_at: String::new(),
            attributes: Map::new(),
        }
    }

    pub fn country_id(&self) -> Option<&str> {
        self.attributes.get("countryId").and_then(Value::as_str)
    }

    /// Tax amount as the server sent it; mockapi mixes numbers and strings.
    pub fn tax(&self) -> Option<&Value> {
        self.attributes.get("tax").filter(|value| !value.is_null())
    }

    pub fn normalized_country(&self) -> Option<&str> {
        self.attributes
            .get("normalizedCountry")
            .and_then(Value::as_str)
    }

    /// Shallow merge used by the editor: only `name` and `country` change.
    pub fn with_edits(&self, name: &str, country: &str) -> Self {
        Self {
            name: name.to_owned(),
            country: country.to_owned(),
            ..self.clone()
        }
    }
}

/// Reference value used for filtering and for picking a record's country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Country {
    pub fn new(id: impl Into<CountryId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_owned(),
            country: None,
        }
    }
}
