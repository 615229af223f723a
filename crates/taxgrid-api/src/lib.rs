// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod memory;

pub use memory::{MemoryGateway, UpdateLog};

use anyhow::{Context, Result, bail};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use taxgrid_app::{Country, RecordGateway, RecordId, TaxRecord, TransportError};
use url::Url;

pub const DEFAULT_RECORDS_URL: &str = "https://685013d7e7c42cfd17974a33.mockapi.io/taxes";
pub const DEFAULT_COUNTRIES_URL: &str = "https://685013d7e7c42cfd17974a33.mockapi.io/countries";

/// Gateway over a mockapi-style REST collection.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    records_url: Url,
    countries_url: Url,
    timeout: Option<Duration>,
    http: HttpClient,
}

impl HttpGateway {
    /// `timeout` of `None` waits for the server indefinitely.
    pub fn new(records_url: &str, countries_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let records_url = parse_collection_url("api.records_url", records_url)?;
        let countries_url = parse_collection_url("api.countries_url", countries_url)?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            records_url,
            countries_url,
            timeout,
            http,
        })
    }

    pub fn records_url(&self) -> &str {
        self.records_url.as_str()
    }

    pub fn countries_url(&self) -> &str {
        self.countries_url.as_str()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `GET <records_url>/<id>`. Only used to probe the API from `--check`.
    pub fn fetch_record(&self, id: &RecordId) -> Result<TaxRecord, TransportError> {
        let url = self.record_url(id);
        self.execute(self.http.get(url.as_str()), &url)
    }

    fn record_url(&self, id: &RecordId) -> Url {
        let mut url = self.records_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }

    fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, TransportError> {
        tracing::debug!(%url, "sending request");
        let response = request.send().map_err(|error| {
            tracing::warn!(%url, %error, "request failed");
            TransportError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "non-success response");
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().map_err(|error| {
            tracing::warn!(%url, %error, "undecodable response");
            TransportError::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        })
    }
}

impl RecordGateway for HttpGateway {
    fn list_records(&self) -> Result<Vec<TaxRecord>, TransportError> {
        self.execute(self.http.get(self.records_url.as_str()), &self.records_url)
    }

    fn list_reference_values(&self) -> Result<Vec<Country>, TransportError> {
        self.execute(
            self.http.get(self.countries_url.as_str()),
            &self.countries_url,
        )
    }

    fn update_record(
        &self,
        id: &RecordId,
        record: &TaxRecord,
    ) -> Result<TaxRecord, TransportError> {
        let url = self.record_url(id);
        self.execute(self.http.put(url.as_str()).json(record), &url)
    }
}

/// Parse a collection endpoint; `key` names the config field in errors.
pub fn parse_collection_url(key: &str, raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("{key} must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("{key} {raw:?} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "{key} {raw:?} must use http or https, got {:?}",
            url.scheme()
        );
    }
    if url.cannot_be_a_base() {
        bail!("{key} {raw:?} cannot carry a record path");
    }
    Ok(url)
}
