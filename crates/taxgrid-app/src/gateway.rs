// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{Country, RecordId, TaxRecord};

/// Failure of a single round trip to the collection API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("cannot reach {url}: {message}")]
    Network { url: String, message: String },
    #[error("decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network { .. } | Self::Decode { .. } => None,
        }
    }
}

/// The three remote calls the grid needs. Every call is one best-effort
/// request; callers own failure handling.
pub trait RecordGateway {
    fn list_records(&self) -> Result<Vec<TaxRecord>, TransportError>;
    fn list_reference_values(&self) -> Result<Vec<Country>, TransportError>;
    fn update_record(&self, id: &RecordId, record: &TaxRecord)
    -> Result<TaxRecord, TransportError>;
}

impl<G: RecordGateway + ?Sized> RecordGateway for &G {
    fn list_records(&self) -> Result<Vec<TaxRecord>, TransportError> {
        (**self).list_records()
    }

    fn list_reference_values(&self) -> Result<Vec<Country>, TransportError> {
        (**self).list_reference_values()
    }

    fn update_record(
        &self,
        id: &RecordId,
        record: &TaxRecord,
    ) -> Result<TaxRecord, TransportError> {
        (**self).update_record(id, record)
    }
}
