//! Identity features materialized for synthetic output
//!
//! Names and addresses come from real linked records rather than being
//! invented, so the synthetic dataset reuses existing identities.

use serde::{Deserialize, Serialize};

use super::record::{CoarseType, Record};

/// PII-like fields taken from one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityFeatures {
    /// Record the fields were taken from
    pub record_id: String,
    pub name: String,
    pub address: Option<String>,
    pub country: Option<String>,
    pub coarse_type: CoarseType,
}

impl IdentityFeatures {
    /// Features of a record, if it describes a person or organization
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            record_id: record.id().to_string(),
            name: record.name().to_string(),
            address: record.address().map(str::to_string),
            country: record.country().map(str::to_string),
            coarse_type: record.record_type().coarse()?,
        })
    }

    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }
}
