//! Record model
//!
//! A record is one raw, unresolved row from an upstream source (a sanctions
//! list entry, an ownership registry entry). Records are created once at
//! load time and never change afterwards.
//!
//! # Critical Invariants
//!
//! 1. Every record has a non-empty name (`"-"` counts as missing)
//! 2. A country, if present, is an uppercase two-letter code

use crate::text::is_country_code;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Data-quality failures when constructing a record
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Record id must not be empty")]
    EmptyId,

    #[error("Record {record_id} has no usable name")]
    MissingName { record_id: String },

    #[error("Record {record_id} has malformed country code {country:?}")]
    InvalidCountry { record_id: String, country: String },

    #[error("Duplicate record id {0}")]
    DuplicateId(String),

    #[error("Unknown record type {0:?}")]
    UnknownRecordType(String),
}

/// Kind of real-world thing a record describes
///
/// Graph exports use the FollowTheMoney class names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Person,
    Organization,
    Transaction,
}

impl RecordType {
    /// Parse an upstream record type (case-insensitive)
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "organization" => Ok(Self::Organization),
            "transaction" => Ok(Self::Transaction),
            _ => Err(RecordError::UnknownRecordType(raw.to_string())),
        }
    }

    /// FollowTheMoney class name (`ftm:Person`, `ftm:Company`, `ftm:Payment`)
    pub fn ftm_class(&self) -> &'static str {
        match self {
            Self::Person => "ftm:Person",
            Self::Organization => "ftm:Company",
            Self::Transaction => "ftm:Payment",
        }
    }

    /// Inverse of [`RecordType::ftm_class`]
    pub fn from_ftm_class(class: &str) -> Option<Self> {
        match class {
            "ftm:Person" => Some(Self::Person),
            "ftm:Company" => Some(Self::Organization),
            "ftm:Payment" => Some(Self::Transaction),
            _ => None,
        }
    }

    /// Identity type used in the entity table; payments have none
    pub fn coarse(&self) -> Option<CoarseType> {
        match self {
            Self::Person => Some(CoarseType::Person),
            Self::Organization => Some(CoarseType::Organization),
            Self::Transaction => None,
        }
    }
}

/// Coarse identity type exported with synthetic identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarseType {
    Person,
    Organization,
}

/// A normalized upstream record
///
/// # Example
/// ```
/// use kleptosyn_core::{Record, RecordType};
///
/// let rec = Record::new(
///     "os-1".to_string(),
///     RecordType::Person,
///     "Ivan Petrov".to_string(),
///     None,
///     Some("RU".to_string()),
/// ).unwrap();
///
/// assert_eq!(rec.name(), "Ivan Petrov");
/// assert_eq!(rec.country(), Some("RU"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: String,
    record_type: RecordType,
    name: String,
    address: Option<String>,
    country: Option<String>,
}

impl Record {
    /// Create a record, enforcing the data-quality rules
    ///
    /// A missing name is fatal for the batch: synthetic data should not be
    /// generated from malformed inputs.
    pub fn new(
        id: String,
        record_type: RecordType,
        name: String,
        address: Option<String>,
        country: Option<String>,
    ) -> Result<Self, RecordError> {
        if id.trim().is_empty() {
            return Err(RecordError::EmptyId);
        }

        let name = name.trim().to_string();
        if name.is_empty() || name == "-" {
            return Err(RecordError::MissingName { record_id: id });
        }

        if let Some(code) = &country {
            if !is_country_code(code) {
                return Err(RecordError::InvalidCountry {
                    record_id: id,
                    country: code.clone(),
                });
            }
        }

        let address = address.filter(|a| !a.trim().is_empty() && a.trim() != "-");

        Ok(Self {
            id,
            record_type,
            name,
            address,
            country,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_is_fatal() {
        let err = Record::new("r1".into(), RecordType::Person, " - ".into(), None, None).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingName {
                record_id: "r1".to_string()
            }
        );
    }

    #[test]
    fn test_lowercase_country_rejected() {
        let err = Record::new(
            "r1".into(),
            RecordType::Organization,
            "Acme".into(),
            None,
            Some("gb".into()),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::InvalidCountry { .. }));
    }

    #[test]
    fn test_blank_address_dropped() {
        let rec = Record::new(
            "r1".into(),
            RecordType::Organization,
            "Acme".into(),
            Some("  ".into()),
            None,
        )
        .unwrap();
        assert_eq!(rec.address(), None);
    }

    #[test]
    fn test_record_type_parse_and_ftm() {
        assert_eq!(RecordType::parse("PERSON").unwrap(), RecordType::Person);
        assert_eq!(RecordType::parse(" Organization ").unwrap(), RecordType::Organization);
        assert!(RecordType::parse("vessel").is_err());

        for ty in [RecordType::Person, RecordType::Organization, RecordType::Transaction] {
            assert_eq!(RecordType::from_ftm_class(ty.ftm_class()), Some(ty));
        }
        assert_eq!(RecordType::Transaction.coarse(), None);
    }
}
