//! Transaction model
//!
//! Represents one synthetic fund transfer between two entities.
//! Each transaction has:
//! - Payer and beneficiary (id, name, country)
//! - Amount (i64 cents)
//! - Timestamp (only the date is exported)
//! - Fraud flag (internal, stripped on export)
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One side of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Graph node id (entity id)
    pub id: String,

    /// Name materialized from a linked record
    pub name: String,

    pub country: Option<String>,
}

/// A generated transfer
///
/// Immutable once created.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use kleptosyn_core::{Party, TransactionRecord};
/// use uuid::Uuid;
///
/// let ts = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let payer = Party { id: "sz_1".into(), name: "Acme".into(), country: Some("GB".into()) };
/// let benef = Party { id: "sz_2".into(), name: "Bolt".into(), country: None };
///
/// let tx = TransactionRecord::new(Uuid::nil(), payer, benef, 12_345, ts, true);
/// assert_eq!(tx.amount(), 12_345);
/// assert!(tx.is_fraud());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    id: Uuid,
    payer: Party,
    beneficiary: Party,

    /// Amount in cents
    amount: i64,

    timestamp: NaiveDateTime,
    fraud: bool,
}

impl TransactionRecord {
    /// Create a transaction record
    ///
    /// # Panics
    /// Panics if amount <= 0
    pub fn new(
        id: Uuid,
        payer: Party,
        beneficiary: Party,
        amount: i64,
        timestamp: NaiveDateTime,
        fraud: bool,
    ) -> Self {
        assert!(amount > 0, "amount must be positive");

        Self {
            id,
            payer,
            beneficiary,
            amount,
            timestamp,
            fraud,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payer(&self) -> &Party {
        &self.payer
    }

    pub fn beneficiary(&self) -> &Party {
        &self.beneficiary
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_fraud(&self) -> bool {
        self.fraud
    }
}

/// Render cents as a decimal string with exactly two places
///
/// # Example
/// ```
/// use kleptosyn_core::models::transaction::format_cents;
///
/// assert_eq!(format_cents(1_963_890), "19638.90");
/// assert_eq!(format_cents(5), "0.05");
/// ```
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Round a currency value to whole cents
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}
