//! Synthesized dataset accumulator
//!
//! Collects generated transactions and the identities materialized for
//! them. `export()` produces the rows handed to a tabular serializer:
//!
//! - transactions lose their internal fraud flag
//! - identities are deduplicated on all fields and sorted by name
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::transaction::format_cents;
use crate::models::{CoarseType, IdentityFeatures, TransactionRecord};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Exported transaction row (no fraud flag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub payer: String,
    pub payer_country: Option<String>,
    pub benef: String,
    pub benef_country: Option<String>,

    #[serde(serialize_with = "serialize_cents")]
    pub amount: i64,

    pub date: NaiveDate,
}

impl From<&TransactionRecord> for TransactionRow {
    fn from(tx: &TransactionRecord) -> Self {
        TransactionRow {
            payer: tx.payer().name.clone(),
            payer_country: tx.payer().country.clone(),
            benef: tx.beneficiary().name.clone(),
            benef_country: tx.beneficiary().country.clone(),
            amount: tx.amount(),
            date: tx.date(),
        }
    }
}

/// Exported identity row
///
/// Field order drives the sort: name, then address, then type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EntityRow {
    pub name: String,
    pub addr: Option<String>,

    #[serde(rename = "type")]
    pub kind: CoarseType,
}

impl From<&IdentityFeatures> for EntityRow {
    fn from(features: &IdentityFeatures) -> Self {
        EntityRow {
            name: features.name.clone(),
            addr: features.address.clone(),
            kind: features.coarse_type,
        }
    }
}

/// Rows ready for serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetExport {
    pub transactions: Vec<TransactionRow>,
    pub entities: Vec<EntityRow>,
}

/// Accumulated synthetic data: people, companies, transactions
#[derive(Debug, Clone, Default)]
pub struct SynthesizedDataset {
    transactions: Vec<TransactionRecord>,
    entities: Vec<IdentityFeatures>,
}

impl SynthesizedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction to the results
    pub fn add_transaction(&mut self, tx: TransactionRecord) {
        self.transactions.push(tx);
    }

    /// Add a materialized identity to the results
    pub fn add_entity(&mut self, features: IdentityFeatures) {
        self.entities.push(features);
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn entities(&self) -> &[IdentityFeatures] {
        &self.entities
    }

    pub fn num_fraud(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_fraud()).count()
    }

    pub fn num_legit(&self) -> usize {
        self.transactions.len() - self.num_fraud()
    }

    /// Total flagged fraud volume (cents)
    pub fn fraud_total(&self) -> i64 {
        self.transactions
            .iter()
            .filter(|tx| tx.is_fraud())
            .map(TransactionRecord::amount)
            .sum()
    }

    /// Total decoy volume (cents)
    pub fn legit_total(&self) -> i64 {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_fraud())
            .map(TransactionRecord::amount)
            .sum()
    }

    /// Build the export rows
    pub fn export(&self) -> DatasetExport {
        let transactions = self.transactions.iter().map(TransactionRow::from).collect();

        let mut entities: Vec<EntityRow> = self.entities.iter().map(EntityRow::from).collect();
        entities.sort();
        entities.dedup();

        DatasetExport { transactions, entities }
    }
}

fn serialize_cents<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_cents(*cents))
}
