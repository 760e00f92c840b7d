//! Tests for the synthesized dataset accumulator and its export rows

mod common;

use common::start;
use kleptosyn_core::{CoarseType, EntityRow, IdentityFeatures, Party, SynthesizedDataset, TransactionRecord};
use uuid::Uuid;

fn party(id: &str, name: &str, country: Option<&str>) -> Party {
    Party {
        id: id.to_string(),
        name: name.to_string(),
        country: country.map(str::to_string),
    }
}

fn tx(n: u128, amount: i64, fraud: bool) -> TransactionRecord {
    TransactionRecord::new(
        Uuid::from_u128(n),
        party("sz_2", "Blue Harbor Holdings Ltd", Some("CY")),
        party("sz_3", "Northgate Trading LLP", None),
        amount,
        start(),
        fraud,
    )
}

fn features(record_id: &str, name: &str, address: Option<&str>, coarse_type: CoarseType) -> IdentityFeatures {
    IdentityFeatures {
        record_id: record_id.to_string(),
        name: name.to_string(),
        address: address.map(str::to_string),
        country: None,
        coarse_type,
    }
}

#[test]
fn test_totals_split_by_fraud_flag() {
    let mut dataset = SynthesizedDataset::new();
    dataset.add_transaction(tx(1, 10_000, true));
    dataset.add_transaction(tx(2, 2_550, true));
    dataset.add_transaction(tx(3, 99, false));

    assert_eq!(dataset.num_fraud(), 2);
    assert_eq!(dataset.num_legit(), 1);
    assert_eq!(dataset.fraud_total(), 12_550);
    assert_eq!(dataset.legit_total(), 99);
}

#[test]
fn test_transaction_rows_drop_fraud_flag() {
    let mut dataset = SynthesizedDataset::new();
    dataset.add_transaction(tx(1, 9_819_450, true));

    let export = dataset.export();
    let row = &export.transactions[0];
    assert_eq!(row.payer, "Blue Harbor Holdings Ltd");
    assert_eq!(row.payer_country.as_deref(), Some("CY"));
    assert_eq!(row.benef_country, None);
    assert_eq!(row.date, start().date());

    let json = serde_json::to_value(row).unwrap();
    assert_eq!(json["amount"], "98194.50");
    assert_eq!(json["date"], "2024-03-01");
    assert!(json.get("fraud").is_none());
}

#[test]
fn test_entity_rows_sorted_and_deduplicated() {
    let mut dataset = SynthesizedDataset::new();
    dataset.add_entity(features("o2", "Northgate Trading LLP", None, CoarseType::Organization));
    dataset.add_entity(features("o1", "Blue Harbor Holdings Ltd", Some("12 Quay St"), CoarseType::Organization));
    dataset.add_entity(features("o2", "Northgate Trading LLP", None, CoarseType::Organization));
    dataset.add_entity(features("p1", "Ann Lee", None, CoarseType::Person));
    dataset.add_entity(features("p2", "Ann Lee", Some("1 Elm Rd"), CoarseType::Person));

    let export = dataset.export();
    let names: Vec<(&str, Option<&str>)> = export
        .entities
        .iter()
        .map(|row| (row.name.as_str(), row.addr.as_deref()))
        .collect();

    assert_eq!(
        names,
        vec![
            ("Ann Lee", None),
            ("Ann Lee", Some("1 Elm Rd")),
            ("Blue Harbor Holdings Ltd", Some("12 Quay St")),
            ("Northgate Trading LLP", None),
        ]
    );
    assert_eq!(dataset.entities().len(), 5);
}

#[test]
fn test_entity_row_serializes_type_field() {
    let row = EntityRow {
        name: "Ann Lee".to_string(),
        addr: None,
        kind: CoarseType::Person,
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["type"], "person");
    assert!(json["addr"].is_null());
}

#[test]
#[should_panic(expected = "amount must be positive")]
fn test_zero_amount_transaction_panics() {
    tx(1, 0, true);
}
