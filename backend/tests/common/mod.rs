//! Shared fixtures for integration tests
//!
//! The scenario graph has three components:
//!
//! 1. person `sz_1` linked both ways to organizations `sz_2`, `sz_3`, `sz_4`
//!    (the only viable bad-actor pattern)
//! 2. organizations `sz_5` ↔ `sz_6` (decoy traffic pool)
//! 3. sanctioned organization `sz_7` on its own

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use kleptosyn_core::graph::{analytics, RelatedEntity, ResolvedMember};
use kleptosyn_core::{EntityGraph, Record, RecordStore, RecordType, ResolutionGroup, SimulationConfig};

pub fn record(id: &str, record_type: RecordType, name: &str, addr: Option<&str>, country: Option<&str>) -> Record {
    Record::new(
        id.to_string(),
        record_type,
        name.to_string(),
        addr.map(str::to_string),
        country.map(str::to_string),
    )
    .unwrap()
}

pub fn member(record_id: &str, desc: Option<&str>) -> ResolvedMember {
    ResolvedMember {
        record_id: record_id.to_string(),
        match_key: "+NAME+ADDRESS".to_string(),
        match_level: 1,
        description: desc.map(str::to_string),
    }
}

pub fn related(entity_id: &str) -> RelatedEntity {
    RelatedEntity {
        entity_id: entity_id.to_string(),
        match_key: "+ADDRESS".to_string(),
        match_level: 11,
    }
}

pub fn group(entity_id: &str, members: Vec<ResolvedMember>, related_ids: &[&str]) -> ResolutionGroup {
    ResolutionGroup {
        resolved_entity_id: entity_id.to_string(),
        members,
        related: related_ids.iter().map(|id| related(id)).collect(),
    }
}

pub fn scenario_store() -> RecordStore {
    RecordStore::from_records(vec![
        record("p1", RecordType::Person, "Viktor Orlov", None, Some("CY")),
        record("o1", RecordType::Organization, "Blue Harbor Holdings Ltd", Some("12 Quay St, Limassol"), Some("CY")),
        record("o2", RecordType::Organization, "Northgate Trading LLP", None, Some("GB")),
        record("o3", RecordType::Organization, "Alder Consulting SA", None, Some("CH")),
        record("o4", RecordType::Organization, "Meridian Foods GmbH", Some("Hafenstr. 4, Hamburg"), Some("DE")),
        record("o5", RecordType::Organization, "Lumen Logistics SARL", None, Some("FR")),
        record("o6", RecordType::Organization, "Volga Export OOO", None, Some("RU")),
    ])
    .unwrap()
}

pub fn scenario_groups() -> Vec<ResolutionGroup> {
    vec![
        group("1", vec![member("p1", Some("Viktor Orlov"))], &["2", "3", "4"]),
        group("2", vec![member("o1", Some("Blue Harbor Holdings"))], &["1"]),
        group("3", vec![member("o2", None)], &["1"]),
        group("4", vec![member("o3", Some("Alder Consulting"))], &["1"]),
        group("5", vec![member("o4", None)], &["6"]),
        group("6", vec![member("o5", None)], &["5"]),
        group("7", vec![member("o6", None)], &[]),
    ]
}

/// Built, repaired, and ranked scenario graph
pub fn scenario_graph() -> EntityGraph {
    let mut graph = EntityGraph::build(scenario_store(), scenario_groups()).unwrap();
    graph.repair_names();
    analytics::rank(&mut graph).unwrap();
    graph
}

/// Ranked graph with one person `sz_1` linked both ways to `num_shells`
/// organizations `sz_2 ..`
pub fn wide_pattern_graph(num_shells: usize) -> EntityGraph {
    let mut records = vec![record("p1", RecordType::Person, "Viktor Orlov", None, Some("CY"))];
    let mut groups = Vec::with_capacity(num_shells + 1);
    let mut shell_ids = Vec::with_capacity(num_shells);

    for i in 1..=num_shells {
        let record_id = format!("w{}", i);
        let entity_id = (i + 1).to_string();
        records.push(record(&record_id, RecordType::Organization, &format!("Shell {} Ltd", i), None, Some("CY")));
        groups.push(group(&entity_id, vec![member(&record_id, None)], &["1"]));
        shell_ids.push(entity_id);
    }

    let related_ids: Vec<&str> = shell_ids.iter().map(String::as_str).collect();
    groups.insert(0, group("1", vec![member("p1", None)], &related_ids));

    let store = RecordStore::from_records(records).unwrap();
    let mut graph = EntityGraph::build(store, groups).unwrap();
    graph.repair_names();
    analytics::rank(&mut graph).unwrap();
    graph
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        rng_seed: Some(seed),
        start: Some(start()),
        ..Default::default()
    }
}
