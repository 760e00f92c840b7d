//! Tests for node-link graph export and import

mod common;

use common::*;
use kleptosyn_core::graph::node_link::NodeLinkGraph;
use kleptosyn_core::graph::NodeKind;
use kleptosyn_core::{EntityGraph, GraphError, RecordStore};

#[test]
fn test_round_trip_preserves_graph() {
    let graph = scenario_graph();
    let json = graph.to_json().unwrap();
    let restored = EntityGraph::from_json(&json).unwrap();

    assert_eq!(restored.stats(), graph.stats());
    assert!(restored.is_ranked());

    let before: Vec<_> = graph.nodes().map(|n| (n.id().to_string(), n.kind(), n.name().map(str::to_string))).collect();
    let after: Vec<_> = restored.nodes().map(|n| (n.id().to_string(), n.kind(), n.name().map(str::to_string))).collect();
    assert_eq!(before, after);

    for node in graph.nodes() {
        let a = graph.rank(node.id()).unwrap();
        let b = restored.rank(node.id()).unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    assert_eq!(graph.edge_count(), restored.edge_count());
    for ((s1, t1, e1), (s2, t2, e2)) in graph.edges().zip(restored.edges()) {
        assert_eq!((s1, t1, e1.kind, &e1.why), (s2, t2, e2.kind, &e2.why));
        assert!((e1.prob - e2.prob).abs() < 1e-12);
    }

    assert_eq!(restored.record("o1").unwrap().address(), Some("12 Quay St, Limassol"));
}

#[test]
fn test_snapshot_layout() {
    let graph = scenario_graph();
    let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();

    assert_eq!(value["directed"], true);
    assert_eq!(value["multigraph"], true);
    assert_eq!(value["nodes"][0]["id"], "p1");
    assert_eq!(value["nodes"][0]["kind"], "data");
    assert_eq!(value["nodes"][0]["type"], "ftm:Person");
    assert_eq!(value["nodes"][7]["kind"], "entity");
    assert_eq!(value["edges"][0]["kind"], "resolved");
    assert!(value["nodes"][7]["rank"].is_f64());
}

#[test]
fn test_parallel_edges_are_keyed() {
    let graph = EntityGraph::build(
        RecordStore::new(),
        vec![group("1", vec![], &["2", "2"]), group("1", vec![], &["2"])],
    )
    .unwrap();

    let keys: Vec<usize> = graph.to_node_link().edges.iter().map(|e| e.key).collect();
    assert_eq!(keys, vec![0, 1, 2]);
}

#[test]
fn test_unranked_snapshot_restores_unranked() {
    let graph = EntityGraph::build(scenario_store(), scenario_groups()).unwrap();
    let restored = EntityGraph::from_node_link(&graph.to_node_link()).unwrap();
    assert!(!restored.is_ranked());
    assert_eq!(restored.entity("sz_1").unwrap().country(), Some("CY"));
}

#[test]
fn test_partial_ranks_rejected() {
    let mut data = scenario_graph().to_node_link();
    data.nodes[3].rank = None;

    assert!(matches!(
        EntityGraph::from_node_link(&data),
        Err(GraphError::MalformedNodeLink(_))
    ));
}

#[test]
fn test_dangling_edge_rejected() {
    let mut data: NodeLinkGraph = scenario_graph().to_node_link();
    data.edges[0].target = "missing".to_string();

    assert!(matches!(
        EntityGraph::from_node_link(&data),
        Err(GraphError::MalformedNodeLink(_))
    ));
}

#[test]
fn test_data_node_needs_known_type() {
    let mut data = scenario_graph().to_node_link();
    assert_eq!(data.nodes[0].kind, NodeKind::Data);
    data.nodes[0].node_type = Some("ftm:Vessel".to_string());

    assert!(matches!(
        EntityGraph::from_node_link(&data),
        Err(GraphError::MalformedNodeLink(_))
    ));
}

#[test]
fn test_garbage_json_rejected() {
    assert!(matches!(
        EntityGraph::from_json("[1, 2"),
        Err(GraphError::MalformedNodeLink(_))
    ));
}
