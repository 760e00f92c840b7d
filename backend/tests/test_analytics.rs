//! Tests for eigenvector centrality and component partitioning

mod common;

use common::*;
use kleptosyn_core::graph::analytics::{self, eigenvector_centrality, weakly_connected_components};
use kleptosyn_core::{EntityGraph, GraphError, RecordStore};

fn links(pairs: &[(&str, &str)]) -> EntityGraph {
    let groups = pairs.iter().map(|&(src, dst)| group(src, vec![], &[dst]));
    EntityGraph::build(RecordStore::new(), groups).unwrap()
}

#[test]
fn test_every_node_ranked() {
    let graph = scenario_graph();
    assert!(graph.is_ranked());
    for node in graph.nodes() {
        let rank = graph.rank(node.id()).unwrap();
        assert!(rank.is_finite() && rank >= 0.0, "{} has rank {}", node.id(), rank);
    }
}

#[test]
fn test_hub_person_ranks_highest() {
    let graph = scenario_graph();
    let hub = graph.rank("sz_1").unwrap();

    for node in graph.nodes().filter(|n| n.id() != "sz_1") {
        assert!(graph.rank(node.id()).unwrap() < hub);
    }
    assert!((hub - 0.6124).abs() < 1e-3);
}

#[test]
fn test_directed_triangle_is_uniform() {
    let mut graph = links(&[("a", "b"), ("b", "c"), ("c", "a")]);
    analytics::rank(&mut graph).unwrap();

    let expected = 1.0 / 3f64.sqrt();
    for id in ["sz_a", "sz_b", "sz_c"] {
        assert!((graph.rank(id).unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_directed_star_fails_to_converge() {
    let mut graph = links(&[("hub", "x"), ("hub", "y"), ("hub", "z")]);

    let err = analytics::rank(&mut graph).unwrap_err();
    assert_eq!(err, GraphError::NoConvergence { iterations: 100 });
    assert!(!graph.is_ranked());
}

#[test]
fn test_star_converges_with_more_iterations() {
    let graph = links(&[("hub", "x"), ("hub", "y"), ("hub", "z")]);
    let ranks = eigenvector_centrality(&graph, 10_000, 1e-6).unwrap();

    assert!(ranks[0] < ranks[1]);
    assert!((ranks[1] - ranks[2]).abs() < 1e-12);
}

#[test]
fn test_empty_graph_rank_is_structural_error() {
    let mut graph = EntityGraph::new();
    assert_eq!(analytics::rank(&mut graph), Err(GraphError::EmptyGraph));
}

#[test]
fn test_scenario_components() {
    let graph = scenario_graph();
    let comps = weakly_connected_components(&graph);

    assert_eq!(comps.len(), 3);
    assert_eq!(
        comps[0],
        vec!["p1", "o1", "o2", "o3", "sz_1", "sz_2", "sz_3", "sz_4"]
    );
    assert_eq!(comps[1], vec!["o4", "o5", "sz_5", "sz_6"]);
    assert_eq!(comps[2], vec!["o6", "sz_7"]);
}

#[test]
fn test_isolated_nodes_are_singletons() {
    let groups = vec![group("a", vec![], &[]), group("b", vec![], &[])];
    let graph = EntityGraph::build(RecordStore::new(), groups).unwrap();
    let comps = weakly_connected_components(&graph);
    assert_eq!(comps, vec![vec!["sz_a".to_string()], vec!["sz_b".to_string()]]);
}
