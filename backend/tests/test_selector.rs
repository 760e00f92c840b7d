//! Tests for bad-actor pattern selection

mod common;

use common::*;
use kleptosyn_core::graph::node_link::{NodeLinkEdge, NodeLinkGraph, NodeLinkNode};
use kleptosyn_core::graph::{EdgeKind, NodeKind};
use kleptosyn_core::{BadActorSelector, EntityGraph, GraphError, RngManager, SelectionError, SimulationConfig};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn selector() -> BadActorSelector {
    BadActorSelector::from_config(&SimulationConfig::default())
}

fn entity_node(id: &str, class: &str, country: Option<&str>, rank: f64) -> NodeLinkNode {
    NodeLinkNode {
        id: id.to_string(),
        kind: NodeKind::Entity,
        node_type: Some(class.to_string()),
        name: Some(id.to_uppercase()),
        addr: None,
        country: country.map(str::to_string),
        rank: Some(rank),
    }
}

fn edge(source: &str, target: &str) -> NodeLinkEdge {
    NodeLinkEdge {
        source: source.to_string(),
        target: target.to_string(),
        key: 0,
        kind: EdgeKind::Related,
        why: "+ADDRESS".to_string(),
        prob: 1.0,
    }
}

fn ranked(nodes: Vec<NodeLinkNode>, edges: Vec<NodeLinkEdge>) -> EntityGraph {
    EntityGraph::from_node_link(&NodeLinkGraph {
        directed: true,
        multigraph: true,
        graph: Default::default(),
        nodes,
        edges,
    })
    .unwrap()
}

#[test]
fn test_scenario_has_exactly_one_pattern() {
    let graph = scenario_graph();
    let candidates = selector().select_candidates(&graph).unwrap();

    assert_eq!(candidates.len(), 1);
    let pattern = &candidates[0];
    assert_eq!(pattern.owner, "sz_1");
    assert_eq!(pattern.shells, vec!["sz_2", "sz_3", "sz_4"]);
    assert_eq!(pattern.component.len(), 8);
}

#[test]
fn test_select_returns_the_only_candidate() {
    let graph = scenario_graph();
    let mut rng = RngManager::new(99);
    let pattern = selector().select(&graph, &mut rng).unwrap();
    assert_eq!(pattern.owner, "sz_1");
}

#[test]
fn test_unranked_graph_rejected() {
    let graph = EntityGraph::build(scenario_store(), scenario_groups()).unwrap();
    assert_eq!(
        selector().select_candidates(&graph),
        Err(SelectionError::Graph(GraphError::NotRanked))
    );
}

#[test]
fn test_sanctioned_shells_do_not_count() {
    let graph = ranked(
        vec![
            entity_node("p", "ftm:Person", None, 0.9),
            entity_node("a", "ftm:Company", Some("CY"), 0.1),
            entity_node("b", "ftm:Company", Some("RU"), 0.1),
            entity_node("c", "ftm:Company", None, 0.1),
        ],
        vec![edge("p", "a"), edge("p", "b"), edge("p", "c")],
    );

    assert!(selector().select_candidates(&graph).unwrap().is_empty());

    let mut rng = RngManager::new(1);
    assert_eq!(
        selector().select(&graph, &mut rng),
        Err(SelectionError::NoViablePattern)
    );

    let lenient = BadActorSelector::new(BTreeSet::new(), 3);
    assert_eq!(lenient.select_candidates(&graph).unwrap().len(), 1);
}

#[test]
fn test_owner_ties_break_on_descending_id() {
    let graph = ranked(
        vec![
            entity_node("p1", "ftm:Person", None, 0.5),
            entity_node("p2", "ftm:Person", None, 0.5),
            entity_node("p0", "ftm:Person", None, 0.2),
            entity_node("a", "ftm:Company", None, 0.1),
            entity_node("b", "ftm:Company", None, 0.1),
            entity_node("c", "ftm:Company", None, 0.1),
        ],
        vec![edge("p1", "a"), edge("p2", "b"), edge("p0", "c"), edge("a", "b"), edge("b", "c")],
    );

    let candidates = selector().select_candidates(&graph).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].owner, "p2");
}

const COUNTRIES: [Option<&str>; 4] = [None, Some("RU"), Some("CY"), Some("GB")];

proptest! {
    #[test]
    fn prop_candidates_are_well_formed(
        kinds in prop::collection::vec((any::<bool>(), 0usize..4, 0.0f64..1.0), 1..24),
        links in prop::collection::vec((0usize..24, 0usize..24), 0..40),
    ) {
        let n = kinds.len();
        let nodes: Vec<NodeLinkNode> = kinds
            .iter()
            .enumerate()
            .map(|(i, (person, country, rank))| {
                let class = if *person { "ftm:Person" } else { "ftm:Company" };
                entity_node(&format!("n{}", i), class, COUNTRIES[*country], *rank)
            })
            .collect();
        let edges: Vec<NodeLinkEdge> = links
            .iter()
            .map(|(a, b)| edge(&format!("n{}", a % n), &format!("n{}", b % n)))
            .collect();

        let graph = ranked(nodes, edges);
        let candidates = selector().select_candidates(&graph).unwrap();

        for pattern in candidates {
            prop_assert!(pattern.shells.len() >= 3);

            let owner = graph.entity(&pattern.owner).unwrap();
            prop_assert!(owner.is_person());
            prop_assert!(pattern.component.contains(&pattern.owner));

            let owner_rank = graph.rank(&pattern.owner).unwrap();
            for id in &pattern.component {
                if graph.entity(id).unwrap().is_person() {
                    prop_assert!(graph.rank(id).unwrap() <= owner_rank);
                }
            }

            for shell in &pattern.shells {
                let ent = graph.entity(shell).unwrap();
                prop_assert!(ent.is_organization());
                prop_assert_ne!(ent.country(), Some("RU"));
                prop_assert!(pattern.component.contains(shell));
            }
        }
    }
}
