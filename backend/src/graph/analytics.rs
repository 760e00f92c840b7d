//! Graph analytics: centrality rank and component partition
//!
//! - Eigenvector centrality by power iteration (ranks UBO candidates)
//! - Weakly connected components via union-find (candidate subgraphs)
//!
//! Both are pure functions over the assembled graph. Ranks are written back
//! onto the graph once, for every node, and never recomputed.

use super::{EntityGraph, GraphError};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::info;

/// Power iteration cap
pub const MAX_ITERATIONS: usize = 100;

/// Per-node convergence tolerance
pub const TOLERANCE: f64 = 1.0e-6;

/// Compute eigenvector centrality and store it on the graph
///
/// Fails if the graph is empty or the iteration does not converge. There is
/// no fallback to uniform ranks.
pub fn rank(graph: &mut EntityGraph) -> Result<(), GraphError> {
    let ranks = eigenvector_centrality(graph, MAX_ITERATIONS, TOLERANCE)?;
    graph.set_ranks(ranks);
    info!(nodes = graph.node_count(), "Ranked graph by eigenvector centrality");
    Ok(())
}

/// Eigenvector centrality of every node, indexed by node insertion order
///
/// Follows edge direction: a node's score accumulates from its
/// predecessors. Starting from the uniform vector, each step computes
/// `x ← normalize(x + Aᵀx)` using the L2 norm, and stops once the summed
/// absolute change falls below `n · tol`.
pub fn eigenvector_centrality(graph: &EntityGraph, max_iter: usize, tol: f64) -> Result<Vec<f64>, GraphError> {
    let inner = graph.inner();
    let n = inner.node_count();
    if n == 0 {
        return Err(GraphError::EmptyGraph);
    }

    let mut x = vec![1.0 / n as f64; n];

    for _ in 0..max_iter {
        let last = x.clone();

        for edge in inner.edge_references() {
            x[edge.target().index()] += last[edge.source().index()];
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        for v in x.iter_mut() {
            *v /= norm;
        }

        let delta: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if delta < n as f64 * tol {
            return Ok(x);
        }
    }

    Err(GraphError::NoConvergence { iterations: max_iter })
}

/// Partition the graph into weakly connected components
///
/// Each component lists node ids in insertion order; components are ordered
/// by their first node.
pub fn weakly_connected_components(graph: &EntityGraph) -> Vec<Vec<String>> {
    let inner = graph.inner();
    let mut sets: UnionFind<usize> = UnionFind::new(inner.node_count());

    for edge in inner.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut position: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<String>> = Vec::new();

    for idx in inner.node_indices() {
        let root = sets.find(idx.index());
        let slot = *position.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(inner[idx].id().to_string());
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RelatedEntity, ResolutionGroup};

    fn linked(pairs: &[(&str, &str)]) -> EntityGraph {
        let mut graph = EntityGraph::new();
        for (src, dst) in pairs {
            graph
                .apply_group(&ResolutionGroup {
                    resolved_entity_id: src.to_string(),
                    members: vec![],
                    related: vec![RelatedEntity {
                        entity_id: dst.to_string(),
                        match_key: "+REL".into(),
                        match_level: 5,
                    }],
                })
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_empty_graph_has_no_centrality() {
        let graph = EntityGraph::new();
        assert_eq!(
            eigenvector_centrality(&graph, MAX_ITERATIONS, TOLERANCE),
            Err(GraphError::EmptyGraph)
        );
    }

    #[test]
    fn test_two_cycle_is_uniform() {
        let mut graph = linked(&[("a", "b"), ("b", "a")]);
        rank(&mut graph).unwrap();

        let expected = 1.0 / 2f64.sqrt();
        assert!((graph.rank("sz_a").unwrap() - expected).abs() < 1e-9);
        assert!((graph.rank("sz_b").unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_components_follow_insertion_order() {
        let graph = linked(&[("a", "b"), ("c", "d"), ("b", "e")]);
        let comps = weakly_connected_components(&graph);
        assert_eq!(
            comps,
            vec![
                vec!["sz_a".to_string(), "sz_b".to_string(), "sz_e".to_string()],
                vec!["sz_c".to_string(), "sz_d".to_string()],
            ]
        );
    }
}
