//! Bad-actor selection
//!
//! Finds subgraphs shaped like "ultimate beneficial owner + shell companies"
//! among the weakly connected components of a ranked entity graph.
//!
//! Within a component:
//! - owners are person entities, ordered by descending centrality
//! - shells are organization entities outside sanctioned countries
//!
//! A component is viable when it has an owner and at least
//! `min_clique_size` shells. The top-ranked owner is the nominal UBO.

use crate::config::SimulationConfig;
use crate::graph::analytics::weakly_connected_components;
use crate::graph::{EntityGraph, GraphError};
use crate::rng::RngManager;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("No viable bad-actor pattern in graph")]
    NoViablePattern,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One candidate laundering topology
#[derive(Debug, Clone, PartialEq)]
pub struct BadActorPattern {
    /// Top-ranked person entity of the component
    pub owner: String,

    /// Usable shell organizations, in component order
    pub shells: Vec<String>,

    /// Every node id of the component
    pub component: Vec<String>,
}

/// Chooses bad-actor patterns from a ranked graph
#[derive(Debug, Clone)]
pub struct BadActorSelector {
    sanctioned_countries: BTreeSet<String>,
    min_clique_size: usize,
}

impl BadActorSelector {
    pub fn new(sanctioned_countries: BTreeSet<String>, min_clique_size: usize) -> Self {
        Self {
            sanctioned_countries,
            min_clique_size,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.sanctioned_countries.clone(), config.min_clique_size)
    }

    fn is_sanctioned(&self, country: Option<&str>) -> bool {
        country.map_or(false, |c| self.sanctioned_countries.contains(c))
    }

    /// All viable patterns, in component order
    ///
    /// Requires the graph to be ranked.
    pub fn select_candidates(&self, graph: &EntityGraph) -> Result<Vec<BadActorPattern>, SelectionError> {
        if !graph.is_ranked() {
            return Err(GraphError::NotRanked.into());
        }

        let mut candidates = Vec::new();

        for component in weakly_connected_components(graph) {
            let mut owners: Vec<(f64, &str)> = Vec::new();
            let mut shells: Vec<String> = Vec::new();

            for node_id in &component {
                let Some(entity) = graph.entity(node_id) else {
                    continue;
                };

                if entity.is_person() {
                    let rank = graph.rank(node_id).ok_or(GraphError::NotRanked)?;
                    owners.push((rank, node_id.as_str()));
                } else if entity.is_organization() && !self.is_sanctioned(entity.country()) {
                    shells.push(node_id.clone());
                }
            }

            // Descending by rank, then by id
            owners.sort_by(|a, b| match b.0.total_cmp(&a.0) {
                Ordering::Equal => b.1.cmp(a.1),
                other => other,
            });

            if let Some((rank, owner)) = owners.first() {
                if shells.len() >= self.min_clique_size {
                    debug!(owner, rank, shells = shells.len(), nodes = component.len(), "Viable pattern");
                    candidates.push(BadActorPattern {
                        owner: owner.to_string(),
                        shells,
                        component: component.clone(),
                    });
                }
            }
        }

        info!(candidates = candidates.len(), "Bad-actor candidates");
        Ok(candidates)
    }

    /// Uniformly sample one viable pattern
    pub fn select(&self, graph: &EntityGraph, rng: &mut RngManager) -> Result<BadActorPattern, SelectionError> {
        let candidates = self.select_candidates(graph)?;
        rng.choose(&candidates)
            .cloned()
            .ok_or(SelectionError::NoViablePattern)
    }
}
