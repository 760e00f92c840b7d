//! Node-link JSON snapshot of the entity graph
//!
//! Same layout as the node-link format used by common graph tooling:
//! `{directed, multigraph, graph, nodes, edges}`. Parallel edges get a
//! per-pair `key` counting from zero.

use super::{EdgeKind, EntityGraph, GraphEdge, GraphError, NodeKind};
use crate::models::{Entity, Record, RecordType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: String,
    pub kind: NodeKind,

    /// FollowTheMoney class, e.g. `ftm:Person`
    #[serde(rename = "type")]
    pub node_type: Option<String>,

    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,

    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
}

/// Serialized edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: String,
    pub target: String,
    pub key: usize,
    pub kind: EdgeKind,
    pub why: String,
    pub prob: f64,
}

/// Whole-graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub directed: bool,
    pub multigraph: bool,

    #[serde(default)]
    pub graph: serde_json::Map<String, serde_json::Value>,

    pub nodes: Vec<NodeLinkNode>,
    pub edges: Vec<NodeLinkEdge>,
}

impl EntityGraph {
    /// Snapshot the graph, nodes and edges in insertion order
    pub fn to_node_link(&self) -> NodeLinkGraph {
        let ranks = self.ranks();

        let nodes = self
            .nodes()
            .enumerate()
            .map(|(i, node)| {
                let addr = node.as_record().and_then(Record::address).map(str::to_string);
                NodeLinkNode {
                    id: node.id().to_string(),
                    kind: node.kind(),
                    node_type: node.node_type().map(|t| t.ftm_class().to_string()),
                    name: node.name().map(str::to_string),
                    addr,
                    country: node.country().map(str::to_string),
                    rank: ranks.map(|r| r[i]),
                }
            })
            .collect();

        let mut keys: HashMap<(&str, &str), usize> = HashMap::new();
        let edges = self
            .edges()
            .map(|(source, target, edge)| {
                let key = keys.entry((source, target)).or_insert(0);
                let out = NodeLinkEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    key: *key,
                    kind: edge.kind,
                    why: edge.why.clone(),
                    prob: edge.prob,
                };
                *key += 1;
                out
            })
            .collect();

        NodeLinkGraph {
            directed: true,
            multigraph: true,
            graph: serde_json::Map::new(),
            nodes,
            edges,
        }
    }

    /// Rebuild a graph from a snapshot
    ///
    /// Ranks are restored only when every node carries one; a partially
    /// ranked snapshot is rejected.
    pub fn from_node_link(data: &NodeLinkGraph) -> Result<Self, GraphError> {
        let mut graph = EntityGraph::new();

        for node in &data.nodes {
            let node_type = match &node.node_type {
                Some(class) => Some(
                    RecordType::from_ftm_class(class)
                        .ok_or_else(|| GraphError::MalformedNodeLink(format!("unknown node type {}", class)))?,
                ),
                None => None,
            };

            match node.kind {
                NodeKind::Data => {
                    let record_type = node_type.ok_or_else(|| {
                        GraphError::MalformedNodeLink(format!("data node {} has no type", node.id))
                    })?;
                    let record = Record::new(
                        node.id.clone(),
                        record_type,
                        node.name.clone().unwrap_or_default(),
                        node.addr.clone(),
                        node.country.clone(),
                    )?;
                    graph.add_record(record)?;
                }
                NodeKind::Entity => {
                    let mut entity = Entity::new(node.id.clone());
                    entity.set_entity_type(node_type);
                    entity.set_name(node.name.clone());
                    entity.set_country(node.country.clone());
                    graph.add_entity_node(entity)?;
                }
            }
        }

        for edge in &data.edges {
            graph
                .add_edge_by_id(
                    &edge.source,
                    &edge.target,
                    GraphEdge {
                        kind: edge.kind,
                        why: edge.why.clone(),
                        prob: edge.prob,
                    },
                )
                .map_err(|_| {
                    GraphError::MalformedNodeLink(format!("edge {} -> {} names a missing node", edge.source, edge.target))
                })?;
        }

        let ranks: Vec<f64> = data.nodes.iter().filter_map(|n| n.rank).collect();
        if ranks.len() == data.nodes.len() && !ranks.is_empty() {
            graph.set_ranks(ranks);
        } else if !ranks.is_empty() {
            return Err(GraphError::MalformedNodeLink("only some nodes carry a rank".to_string()));
        }

        Ok(graph)
    }

    /// Serialize the snapshot as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_node_link())
    }

    /// Parse a JSON snapshot back into a graph
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let data: NodeLinkGraph =
            serde_json::from_str(json).map_err(|e| GraphError::MalformedNodeLink(e.to_string()))?;
        Self::from_node_link(&data)
    }
}
