//! Entity graph - records, resolved entities, and their links
//!
//! A directed multigraph over two node kinds:
//! - `data` nodes, one per upstream [`Record`]
//! - `entity` nodes, one per resolved entity from the ER export
//!
//! and two edge kinds:
//! - `resolved` (entity → record), one per merged record
//! - `related` (entity → entity), one per related-entity reference
//!
//! # Construction Order
//!
//! The graph goes through a fixed pipeline and no phase may run early:
//!
//! ```text
//! build → repair_names → analytics::rank → selection / simulation
//! ```
//!
//! Entity nodes may be created by a `related` reference before their own
//! resolution group arrives; their attributes are back-filled later.
//! Edges are never removed and parallel edges are kept.

pub mod analytics;
pub mod node_link;
pub mod resolution;

use crate::models::{entity_node_id, Entity, IdentityFeatures, Record, RecordError, RecordStore, RecordType};
use crate::rng::RngManager;
use crate::text::scrub_text;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use resolution::{match_confidence, RelatedEntity, ResolutionGroup, ResolvedMember, MAX_MATCH_LEVEL};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building or querying the entity graph
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Entity {entity_id} resolves unknown record {record_id}")]
    UnknownRecord { entity_id: String, record_id: String },

    #[error("Entity {entity_id} has match level {level} above the maximum")]
    InvalidMatchLevel { entity_id: String, level: u8 },

    #[error("Node {0} already exists with a different kind")]
    NodeKindConflict(String),

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Entity {0} has no linked person or organization records")]
    NoLinkedRecords(String),

    #[error("Record {0} does not describe a person or organization")]
    NoIdentityType(String),

    #[error("Centrality is undefined for an empty graph")]
    EmptyGraph,

    #[error("Eigenvector centrality failed to converge in {iterations} iterations")]
    NoConvergence { iterations: usize },

    #[error("Graph has not been ranked")]
    NotRanked,

    #[error("Malformed node-link data: {0}")]
    MalformedNodeLink(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

// ============================================================================
// Node and Edge Types
// ============================================================================

/// Node kind as exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Data,
    Entity,
}

/// Edge kind as exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Resolved,
    Related,
}

/// Graph node payload
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Data(Record),
    Entity(Entity),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Data(rec) => rec.id(),
            GraphNode::Entity(ent) => ent.id(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Data(_) => NodeKind::Data,
            GraphNode::Entity(_) => NodeKind::Entity,
        }
    }

    pub fn node_type(&self) -> Option<RecordType> {
        match self {
            GraphNode::Data(rec) => Some(rec.record_type()),
            GraphNode::Entity(ent) => ent.entity_type(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            GraphNode::Data(rec) => Some(rec.name()),
            GraphNode::Entity(ent) => ent.name(),
        }
    }

    pub fn country(&self) -> Option<&str> {
        match self {
            GraphNode::Data(rec) => rec.country(),
            GraphNode::Entity(ent) => ent.country(),
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            GraphNode::Entity(ent) => Some(ent),
            GraphNode::Data(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            GraphNode::Data(rec) => Some(rec),
            GraphNode::Entity(_) => None,
        }
    }
}

/// Edge payload: why the link exists and how confident the match was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,

    /// Scrubbed ER match key
    pub why: String,

    /// Match level normalized into `[0, 1]`
    pub prob: f64,
}

/// Node and edge counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub data_nodes: usize,
    pub entity_nodes: usize,
    pub resolved_edges: usize,
    pub related_edges: usize,
}

// ============================================================================
// Entity Graph
// ============================================================================

/// The relationship graph sampled for bad actors
///
/// # Example
///
/// ```rust
/// use kleptosyn_core::graph::{EntityGraph, ResolutionGroup, ResolvedMember};
/// use kleptosyn_core::{Record, RecordStore, RecordType};
///
/// let store = RecordStore::from_records(vec![
///     Record::new("r1".into(), RecordType::Person, "Ann Lee".into(), None, Some("US".into())).unwrap(),
/// ]).unwrap();
///
/// let groups = vec![ResolutionGroup {
///     resolved_entity_id: "1".into(),
///     members: vec![ResolvedMember {
///         record_id: "r1".into(),
///         match_key: "+NAME".into(),
///         match_level: 11,
///         description: Some("Ann Lee".into()),
///     }],
///     related: vec![],
/// }];
///
/// let graph = EntityGraph::build(store, groups).unwrap();
/// assert_eq!(graph.entity("sz_1").unwrap().country(), Some("US"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: DiGraph<GraphNode, GraphEdge>,

    /// Node id → graph index
    index: HashMap<String, NodeIndex>,

    /// Centrality per node index, set once by the analytics pass
    ranks: Option<Vec<f64>>,
}

impl EntityGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from records and the ER export
    ///
    /// Every entity referenced by the export exists as a node afterwards,
    /// even when nothing was resolved into it.
    pub fn build<I>(records: RecordStore, groups: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = ResolutionGroup>,
    {
        let mut graph = Self::new();

        for record in records {
            graph.add_record(record)?;
        }

        let mut num_groups = 0usize;
        for group in groups {
            graph.apply_group(&group)?;
            num_groups += 1;
        }

        let stats = graph.stats();
        info!(
            groups = num_groups,
            data_nodes = stats.data_nodes,
            entity_nodes = stats.entity_nodes,
            resolved_edges = stats.resolved_edges,
            related_edges = stats.related_edges,
            "Entity graph built"
        );

        Ok(graph)
    }

    /// Add a `data` node for a record
    pub fn add_record(&mut self, record: Record) -> Result<NodeIndex, GraphError> {
        if self.index.contains_key(record.id()) {
            return Err(RecordError::DuplicateId(record.id().to_string()).into());
        }
        let id = record.id().to_string();
        let idx = self.graph.add_node(GraphNode::Data(record));
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Get or create the entity node with the given node id
    fn ensure_entity(&mut self, entity_id: &str) -> Result<NodeIndex, GraphError> {
        if let Some(&idx) = self.index.get(entity_id) {
            return match self.graph[idx] {
                GraphNode::Entity(_) => Ok(idx),
                GraphNode::Data(_) => Err(GraphError::NodeKindConflict(entity_id.to_string())),
            };
        }
        let idx = self.graph.add_node(GraphNode::Entity(Entity::new(entity_id.to_string())));
        self.index.insert(entity_id.to_string(), idx);
        Ok(idx)
    }

    /// Merge one resolution group into the graph
    ///
    /// Links the entity to its records, derives type, name and country from
    /// them, then links the related entities. A group without members leaves
    /// the entity's attributes untouched.
    pub fn apply_group(&mut self, group: &ResolutionGroup) -> Result<(), GraphError> {
        let ent_id = entity_node_id(&group.resolved_entity_id);
        let ent_idx = self.ensure_entity(&ent_id)?;

        let mut ent_type: Option<RecordType> = None;
        let mut best_desc: Option<String> = None;

        // Country tally in first-seen order
        let mut countries: Vec<(String, usize)> = Vec::new();

        for member in &group.members {
            let rec_idx = match self.index.get(&member.record_id) {
                Some(&idx) if matches!(self.graph[idx], GraphNode::Data(_)) => idx,
                _ => {
                    return Err(GraphError::UnknownRecord {
                        entity_id: ent_id,
                        record_id: member.record_id.clone(),
                    })
                }
            };

            let prob = match_confidence(member.match_level).ok_or_else(|| GraphError::InvalidMatchLevel {
                entity_id: ent_id.clone(),
                level: member.match_level,
            })?;

            self.graph.add_edge(
                ent_idx,
                rec_idx,
                GraphEdge {
                    kind: EdgeKind::Resolved,
                    why: scrub_text(&member.match_key),
                    prob,
                },
            );

            if let GraphNode::Data(rec) = &self.graph[rec_idx] {
                ent_type = Some(rec.record_type());

                if let Some(country) = rec.country() {
                    match countries.iter_mut().find(|(c, _)| c == country) {
                        Some((_, count)) => *count += 1,
                        None => countries.push((country.to_string(), 1)),
                    }
                }
            }

            if let Some(desc) = member.description.as_deref().map(str::trim) {
                if !desc.is_empty() {
                    best_desc = Some(desc.to_string());
                }
            }
        }

        if !group.members.is_empty() {
            let name = best_desc.map(|d| scrub_text(&d)).filter(|n| !n.is_empty());
            let country = most_common(&countries);

            if let GraphNode::Entity(ent) = &mut self.graph[ent_idx] {
                ent.set_entity_type(ent_type);
                ent.set_name(name);
                ent.set_country(country);
            }
        } else {
            debug!(entity = %ent_id, "Resolution group has no member records");
        }

        for rel in &group.related {
            let rel_id = entity_node_id(&rel.entity_id);
            let rel_idx = self.ensure_entity(&rel_id)?;

            let prob = match_confidence(rel.match_level).ok_or_else(|| GraphError::InvalidMatchLevel {
                entity_id: ent_id.clone(),
                level: rel.match_level,
            })?;

            self.graph.add_edge(
                ent_idx,
                rel_idx,
                GraphEdge {
                    kind: EdgeKind::Related,
                    why: scrub_text(&rel.match_key),
                    prob,
                },
            );
        }

        Ok(())
    }

    /// Repair names of person entities by inheriting from their records
    ///
    /// Single pass, single hop: a nameless person entity takes the name of
    /// its first linked `data` neighbor (in edge insertion order). Entities
    /// whose only named neighbors are other entities stay nameless.
    ///
    /// Returns the number of entities repaired.
    pub fn repair_names(&mut self) -> usize {
        let mut repairs: Vec<(NodeIndex, String)> = Vec::new();

        for idx in self.graph.node_indices() {
            let needs_repair = match &self.graph[idx] {
                GraphNode::Entity(ent) => ent.is_person() && ent.name().is_none(),
                GraphNode::Data(_) => false,
            };
            if !needs_repair {
                continue;
            }

            let inherited = self
                .out_edges_in_order(idx)
                .into_iter()
                .find_map(|(_, target)| self.graph[target].as_record().map(|r| r.name().to_string()));

            match inherited {
                Some(name) => repairs.push((idx, name)),
                None => warn!(entity = %self.graph[idx].id(), "Person entity left without a name"),
            }
        }

        let repaired = repairs.len();
        for (idx, name) in repairs {
            if let GraphNode::Entity(ent) = &mut self.graph[idx] {
                ent.set_name(Some(name));
            }
        }

        debug!(repaired, "Repaired entity names");
        repaired
    }

    /// Materialize identity features for an entity or record
    ///
    /// For an entity, one linked person/organization record is chosen
    /// uniformly at random. For a record, its own fields are returned.
    /// Entities without such records fail: names are never fabricated.
    pub fn identity_features(&self, id: &str, rng: &mut RngManager) -> Result<IdentityFeatures, GraphError> {
        let idx = self.node_index(id)?;

        match &self.graph[idx] {
            GraphNode::Data(rec) => {
                IdentityFeatures::from_record(rec).ok_or_else(|| GraphError::NoIdentityType(id.to_string()))
            }
            GraphNode::Entity(_) => {
                let mut seen: HashSet<NodeIndex> = HashSet::new();
                let linked: Vec<&Record> = self
                    .out_edges_in_order(idx)
                    .into_iter()
                    .filter(|(_, target)| seen.insert(*target))
                    .filter_map(|(_, target)| self.graph[target].as_record())
                    .filter(|rec| rec.record_type().coarse().is_some())
                    .collect();

                let chosen = rng
                    .choose(&linked)
                    .ok_or_else(|| GraphError::NoLinkedRecords(id.to_string()))?;

                IdentityFeatures::from_record(chosen).ok_or_else(|| GraphError::NoIdentityType(chosen.id().to_string()))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    fn node_index(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// Outgoing edges sorted by insertion order
    fn out_edges_in_order(&self, idx: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(e, _)| e.index());
        edges
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.node(id).and_then(GraphNode::as_entity)
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.node(id).and_then(GraphNode::as_record)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Entity nodes in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.nodes().filter_map(GraphNode::as_entity)
    }

    /// Edges in insertion order as `(source id, target id, payload)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &GraphEdge)> {
        self.graph.edge_indices().filter_map(move |e| {
            let (src, dst) = self.graph.edge_endpoints(e)?;
            Some((self.graph[src].id(), self.graph[dst].id(), &self.graph[e]))
        })
    }

    /// Ids of the nodes `id` links to, in edge insertion order
    pub fn successors(&self, id: &str) -> Result<Vec<&str>, GraphError> {
        let idx = self.node_index(id)?;
        Ok(self
            .out_edges_in_order(idx)
            .into_iter()
            .map(|(_, target)| self.graph[target].id())
            .collect())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in self.graph.node_weights() {
            match node.kind() {
                NodeKind::Data => stats.data_nodes += 1,
                NodeKind::Entity => stats.entity_nodes += 1,
            }
        }
        for edge in self.graph.edge_weights() {
            match edge.kind {
                EdgeKind::Resolved => stats.resolved_edges += 1,
                EdgeKind::Related => stats.related_edges += 1,
            }
        }
        stats
    }

    // ------------------------------------------------------------------------
    // Ranks
    // ------------------------------------------------------------------------

    pub fn is_ranked(&self) -> bool {
        self.ranks.is_some()
    }

    /// Centrality of a node, once the analytics pass has run
    pub fn rank(&self, id: &str) -> Option<f64> {
        let idx = self.index.get(id)?;
        self.ranks.as_ref().map(|ranks| ranks[idx.index()])
    }

    pub(crate) fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }

    pub(crate) fn set_ranks(&mut self, ranks: Vec<f64>) {
        debug_assert_eq!(ranks.len(), self.graph.node_count());
        self.ranks = Some(ranks);
    }

    pub(crate) fn ranks(&self) -> Option<&[f64]> {
        self.ranks.as_deref()
    }

    pub(crate) fn add_edge_by_id(&mut self, source: &str, target: &str, edge: GraphEdge) -> Result<(), GraphError> {
        let src = self.node_index(source)?;
        let dst = self.node_index(target)?;
        self.graph.add_edge(src, dst, edge);
        Ok(())
    }

    pub(crate) fn add_entity_node(&mut self, entity: Entity) -> Result<(), GraphError> {
        if self.index.contains_key(entity.id()) {
            return Err(GraphError::NodeKindConflict(entity.id().to_string()));
        }
        let id = entity.id().to_string();
        let idx = self.graph.add_node(GraphNode::Entity(entity));
        self.index.insert(id, idx);
        Ok(())
    }
}

/// Most frequent value; ties resolve to the first value seen
fn most_common(tally: &[(String, usize)]) -> Option<String> {
    let mut best: Option<&(String, usize)> = None;
    for entry in tally {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(value, _)| value.clone())
}
