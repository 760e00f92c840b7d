//! KleptoSyn Core - synthetic bad-actor transaction generator
//!
//! Builds an entity graph from resolved identity records, selects subgraphs
//! shaped like an ultimate beneficial owner with shell companies, and
//! simulates layered money transfers through them, hidden among decoy B2B
//! traffic.
//!
//! # Architecture
//!
//! - **ingest**: Senzing JSON-lines adapter (records + ER export)
//! - **models**: Domain types (Record, Entity, TransactionRecord)
//! - **graph**: Entity graph, centrality/components, node-link export
//! - **selector**: Bad-actor pattern selection
//! - **simulation**: Path sampling and the transfer simulator
//! - **dataset**: Accumulated output rows
//! - **rng**: Seeded random number generation
//!
//! # Pipeline
//!
//! ```text
//! records + ER export → EntityGraph::build → repair_names → analytics::rank
//!     → TransferSimulator::run → SynthesizedDataset::export
//! ```
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. All randomness flows through one seeded `RngManager`
//! 3. Graph edges are never removed; ranks are computed once

// Module declarations
pub mod config;
pub mod core;
pub mod dataset;
pub mod graph;
pub mod ingest;
pub mod models;
pub mod rng;
pub mod selector;
pub mod simulation;
pub mod text;

// Re-exports for convenience
pub use config::{ConfigError, DistributionParams, SimulationConfig};
pub use core::time::SimulationClock;
pub use dataset::{DatasetExport, EntityRow, SynthesizedDataset, TransactionRow};
pub use graph::{EntityGraph, GraphError, GraphStats, ResolutionGroup};
pub use ingest::IngestError;
pub use models::{
    CoarseType, Entity, IdentityFeatures, Party, Record, RecordError, RecordStore, RecordType, TransactionRecord,
};
pub use rng::RngManager;
pub use selector::{BadActorPattern, BadActorSelector, SelectionError};
pub use simulation::{RunSummary, SimulationError, TransferSimulator};
