//! Transaction simulation
//!
//! - `paths`: lazy k-permutation space over shell companies
//! - `engine`: the transfer simulator (fraud episodes + decoy traffic)

pub mod engine;
pub mod paths;

pub use engine::{EpisodeSummary, LegitSummary, RunSummary, SimulationError, TransferSimulator};
pub use paths::{KPermutations, PathError, PathSpace};
