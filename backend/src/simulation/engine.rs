//! Transfer simulator - fraud episodes and decoy traffic
//!
//! Drives the stochastic process that fills the synthetic dataset:
//!
//! ```text
//! For each fraud episode:
//! 1. Select a bad-actor pattern (UBO + shells) and reserve its component
//! 2. Draw a target total for the episode
//! 3. Repeat until the target is reached:
//!    a. pick a path length
//!    b. sample distinct shell paths of that length
//!    c. transfer along every hop (amount + Poisson timing)
//!
//! Then, once:
//! 4. Spread decoy B2B transfers between the remaining organizations until
//!    legit volume ≈ fraud volume / fraud rate
//! ```
//!
//! # Failure Policy
//!
//! Every failure is terminal for the run; nothing is retried. In particular
//! a non-positive sampled amount is a [`SimulationError::SamplingViolation`]
//! rather than a re-draw.
//!
//! CRITICAL: All money values are i64 (cents)

use super::paths::{PathError, PathSpace};
use crate::config::{ConfigError, SimulationConfig};
use crate::core::time::SimulationClock;
use crate::dataset::SynthesizedDataset;
use crate::graph::{EntityGraph, GraphError};
use crate::models::transaction::to_cents;
use crate::models::{Party, RecordError, TransactionRecord};
use crate::rng::{RngError, RngManager};
use crate::selector::{BadActorPattern, BadActorSelector, SelectionError};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Errors
// ============================================================================

/// Terminal failures of a generation run
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Malformed input data (missing names, unknown records, bad codes)
    #[error("Data quality: {0}")]
    DataQuality(String),

    /// Pathological draw, e.g. a non-positive amount
    #[error("Sampling violation: {0}")]
    SamplingViolation(String),

    /// No pattern, path set, or counterparty pool to sample from
    #[error("Selection failure: {0}")]
    SelectionFailure(String),

    /// Graph analytics could not be computed
    #[error("Structural failure: {0}")]
    StructuralFailure(String),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl From<GraphError> for SimulationError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EmptyGraph | GraphError::NoConvergence { .. } | GraphError::NotRanked => {
                SimulationError::StructuralFailure(err.to_string())
            }
            other => SimulationError::DataQuality(other.to_string()),
        }
    }
}

impl From<RecordError> for SimulationError {
    fn from(err: RecordError) -> Self {
        SimulationError::DataQuality(err.to_string())
    }
}

impl From<SelectionError> for SimulationError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::NoViablePattern => SimulationError::SelectionFailure(err.to_string()),
            SelectionError::Graph(inner) => inner.into(),
        }
    }
}

impl From<PathError> for SimulationError {
    fn from(err: PathError) -> Self {
        SimulationError::SelectionFailure(err.to_string())
    }
}

impl From<RngError> for SimulationError {
    fn from(err: RngError) -> Self {
        SimulationError::SamplingViolation(err.to_string())
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Outcome of one fraud episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub owner: String,
    pub num_shells: usize,
    pub component_size: usize,

    /// Drawn target total (cents)
    pub target: i64,

    /// Volume actually moved (cents), always >= target
    pub total: i64,

    pub batches: usize,
    pub transactions: usize,

    /// Paths routed, keyed by path length (shells per path)
    pub path_lengths: BTreeMap<usize, usize>,
}

/// Outcome of decoy generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegitSummary {
    /// Target decoy volume (cents)
    pub target: i64,
    pub total: i64,
    pub transactions: usize,
    pub pool_size: usize,
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub episodes: Vec<EpisodeSummary>,
    pub legit: LegitSummary,
}

// ============================================================================
// Transfer Simulator
// ============================================================================

/// Simulated patterns of tradecraft over a ranked entity graph
///
/// Owns its RNG; nothing else in the run draws random numbers.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = TransferSimulator::new(config)?;
/// let mut dataset = SynthesizedDataset::new();
/// let summary = sim.run(&graph, &mut dataset)?;
/// ```
pub struct TransferSimulator {
    config: SimulationConfig,
    selector: BadActorSelector,
    rng: RngManager,
    clock: SimulationClock,

    /// Cumulative flagged fraud volume (cents)
    fraud_total: i64,

    /// Every node consumed by a fraud pattern so far
    bad_actors: HashSet<String>,

    /// Every organization used by decoy traffic
    b2b_actors: HashSet<String>,
}

impl TransferSimulator {
    /// Create a simulator, seeding the RNG from config (or OS entropy) and
    /// starting the clock at the configured start (or now)
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let rng = match config.rng_seed {
            Some(seed) => RngManager::new(seed),
            None => RngManager::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a simulator with an injected RNG
    pub fn with_rng(config: SimulationConfig, rng: RngManager) -> Result<Self, SimulationError> {
        config.validate()?;

        let start = config.start.unwrap_or_else(|| Utc::now().naive_utc());
        let selector = BadActorSelector::from_config(&config);

        Ok(Self {
            config,
            selector,
            rng,
            clock: SimulationClock::new(start),
            fraud_total: 0,
            bad_actors: HashSet::new(),
            b2b_actors: HashSet::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn start(&self) -> NaiveDateTime {
        self.clock.start()
    }

    /// Latest transaction timestamp generated so far
    pub fn finish(&self) -> NaiveDateTime {
        self.clock.finish()
    }

    /// Cumulative fraud volume (cents)
    pub fn fraud_total(&self) -> i64 {
        self.fraud_total
    }

    pub fn bad_actors(&self) -> &HashSet<String> {
        &self.bad_actors
    }

    pub fn b2b_actors(&self) -> &HashSet<String> {
        &self.b2b_actors
    }

    // ------------------------------------------------------------------------
    // Sampling
    // ------------------------------------------------------------------------

    /// Draw one transfer amount (cents)
    ///
    /// `median - N(median/2, median/10)`, rounded to cents. A non-positive
    /// result needs a draw five standard deviations out and is fatal.
    pub fn amount(&mut self) -> Result<i64, SimulationError> {
        let median = self.config.distributions.transfer_chunk_median;
        let sample = self.rng.gaussian(median / 2.0, median / 10.0)?;
        let cents = to_cents(median - sample);

        if cents <= 0 {
            return Err(SimulationError::SamplingViolation(format!(
                "non-positive amount {} from draw {}",
                cents, sample
            )));
        }
        Ok(cents)
    }

    /// Draw one fraud transfer timestamp
    ///
    /// Poisson-distributed whole days after the simulation start.
    pub fn timing(&mut self) -> Result<NaiveDateTime, SimulationError> {
        let days = self.rng.poisson(self.config.distributions.inter_arrival_median)?;
        self.clock.stamp_after_days(days).ok_or_else(|| {
            SimulationError::SamplingViolation(format!(
                "timestamp {} days after {} is out of range",
                days,
                self.clock.start()
            ))
        })
    }

    /// Uniform timestamp within the observed window `[start, finish]`
    fn uniform_timing(&mut self) -> Result<NaiveDateTime, SimulationError> {
        let offset = self.rng.range_inclusive(0, self.clock.span_seconds());
        self.clock.at_offset(offset).ok_or_else(|| {
            SimulationError::SamplingViolation(format!("offset {}s is out of range", offset))
        })
    }

    /// Episode target total (cents)
    fn target_funds(&mut self) -> Result<i64, SimulationError> {
        let median = self.config.distributions.transfer_total_median;
        let target = to_cents(self.rng.gaussian(median / 2.0, median / 100.0)?);

        if target <= 0 {
            return Err(SimulationError::SamplingViolation(format!(
                "non-positive target funds {}",
                target
            )));
        }
        Ok(target)
    }

    /// Materialize identities for both ends of a transfer
    fn parties(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
        payer_id: &str,
        benef_id: &str,
    ) -> Result<(Party, Party), SimulationError> {
        let payer = self.party(graph, dataset, payer_id)?;
        let beneficiary = self.party(graph, dataset, benef_id)?;
        Ok((payer, beneficiary))
    }

    fn party(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
        node_id: &str,
    ) -> Result<Party, SimulationError> {
        let features = graph.identity_features(node_id, &mut self.rng)?;
        let node_country = graph.node(node_id).and_then(|n| n.country()).map(str::to_string);

        let party = Party {
            id: node_id.to_string(),
            name: features.name.clone(),
            country: node_country.or_else(|| features.country.clone()),
        };
        dataset.add_entity(features);
        Ok(party)
    }

    // ------------------------------------------------------------------------
    // Fraud
    // ------------------------------------------------------------------------

    /// Run one batch: route funds along distinct sampled paths
    ///
    /// Every consecutive pair on a path is one flagged transfer. Returns the
    /// batch subtotal (cents).
    pub fn run_one_fraud_batch(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
        owner: &str,
        paths: &PathSpace<'_>,
    ) -> Result<i64, SimulationError> {
        let sampled = paths.sample_distinct(&mut self.rng, self.config.paths_per_batch)?;
        let mut subtotal = 0i64;

        for path in sampled {
            debug!(owner, entry = path[0], hops = path.len() - 1, "Routing funds");

            for hop in path.windows(2) {
                let amount = self.amount()?;
                let timestamp = self.timing()?;
                let (payer, beneficiary) = self.parties(graph, dataset, hop[0], hop[1])?;

                let tx = TransactionRecord::new(self.rng.uuid(), payer, beneficiary, amount, timestamp, true);
                dataset.add_transaction(tx);
                subtotal += amount;
            }
        }

        Ok(subtotal)
    }

    /// Simulate one fraud episode on a freshly selected pattern
    pub fn simulate_fraud(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
    ) -> Result<EpisodeSummary, SimulationError> {
        let pattern = self.selector.select(graph, &mut self.rng)?;
        self.simulate_pattern(graph, dataset, &pattern)
    }

    /// Simulate one fraud episode on a given pattern
    pub fn simulate_pattern(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
        pattern: &BadActorPattern,
    ) -> Result<EpisodeSummary, SimulationError> {
        self.bad_actors.extend(pattern.component.iter().cloned());

        let upper = (pattern.shells.len() + 1).min(self.config.max_path_len);
        let path_range: Vec<usize> = (self.config.min_clique_size..upper).collect();
        if path_range.is_empty() {
            return Err(SimulationError::SelectionFailure(format!(
                "pattern owned by {} has {} shells, too few for any path",
                pattern.owner,
                pattern.shells.len()
            )));
        }

        let target = self.target_funds()?;
        info!(
            owner = %pattern.owner,
            shells = pattern.shells.len(),
            target,
            ?path_range,
            "Simulating fraud episode"
        );

        let before = dataset.transactions().len();
        let mut total = 0i64;
        let mut batches = 0usize;
        let mut path_lengths: BTreeMap<usize, usize> = BTreeMap::new();

        while total < target {
            let len = path_range[self.rng.index(path_range.len())];
            let paths = PathSpace::new(&pattern.shells, len);
            total += self.run_one_fraud_batch(graph, dataset, &pattern.owner, &paths)?;
            batches += 1;
            *path_lengths.entry(len).or_insert(0) += self.config.paths_per_batch;
        }

        self.fraud_total += total;

        let summary = EpisodeSummary {
            owner: pattern.owner.clone(),
            num_shells: pattern.shells.len(),
            component_size: pattern.component.len(),
            target,
            total,
            batches,
            transactions: dataset.transactions().len() - before,
            path_lengths,
        };
        info!(total, batches, transactions = summary.transactions, "Fraud episode complete");
        Ok(summary)
    }

    // ------------------------------------------------------------------------
    // Legit
    // ------------------------------------------------------------------------

    /// Generate decoy B2B transfers among organizations outside every fraud
    /// pattern and outside sanctioned countries
    ///
    /// Volume target is the cumulative fraud total divided by the fraud
    /// rate. Timestamps are uniform over the window fraud traffic spans.
    pub fn simulate_legit(
        &mut self,
        graph: &EntityGraph,
        dataset: &mut SynthesizedDataset,
    ) -> Result<LegitSummary, SimulationError> {
        let pool: Vec<String> = graph
            .entities()
            .filter(|ent| ent.is_organization())
            .filter(|ent| !self.bad_actors.contains(ent.id()))
            .filter(|ent| !self.config.is_sanctioned(ent.country()))
            .map(|ent| ent.id().to_string())
            .collect();

        let target = (self.fraud_total as f64 / self.config.approx_fraud_rate).round() as i64;
        info!(target, pool = pool.len(), "Simulating legit traffic");

        let mut total = 0i64;
        let mut transactions = 0usize;

        if target > 0 && pool.len() < 2 {
            return Err(SimulationError::SelectionFailure(format!(
                "legit pool has {} organizations, need at least 2",
                pool.len()
            )));
        }

        while total < target {
            let pair = self.rng.sample_distinct(pool.len(), 2)?;
            let (payer, benef) = (&pool[pair[0]], &pool[pair[1]]);

            let amount = self.amount()?;
            let timestamp = self.uniform_timing()?;
            let (payer_party, benef_party) = self.parties(graph, dataset, payer, benef)?;

            let tx = TransactionRecord::new(self.rng.uuid(), payer_party, benef_party, amount, timestamp, false);
            dataset.add_transaction(tx);

            self.b2b_actors.insert(payer.clone());
            self.b2b_actors.insert(benef.clone());
            total += amount;
            transactions += 1;
        }

        info!(total, transactions, "Legit traffic complete");
        Ok(LegitSummary {
            target,
            total,
            transactions,
            pool_size: pool.len(),
        })
    }

    // ------------------------------------------------------------------------
    // Full run
    // ------------------------------------------------------------------------

    /// Run every configured fraud episode, then decoy traffic
    pub fn run(&mut self, graph: &EntityGraph, dataset: &mut SynthesizedDataset) -> Result<RunSummary, SimulationError> {
        let mut episodes = Vec::with_capacity(self.config.num_patterns);
        for _ in 0..self.config.num_patterns {
            episodes.push(self.simulate_fraud(graph, dataset)?);
        }

        let legit = self.simulate_legit(graph, dataset)?;

        Ok(RunSummary {
            seed: self.seed(),
            start: self.start(),
            finish: self.finish(),
            episodes,
            legit,
        })
    }
}
