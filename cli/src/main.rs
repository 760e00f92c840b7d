//! KleptoSyn CLI
//!
//! Generates a synthetic bad-actor transaction dataset from Senzing-style
//! records and their entity resolution export.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kleptosyn_core::graph::analytics;
use kleptosyn_core::ingest::{read_export, read_records};
use kleptosyn_core::models::transaction::format_cents;
use kleptosyn_core::{
    BadActorSelector, EntityGraph, GraphStats, RecordStore, ResolutionGroup, RunSummary, SimulationConfig,
    SynthesizedDataset, TransferSimulator,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "kleptosyn")]
#[command(about = "KleptoSyn - synthetic data for investigating kleptocracy", long_about = None)]
struct Cli {
    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph, simulate fraud and decoy traffic, write the dataset
    Generate {
        #[command(flatten)]
        inputs: Inputs,

        /// Simulation config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// RNG seed, overriding the config
        #[arg(long)]
        seed: Option<u64>,

        /// Number of fraud episodes, overriding the config
        #[arg(long)]
        patterns: Option<usize>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Build and rank the graph, then report statistics and candidates
    Inspect {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(clap::Args)]
struct Inputs {
    /// Senzing dataset files (JSON lines)
    #[arg(long, required = true, num_args = 1..)]
    records: Vec<PathBuf>,

    /// Senzing entity resolution export (JSON lines)
    #[arg(long)]
    export: PathBuf,
}

/// Run manifest written next to the dataset
#[derive(Serialize)]
struct Manifest {
    seed: u64,
    config_hash: String,
    config: SimulationConfig,
    num_records: usize,
    num_groups: usize,
    graph: GraphStats,
    num_fraud: usize,
    num_legit: usize,
    fraud_total: String,
    legit_total: String,
    num_entities: usize,
    run: RunSummary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Generate {
            inputs,
            config,
            seed,
            patterns,
            out_dir,
        } => generate(&inputs, config.as_deref(), seed, patterns, &out_dir),
        Commands::Inspect { inputs } => inspect(&inputs),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn generate(
    inputs: &Inputs,
    config_path: Option<&Path>,
    seed: Option<u64>,
    patterns: Option<usize>,
    out_dir: &Path,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
            SimulationConfig::from_json(&json)?
        }
        None => SimulationConfig::default(),
    };
    if seed.is_some() {
        config.rng_seed = seed;
    }
    if let Some(n) = patterns {
        config.num_patterns = n;
    }
    config.validate()?;

    let (graph, num_records, num_groups) = load_graph(inputs)?;

    let mut dataset = SynthesizedDataset::new();
    let mut sim = TransferSimulator::new(config.clone())?;
    let run = sim.run(&graph, &mut dataset)?;

    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let graph_path = out_dir.join("graph.json");
    fs::write(&graph_path, graph.to_json()?).with_context(|| format!("Failed to write {}", graph_path.display()))?;

    let export = dataset.export();
    write_tsv(&out_dir.join("transact.tsv"), &export.transactions)?;
    write_tsv(&out_dir.join("entity.tsv"), &export.entities)?;

    let manifest = Manifest {
        seed: sim.seed(),
        config_hash: config.config_hash()?,
        config,
        num_records,
        num_groups,
        graph: graph.stats(),
        num_fraud: dataset.num_fraud(),
        num_legit: dataset.num_legit(),
        fraud_total: format_cents(dataset.fraud_total()),
        legit_total: format_cents(dataset.legit_total()),
        num_entities: export.entities.len(),
        run,
    };
    let manifest_path = out_dir.join("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    info!(
        out_dir = %out_dir.display(),
        seed = manifest.seed,
        fraud = manifest.num_fraud,
        legit = manifest.num_legit,
        "Dataset written"
    );
    Ok(())
}

fn inspect(inputs: &Inputs) -> Result<()> {
    let (graph, num_records, num_groups) = load_graph(inputs)?;
    let stats = graph.stats();

    let selector = BadActorSelector::from_config(&SimulationConfig::default());
    let candidates = selector.select_candidates(&graph)?;

    println!("records:        {}", num_records);
    println!("er groups:      {}", num_groups);
    println!("data nodes:     {}", stats.data_nodes);
    println!("entity nodes:   {}", stats.entity_nodes);
    println!("resolved edges: {}", stats.resolved_edges);
    println!("related edges:  {}", stats.related_edges);
    println!("candidates:     {}", candidates.len());

    for pattern in &candidates {
        let owner = graph.entity(&pattern.owner).and_then(|e| e.name()).unwrap_or("?");
        println!(
            "  {} ({}): {} shells, {} nodes",
            pattern.owner,
            owner,
            pattern.shells.len(),
            pattern.component.len()
        );
    }

    Ok(())
}

// ============================================================================
// I/O helpers
// ============================================================================

/// Load inputs, then build, repair, and rank the graph
fn load_graph(inputs: &Inputs) -> Result<(EntityGraph, usize, usize)> {
    let mut store = RecordStore::new();
    for path in &inputs.records {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let records = read_records(BufReader::new(file)).with_context(|| format!("Failed to load {}", path.display()))?;
        info!(path = %path.display(), records = records.len(), "Loaded dataset");
        store.extend(records)?;
    }

    let file = File::open(&inputs.export).with_context(|| format!("Failed to open {}", inputs.export.display()))?;
    let groups: Vec<ResolutionGroup> =
        read_export(BufReader::new(file)).with_context(|| format!("Failed to load {}", inputs.export.display()))?;

    if store.is_empty() {
        bail!("No records loaded");
    }

    let num_records = store.len();
    let num_groups = groups.len();

    let mut graph = EntityGraph::build(store, groups)?;
    graph.repair_names();
    analytics::rank(&mut graph)?;

    Ok((graph, num_records, num_groups))
}

fn write_tsv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}
