//! `boxkit` command line
//!
//! Offline reconciliation and drift classification from JSON files.

use anyhow::{Context, Result};
use boxkit_model::{BillingRecord, ProduceBox, PropertyCodec, WireProperties};
use boxkit_reconcile::{ReconcileConfig, ReconciledState, ReconciliationEngine};
use boxkit_sync::SyncClassifier;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "boxkit", version, about = "Produce box personalization reconciliation")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile a stored personalization against a box catalog
    Reconcile(Inputs),
    /// Reconcile, then classify drift against billing records
    Classify {
        #[command(flatten)]
        inputs: Inputs,
        /// Billing records JSON file
        #[arg(long)]
        billing: PathBuf,
    },
}

#[derive(Debug, Args)]
struct Inputs {
    /// Personalization property bag JSON file
    #[arg(long)]
    state: PathBuf,
    /// Box catalog JSON file
    #[arg(long = "box")]
    produce_box: PathBuf,
    /// Reconciliation config TOML file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReconcileOutput {
    properties: WireProperties,
    messages: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let output = match cli.command {
        Command::Reconcile(inputs) => {
            let reconciled = reconcile(&inputs)?;
            serde_json::to_string_pretty(&ReconcileOutput {
                properties: PropertyCodec::encode(&reconciled.state),
                messages: reconciled.messages(),
            })?
        }
        Command::Classify { inputs, billing } => {
            let reconciled = reconcile(&inputs)?;
            let produce_box: ProduceBox = read_json(&inputs.produce_box)?;
            let records: Vec<BillingRecord> = read_json(&billing)?;
            let actions = SyncClassifier::new(&produce_box).classify(&reconciled, &records);
            serde_json::to_string_pretty(&actions)?
        }
    };

    println!("{output}");
    Ok(())
}

fn reconcile(inputs: &Inputs) -> Result<ReconciledState> {
    let config = match &inputs.config {
        Some(path) => ReconcileConfig::from_path(path)?,
        None => ReconcileConfig::default(),
    };

    let raw = std::fs::read_to_string(&inputs.state)
        .with_context(|| format!("reading {}", inputs.state.display()))?;
    let props = WireProperties::from_json(&raw).with_context(|| format!("parsing {}", inputs.state.display()))?;
    let previous = PropertyCodec::decode(&props)?.value;
    let produce_box: ProduceBox = read_json(&inputs.produce_box)?;

    Ok(ReconciliationEngine::new(config).reconcile(&previous, &produce_box))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
