use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::batch::{entropy_seed, run_batch, BatchConfig, DEFAULT_TRIALS};
use crate::combat::{
    build_monster_roster, build_party_roster, simulate_encounter, EncounterReport, Rng,
    SimulationConfig, TraceMode,
};
use crate::config::{load_rules, HouseRules};
use crate::parallel::WorkerPool;
use crate::store::{load_trials, CsvSink, MultiSink, SqliteStore, DEFAULT_DB_PATH};
use crate::summary::BatchSummary;

#[derive(Debug, Parser)]
#[command(
    name = "bfrpg-sim",
    about = "Monte Carlo combat simulator: a first-level party against four goblins"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a batch of encounters and store one row per trial.
    Simulate(SimulateArgs),
    /// Fight a single encounter and print its full event trace.
    Encounter(EncounterArgs),
    /// Summarize the results stored by an earlier run.
    Summarize(SummarizeArgs),
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Number of encounters to fight.
    #[arg(default_value_t = DEFAULT_TRIALS)]
    pub trials: usize,
    /// Seed of the first trial; trial i uses seed + i. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
    /// SQLite database for the results table (recreated on every run).
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
    /// Do not write the SQLite table.
    #[arg(long)]
    pub no_db: bool,
    /// Also write results as CSV.
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Compute trials on a thread pool.
    #[arg(long)]
    pub parallel: bool,
    /// Worker threads for --parallel (0 = one per core).
    #[arg(long, default_value_t = 0, requires = "parallel")]
    pub workers: usize,
    /// JSON file overriding house rules.
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EncounterArgs {
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,
}

/// Parse `args` (program name first) and run the command. Returns the process exit code.
pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    let outcome = match cli.command {
        Command::Simulate(args) => handle_simulate(&args),
        Command::Encounter(args) => handle_encounter(&args),
        Command::Summarize(args) => handle_summarize(&args),
    };

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn rules_from(path: Option<&Path>) -> Result<HouseRules> {
    match path {
        Some(path) => Ok(load_rules(path)?),
        None => Ok(HouseRules::default()),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{payload}");
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<()> {
    let config = BatchConfig {
        trials: args.trials,
        seed: args.seed,
        simulation: SimulationConfig {
            rules: rules_from(args.rules.as_deref())?,
            trace_mode: TraceMode::Off,
        },
        pool: args.parallel.then(|| WorkerPool::with_workers(args.workers)),
    };

    let mut sink = MultiSink::new();
    if !args.no_db {
        let store = SqliteStore::create(&args.db)
            .with_context(|| format!("failed to open results database {}", args.db.display()))?;
        sink.push(store);
    }
    if let Some(path) = &args.csv {
        let csv = CsvSink::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        sink.push(csv);
    }
    if sink.is_empty() {
        info!("no result store selected; only the summary is kept");
    }

    let summary = run_batch(&config, &mut sink).context("batch run failed")?;
    print_json(&summary)
}

fn handle_encounter(args: &EncounterArgs) -> Result<()> {
    let config = SimulationConfig {
        rules: rules_from(args.rules.as_deref())?,
        trace_mode: TraceMode::Events,
    };
    let seed = match args.seed {
        Some(seed) => seed,
        None => entropy_seed()?,
    };

    let mut rng = Rng::new(seed);
    let party = build_party_roster(&mut rng);
    let monsters = build_monster_roster(&mut rng);
    let report = simulate_encounter(party, monsters, &mut rng, &config);
    info!(
        seed,
        winner = %report.result.winner,
        rounds = report.result.rounds,
        "encounter finished"
    );

    #[derive(Serialize)]
    struct SeededReport<'a> {
        seed: u64,
        #[serde(flatten)]
        report: &'a EncounterReport,
    }
    print_json(&SeededReport {
        seed,
        report: &report,
    })
}

fn handle_summarize(args: &SummarizeArgs) -> Result<()> {
    if !args.db.exists() {
        anyhow::bail!("no results database at {}", args.db.display());
    }
    let trials = load_trials(&args.db)
        .with_context(|| format!("failed to read {}", args.db.display()))?;
    print_json(&BatchSummary::from_trials(&trials))
}
