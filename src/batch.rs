//! Batch runner: many independent encounters, each recorded as it finishes.

use tracing::{debug, info};

use crate::combat::{
    build_monster_roster, build_party_roster, simulate_encounter, Rng, SimulationConfig,
    TraceMode, TrialResult,
};
use crate::error::SimError;
use crate::parallel::{batch_ranges, simulate_range, WorkerPool};
use crate::store::TrialSink;
use crate::summary::BatchSummary;

pub const DEFAULT_TRIALS: usize = 10_000;

/// Trials computed per parallel chunk before they are handed to the sink.
pub const PARALLEL_CHUNK: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub trials: usize,
    /// Seed of trial 0. `None` draws one from the operating system.
    pub seed: Option<u64>,
    pub simulation: SimulationConfig,
    /// `None` runs sequentially on the calling thread.
    pub pool: Option<WorkerPool>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            simulation: SimulationConfig::default(),
            pool: None,
        }
    }
}

pub fn trial_seed(base_seed: u64, trial: usize) -> u64 {
    base_seed.wrapping_add(trial as u64)
}

/// One encounter with fresh rosters and its own dice stream.
pub fn run_trial(seed: u64, config: &SimulationConfig) -> TrialResult {
    let mut rng = Rng::new(seed);
    let party = build_party_roster(&mut rng);
    let monsters = build_monster_roster(&mut rng);
    simulate_encounter(party, monsters, &mut rng, config).result
}

/// A seed drawn from the operating system.
pub fn entropy_seed() -> Result<u64, SimError> {
    let mut bytes = [0u8; 8];
    getrandom::getrandom(&mut bytes).map_err(SimError::Entropy)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Run `config.trials` encounters, handing each result to `sink` in trial order. Any sink
/// error aborts the run; nothing is retried.
pub fn run_batch<S: TrialSink + ?Sized>(
    config: &BatchConfig,
    sink: &mut S,
) -> Result<BatchSummary, SimError> {
    let base_seed = match config.seed {
        Some(seed) => seed,
        None => entropy_seed()?,
    };
    // Batches never need per-event traces.
    let simulation = SimulationConfig {
        trace_mode: TraceMode::Off,
        ..config.simulation
    };
    info!(
        trials = config.trials,
        base_seed,
        parallel = config.pool.is_some(),
        "starting batch"
    );

    let mut summary = BatchSummary::new(Some(base_seed));
    let mut record = |result: TrialResult| -> Result<(), SimError> {
        sink.record_trial(&result)?;
        summary.record(&result);
        Ok(())
    };

    match config.pool {
        None => {
            for trial in 0..config.trials {
                record(run_trial(trial_seed(base_seed, trial), &simulation))?;
            }
        }
        Some(pool) => {
            let pool = pool.build()?;
            let chunks = config.trials.div_ceil(PARALLEL_CHUNK);
            for (start, end) in batch_ranges(config.trials, chunks) {
                let simulate = || simulate_range(start..end, base_seed, &simulation);
                let results = match &pool {
                    Some(pool) => pool.install(simulate),
                    None => simulate(),
                };
                debug!(start, end, "chunk simulated");
                results.into_iter().try_for_each(&mut record)?;
            }
        }
    }

    sink.finish()?;
    info!(
        trials = summary.trials,
        pcs_wins = summary.pcs_wins,
        monster_wins = summary.monster_wins,
        ties = summary.ties,
        stalemates = summary.stalemates,
        "batch finished"
    );
    Ok(summary)
}
