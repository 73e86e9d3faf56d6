//! Run the encounter benchmark and optionally append one line to a log file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_simulator
//!   cargo run --release --bin benchmark_simulator -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, encounters_per_sec, encounters_per_min, rounds_per_sec, rounds_per_encounter).

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};

use bfrpg_sim::batch::run_trial;
use bfrpg_sim::combat::SimulationConfig;

// Run for at least this long or this many encounters
const MIN_DURATION_MS: u128 = 2000;
const MIN_ENCOUNTERS: u64 = 5_000;
const LOG_PATH: &str = "benchmark_log.csv";

fn main() -> Result<()> {
    let log = std::env::args().any(|a| a == "--log");
    let config = SimulationConfig::default();

    let start = Instant::now();
    let mut encounters: u64 = 0;
    let mut rounds: u64 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || encounters < MIN_ENCOUNTERS {
        rounds += u64::from(run_trial(encounters, &config).rounds);
        encounters += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    let encounters_per_sec = encounters as f64 / elapsed_secs;
    let encounters_per_min = encounters_per_sec * 60.0;
    let rounds_per_sec = rounds as f64 / elapsed_secs;
    let rounds_per_encounter = rounds as f64 / encounters as f64;

    println!("Encounter benchmark:");
    println!("  Encounters:     {}", encounters);
    println!("  Duration:       {:.2} s", elapsed_secs);
    println!("  Encounters/s:   {:.2}", encounters_per_sec);
    println!("  Encounters/min: {:.2}", encounters_per_min);
    println!("  Rounds/s:       {:.2}", rounds_per_sec);
    println!("  Rounds/fight:   {:.3}", rounds_per_encounter);

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!(
            "{},{:.4},{:.4},{:.4},{:.4}\n",
            date, encounters_per_sec, encounters_per_min, rounds_per_sec, rounds_per_encounter
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_PATH)
            .with_context(|| format!("open {LOG_PATH} for append"))?;
        if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
            file.write_all(
                b"date,encounters_per_sec,encounters_per_min,rounds_per_sec,rounds_per_encounter\n",
            )?;
        }
        file.write_all(line.as_bytes())
            .with_context(|| format!("write {LOG_PATH}"))?;
        file.flush()?;
        println!("Appended to {}", LOG_PATH);
    }
    Ok(())
}
