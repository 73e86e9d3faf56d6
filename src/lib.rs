//! Monte Carlo simulator for a first-level party against a goblin band.
//!
//! [`combat`] resolves single encounters, [`batch`] repeats them and feeds each result to a
//! [`store::TrialSink`].

pub mod batch;
pub mod cli;
pub mod combat;
pub mod config;
pub mod error;
pub mod parallel;
pub mod store;
pub mod summary;
