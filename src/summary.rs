//! Aggregate statistics over a batch of trials.

use serde::Serialize;

use crate::combat::{TrialResult, Winner};

/// Running totals of a batch. Feed it every trial with [`BatchSummary::record`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Seed of trial 0; trial `i` used `base_seed + i`. Absent for summaries of stored runs.
    pub base_seed: Option<u64>,
    pub trials: u64,
    pub pcs_wins: u64,
    pub monster_wins: u64,
    pub ties: u64,
    pub stalemates: u64,
    pub pc_win_rate: f64,
    pub mean_rounds: f64,
    pub max_rounds: u32,
    pub mean_pcs_surviving: f64,
    pub mean_monsters_surviving: f64,
    pub mean_pc_damage: f64,
    pub mean_monster_damage: f64,
    #[serde(skip)]
    totals: Totals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    rounds: u64,
    pcs: u64,
    monsters: u64,
    pcdam: i64,
    monsterdam: i64,
}

impl BatchSummary {
    pub fn new(base_seed: Option<u64>) -> Self {
        Self {
            base_seed,
            ..Self::default()
        }
    }

    pub fn from_trials<'a>(trials: impl IntoIterator<Item = &'a TrialResult>) -> Self {
        let mut summary = Self::default();
        for trial in trials {
            summary.record(trial);
        }
        summary
    }

    pub fn record(&mut self, trial: &TrialResult) {
        self.trials += 1;
        match trial.winner {
            Winner::Pcs => self.pcs_wins += 1,
            Winner::Monsters => self.monster_wins += 1,
            Winner::Tie => self.ties += 1,
            Winner::Stalemate => self.stalemates += 1,
        }
        self.max_rounds = self.max_rounds.max(trial.rounds);
        self.totals.rounds += u64::from(trial.rounds);
        self.totals.pcs += u64::from(trial.pcs);
        self.totals.monsters += u64::from(trial.monsters);
        self.totals.pcdam += i64::from(trial.pcdam);
        self.totals.monsterdam += i64::from(trial.monsterdam);

        let n = self.trials as f64;
        self.pc_win_rate = self.pcs_wins as f64 / n;
        self.mean_rounds = self.totals.rounds as f64 / n;
        self.mean_pcs_surviving = self.totals.pcs as f64 / n;
        self.mean_monsters_surviving = self.totals.monsters as f64 / n;
        self.mean_pc_damage = self.totals.pcdam as f64 / n;
        self.mean_monster_damage = self.totals.monsterdam as f64 / n;
    }
}
