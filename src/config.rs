//! House-rule constants for the combat resolver.
//!
//! Defaults reproduce the reference rules exactly; a JSON rules file may override any subset
//! of fields (missing keys keep their default).

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::DamageSpec;

pub const DEFAULT_MAX_ROUNDS: u32 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rules file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rules file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid rules: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseRules {
    /// Highest initiative tier swept each round.
    pub tier_high: i32,
    /// Lowest initiative tier swept each round (inclusive).
    pub tier_low: i32,
    /// Roster slots below this index fight in melee.
    pub front_line: usize,
    /// Ranged attacks need strictly more than this many foes standing.
    pub ranged_min_foes: usize,
    /// Damage of one spell charge.
    pub spell_damage: DamageSpec,
    /// Rounds fought before the encounter is called a stalemate. `None` fights forever.
    pub max_rounds: Option<u32>,
}

impl Default for HouseRules {
    fn default() -> Self {
        Self {
            tier_high: 9,
            tier_low: -2,
            front_line: 2,
            ranged_min_foes: 2,
            spell_damage: DamageSpec::new(1, 6, 1),
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
        }
    }
}

impl HouseRules {
    /// Initiative tiers in sweep order, highest first.
    pub fn tiers(&self) -> impl Iterator<Item = i32> {
        RangeInclusive::new(self.tier_low, self.tier_high).rev()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tier_low > self.tier_high {
            return Err(ConfigError::Invalid(format!(
                "tier_low {} is above tier_high {}",
                self.tier_low, self.tier_high
            )));
        }
        if self.spell_damage.count == 0 || self.spell_damage.sides == 0 {
            return Err(ConfigError::Invalid(
                "spell_damage needs at least one die with at least one side".to_string(),
            ));
        }
        if self.max_rounds == Some(0) {
            return Err(ConfigError::Invalid("max_rounds must be positive".to_string()));
        }
        Ok(())
    }
}

/// Load house rules from a JSON file and validate them.
pub fn load_rules(path: impl AsRef<Path>) -> Result<HouseRules, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    let rules: HouseRules = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })?;
    rules.validate()?;
    Ok(rules)
}
