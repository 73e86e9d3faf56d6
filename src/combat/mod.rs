pub mod combatant;
pub mod engine;
pub mod rng;
pub mod roster;

pub use combatant::{initiative_order, AttackOutcome, Combatant, DamageSpec, Role};
pub use engine::{
    choose_action, simulate_encounter, Action, AttackKind, CombatEvent, EncounterReport,
    InitiativeEntry, Side, SimulationConfig, TraceCollector, TraceMode, TrialResult, Winner,
};
pub use rng::{DiceSource, FixedDice, Rng};
pub use roster::{
    build_monster_roster, build_party_roster, roll_hit_points, GOBLIN_COUNT, PARTY_SIZE,
};
