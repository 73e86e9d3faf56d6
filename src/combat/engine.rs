//! Encounter resolution.
//!
//! Every round each combatant rolls initiative, then initiative tiers are swept from highest to
//! lowest. Within a tier the party acts first and then the monsters, but casualties are only
//! removed once the tier is over, so combatants sharing a tier strike simultaneously.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::combatant::{initiative_order, AttackOutcome, Combatant, Role};
use crate::combat::rng::DiceSource;
use crate::config::HouseRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Pcs,
    Monsters,
    Tie,
    /// The round cap fired with both sides still standing.
    Stalemate,
}

impl Winner {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pcs => "pcs",
            Self::Monsters => "monsters",
            Self::Tie => "tie",
            Self::Stalemate => "stalemate",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Winner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pcs" => Ok(Self::Pcs),
            "monsters" => Ok(Self::Monsters),
            "tie" => Ok(Self::Tie),
            "stalemate" => Ok(Self::Stalemate),
            other => Err(format!("unknown winner '{other}'")),
        }
    }
}

/// One row of the results table. Hit point totals cover survivors only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub winner: Winner,
    pub rounds: u32,
    pub pcs: u32,
    pub pchp: i32,
    pub pcdam: i32,
    pub monsters: u32,
    pub monsterhp: i32,
    pub monsterdam: i32,
}

impl TrialResult {
    fn from_survivors(
        winner: Winner,
        rounds: u32,
        party: &[Combatant],
        monsters: &[Combatant],
    ) -> Self {
        Self {
            winner,
            rounds,
            pcs: party.len() as u32,
            pchp: party.iter().map(|c| c.max_hp).sum(),
            pcdam: party.iter().map(Combatant::damage_taken).sum(),
            monsters: monsters.len() as u32,
            monsterhp: monsters.iter().map(|c| c.max_hp).sum(),
            monsterdam: monsters.iter().map(Combatant::damage_taken).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    #[default]
    Off,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Party,
    Monsters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Melee,
    Ranged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    /// Everyone standing, in acting order for the round.
    Initiative {
        round: u32,
        order: Vec<InitiativeEntry>,
    },
    Attack {
        round: u32,
        tier: i32,
        side: Side,
        kind: AttackKind,
        attacker: Role,
        attacker_slot: usize,
        target: Role,
        target_slot: usize,
        roll: i32,
        hit: bool,
        damage: i32,
    },
    Spell {
        round: u32,
        tier: i32,
        side: Side,
        caster: Role,
        caster_slot: usize,
        target: Role,
        target_slot: usize,
        damage: i32,
    },
    Hold {
        round: u32,
        tier: i32,
        side: Side,
        role: Role,
        slot: usize,
    },
    Slain {
        round: u32,
        tier: i32,
        side: Side,
        role: Role,
        hp: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiativeEntry {
    pub side: Side,
    pub role: Role,
    pub slot: usize,
    pub initiative: i32,
}

/// Collects combat events when tracing is on; recording is a no-op otherwise.
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    mode: TraceMode,
    events: Vec<CombatEvent>,
}

impl TraceCollector {
    pub fn new(mode: TraceMode) -> Self {
        Self {
            mode,
            events: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.mode == TraceMode::Events
    }

    pub fn record(&mut self, event: impl FnOnce() -> CombatEvent) {
        if self.enabled() {
            self.events.push(event());
        }
    }

    pub fn into_events(self) -> Vec<CombatEvent> {
        self.events
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub rules: HouseRules,
    pub trace_mode: TraceMode,
}

/// Final state of one encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterReport {
    pub result: TrialResult,
    pub party: Vec<Combatant>,
    pub monsters: Vec<Combatant>,
    /// In order of death.
    pub dead: Vec<Combatant>,
    pub events: Vec<CombatEvent>,
}

/// What a combatant does with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CastSpell,
    Melee { target: usize },
    Ranged { target: usize },
    Hold,
}

/// Choose the action for the combatant in `slot` facing `foes` opponents. Spells come first
/// when the side may cast, then melee from the front line, then missiles while enough foes
/// are left to make them worthwhile.
pub fn choose_action(
    actor: &Combatant,
    slot: usize,
    foes: usize,
    can_cast: bool,
    rules: &HouseRules,
) -> Action {
    if foes == 0 {
        return Action::Hold;
    }
    let target = slot.min(foes - 1);
    if can_cast && actor.spells > 0 {
        Action::CastSpell
    } else if slot < rules.front_line {
        Action::Melee { target }
    } else if actor.missiles > 0 && foes > rules.ranged_min_foes {
        Action::Ranged { target }
    } else {
        Action::Hold
    }
}

struct Tier<'a, D: ?Sized> {
    round: u32,
    tier: i32,
    rules: &'a HouseRules,
    dice: &'a mut D,
    trace: &'a mut TraceCollector,
}

impl<D: DiceSource + ?Sized> Tier<'_, D> {
    /// Everyone on `side` whose initiative matches this tier takes one action against `foes`.
    fn act(&mut self, side: Side, actors: &mut [Combatant], foes: &mut [Combatant]) {
        let (round, tier) = (self.round, self.tier);
        let can_cast = side == Side::Party;

        for slot in 0..actors.len() {
            if foes.is_empty() || actors[slot].initiative != tier {
                continue;
            }
            let actor = &mut actors[slot];
            match choose_action(actor, slot, foes.len(), can_cast, self.rules) {
                Action::CastSpell => {
                    let target_slot = self.dice.roll(1, foes.len() as u32, -1) as usize;
                    let target = &mut foes[target_slot];
                    let damage = actor.cast_spell(target, self.rules.spell_damage, self.dice);
                    let (caster, target_role) = (actor.role, target.role);
                    self.trace.record(|| CombatEvent::Spell {
                        round,
                        tier,
                        side,
                        caster,
                        caster_slot: slot,
                        target: target_role,
                        target_slot,
                        damage,
                    });
                }
                Action::Melee { target } => {
                    let outcome = actor.melee_attack(&mut foes[target], self.dice);
                    self.record_attack(
                        side,
                        AttackKind::Melee,
                        actor.role,
                        slot,
                        &foes[target],
                        target,
                        outcome,
                    );
                }
                Action::Ranged { target } => {
                    let outcome = actor.ranged_attack(&mut foes[target], self.dice);
                    self.record_attack(
                        side,
                        AttackKind::Ranged,
                        actor.role,
                        slot,
                        &foes[target],
                        target,
                        outcome,
                    );
                }
                Action::Hold => {
                    let role = actor.role;
                    self.trace.record(|| CombatEvent::Hold {
                        round,
                        tier,
                        side,
                        role,
                        slot,
                    });
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record_attack(
        &mut self,
        side: Side,
        kind: AttackKind,
        attacker: Role,
        attacker_slot: usize,
        target: &Combatant,
        target_slot: usize,
        outcome: AttackOutcome,
    ) {
        let (round, tier, target) = (self.round, self.tier, target.role);
        self.trace.record(|| CombatEvent::Attack {
            round,
            tier,
            side,
            kind,
            attacker,
            attacker_slot,
            target,
            target_slot,
            roll: outcome.roll,
            hit: outcome.hit,
            damage: outcome.damage,
        });
    }

    /// Move the fallen from `roster` to `dead`, keeping survivors in order.
    fn reap(&mut self, side: Side, roster: &mut Vec<Combatant>, dead: &mut Vec<Combatant>) {
        if roster.iter().all(|c| !c.is_dead()) {
            return;
        }
        let (fallen, standing): (Vec<Combatant>, Vec<Combatant>) =
            roster.drain(..).partition(Combatant::is_dead);
        *roster = standing;
        let (round, tier) = (self.round, self.tier);
        for victim in &fallen {
            self.trace.record(|| CombatEvent::Slain {
                round,
                tier,
                side,
                role: victim.role,
                hp: victim.hp,
            });
        }
        dead.extend(fallen);
    }
}

fn record_initiative(
    trace: &mut TraceCollector,
    round: u32,
    party: &[Combatant],
    monsters: &[Combatant],
) {
    if !trace.enabled() {
        return;
    }
    let mut standing: Vec<(Side, usize, &Combatant)> = party
        .iter()
        .enumerate()
        .map(|(slot, c)| (Side::Party, slot, c))
        .chain(monsters.iter().enumerate().map(|(slot, c)| (Side::Monsters, slot, c)))
        .collect();
    standing.sort_by(|a, b| initiative_order(a.2, b.2));
    let order = standing
        .into_iter()
        .map(|(side, slot, c)| InitiativeEntry {
            side,
            role: c.role,
            slot,
            initiative: c.initiative,
        })
        .collect();
    trace.record(|| CombatEvent::Initiative { round, order });
}

/// Fight `party` against `monsters` until one side (or both) is gone, or the round cap fires.
pub fn simulate_encounter<D: DiceSource + ?Sized>(
    mut party: Vec<Combatant>,
    mut monsters: Vec<Combatant>,
    dice: &mut D,
    config: &SimulationConfig,
) -> EncounterReport {
    let rules = &config.rules;
    let mut trace = TraceCollector::new(config.trace_mode);
    let mut dead = Vec::new();
    let mut round = 0u32;
    let mut capped = false;

    while !party.is_empty() && !monsters.is_empty() {
        if rules.max_rounds.is_some_and(|cap| round >= cap) {
            capped = true;
            break;
        }
        round += 1;
        trace.record(|| CombatEvent::RoundStarted { round });

        for combatant in party.iter_mut().chain(monsters.iter_mut()) {
            combatant.roll_initiative(dice);
        }
        record_initiative(&mut trace, round, &party, &monsters);

        for tier in rules.tiers() {
            let mut step = Tier {
                round,
                tier,
                rules,
                dice: &mut *dice,
                trace: &mut trace,
            };
            step.act(Side::Party, &mut party, &mut monsters);
            step.act(Side::Monsters, &mut monsters, &mut party);
            step.reap(Side::Party, &mut party, &mut dead);
            step.reap(Side::Monsters, &mut monsters, &mut dead);
        }
    }

    let winner = if capped {
        Winner::Stalemate
    } else {
        match (party.is_empty(), monsters.is_empty()) {
            (false, true) => Winner::Pcs,
            (true, false) => Winner::Monsters,
            _ => Winner::Tie,
        }
    };

    EncounterReport {
        result: TrialResult::from_survivors(winner, round, &party, &monsters),
        party,
        monsters,
        dead,
        events: trace.into_events(),
    }
}
