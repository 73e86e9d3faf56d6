use std::collections::VecDeque;

use bfrpg_sim::combat::{
    build_monster_roster, build_party_roster, simulate_encounter, CombatEvent, Combatant,
    DiceSource, EncounterReport, FixedDice, Rng, Role, SimulationConfig, TraceMode, Winner,
    GOBLIN_COUNT, PARTY_SIZE,
};
use bfrpg_sim::config::HouseRules;

/// Replays a fixed list of faces, whatever the die size.
struct Scripted(VecDeque<u32>);

impl DiceSource for Scripted {
    fn die(&mut self, _sides: u32) -> u32 {
        self.0.pop_front().expect("script ran out of faces")
    }
}

fn fixed_encounter(mut dice: FixedDice, config: &SimulationConfig) -> EncounterReport {
    let party = build_party_roster(&mut dice);
    let monsters = build_monster_roster(&mut dice);
    simulate_encounter(party, monsters, &mut dice, config)
}

#[test]
fn minimum_rolls_stall_until_the_round_cap() {
    let report = fixed_encounter(FixedDice::Minimum, &SimulationConfig::default());
    let result = report.result;

    assert_eq!(result.winner, Winner::Stalemate);
    assert_eq!(result.rounds, 1000);
    assert_eq!(result.pcs, 4);
    assert_eq!(result.pchp, 4);
    assert_eq!(result.pcdam, 0);
    assert_eq!(result.monsters, 3);
    assert_eq!(result.monsterhp, 3);
    assert_eq!(result.monsterdam, 0);

    // Only the spell landed.
    assert_eq!(report.dead.len(), 1);
    assert_eq!(report.dead[0].role, Role::Goblin);
    let thief = &report.party[2];
    let magic_user = &report.party[3];
    assert_eq!((thief.missiles, magic_user.missiles, magic_user.spells), (0, 0, 0));
}

#[test]
fn lower_round_cap_is_honoured() {
    let config = SimulationConfig {
        rules: HouseRules {
            max_rounds: Some(7),
            ..HouseRules::default()
        },
        ..SimulationConfig::default()
    };
    let result = fixed_encounter(FixedDice::Minimum, &config).result;
    assert_eq!(result.winner, Winner::Stalemate);
    assert_eq!(result.rounds, 7);
}

#[test]
fn maximum_rolls_win_in_two_rounds() {
    let report = fixed_encounter(FixedDice::Maximum, &SimulationConfig::default());
    let result = report.result;

    assert_eq!(result.winner, Winner::Pcs);
    assert_eq!(result.rounds, 2);
    assert_eq!(result.pcs, 2);
    assert_eq!(result.pchp, 8);
    assert_eq!(result.pcdam, 0);
    assert_eq!(result.monsters, 0);
    assert_eq!(result.monsterhp, 0);
    assert_eq!(result.monsterdam, 0);

    let survivors: Vec<Role> = report.party.iter().map(|c| c.role).collect();
    assert_eq!(survivors, vec![Role::Thief, Role::MagicUser]);
    assert_eq!(report.dead.len(), 6);
}

#[test]
fn traced_maximum_encounter_records_every_kill() {
    let config = SimulationConfig {
        trace_mode: TraceMode::Events,
        ..SimulationConfig::default()
    };
    let report = fixed_encounter(FixedDice::Maximum, &config);

    let rounds = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::RoundStarted { .. }))
        .count();
    let slain = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Slain { .. }))
        .count();
    let spells = report
        .events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Spell { target_slot: 3, damage: 7, .. }))
        .count();
    assert_eq!(rounds, 2);
    assert_eq!(slain, report.dead.len());
    assert_eq!(spells, 1);

    let json = serde_json::to_value(&report.events).expect("events serialize");
    assert_eq!(json[0]["event"], "round_started");
}

#[test]
fn combatant_slain_in_a_higher_tier_never_acts() {
    let party = vec![Combatant::new(Role::Fighter, 5)];
    let monsters = vec![Combatant::new(Role::Goblin, 5)];
    // Initiative 6 then 3, the fighter's d20, then its 1d6 damage.
    let mut dice = Scripted([6, 3, 20, 6].into_iter().collect());

    let report = simulate_encounter(party, monsters, &mut dice, &SimulationConfig::default());

    assert_eq!(report.result.winner, Winner::Pcs);
    assert_eq!(report.result.rounds, 1);
    assert_eq!(report.result.pcdam, 0);
    assert_eq!(report.result.pchp, 5);
    // The goblin would have drawn more faces had it attacked.
    assert!(dice.0.is_empty());
}

#[test]
fn encounter_invariants_hold_across_seeds() {
    let config = SimulationConfig::default();
    for seed in 0..2_000u64 {
        let mut rng = Rng::new(seed);
        let party = build_party_roster(&mut rng);
        let monsters = build_monster_roster(&mut rng);
        let missiles_before: u32 = party.iter().map(|c| c.missiles).sum();
        let report = simulate_encounter(party, monsters, &mut rng, &config);
        let result = report.result;

        assert!(result.rounds >= 1, "seed {seed}");
        assert!(result.pcs as usize <= PARTY_SIZE);
        assert!(result.monsters as usize <= GOBLIN_COUNT);
        assert!(result.pcdam <= 0 && result.monsterdam <= 0, "seed {seed}");
        assert_eq!(result.pcs as usize, report.party.len());
        assert_eq!(result.monsters as usize, report.monsters.len());
        assert_eq!(
            report.party.len() + report.monsters.len() + report.dead.len(),
            PARTY_SIZE + GOBLIN_COUNT
        );

        for survivor in report.party.iter().chain(&report.monsters) {
            assert!(survivor.hp >= 1 && survivor.hp <= survivor.max_hp, "seed {seed}");
        }
        assert!(report.dead.iter().all(|c| c.is_dead()));

        let missiles_after: u32 = report
            .party
            .iter()
            .chain(report.dead.iter().filter(|c| c.role != Role::Goblin))
            .map(|c| c.missiles)
            .sum();
        assert!(missiles_after <= missiles_before, "seed {seed}");

        let expected = match (result.pcs, result.monsters) {
            (0, 0) => Winner::Tie,
            (_, 0) => Winner::Pcs,
            (0, _) => Winner::Monsters,
            _ => Winner::Stalemate,
        };
        assert_eq!(result.winner, expected, "seed {seed}");
    }
}

#[test]
fn same_seed_replays_the_same_fight() {
    let config = SimulationConfig {
        trace_mode: TraceMode::Events,
        ..SimulationConfig::default()
    };
    let fight = |seed| {
        let mut rng = Rng::new(seed);
        let party = build_party_roster(&mut rng);
        let monsters = build_monster_roster(&mut rng);
        simulate_encounter(party, monsters, &mut rng, &config)
    };
    let first = fight(99);
    let second = fight(99);
    assert_eq!(first.result, second.result);
    assert_eq!(first.events, second.events);
}

#[test]
fn dice_rolls_stay_within_bounds() {
    let mut rng = Rng::new(5);
    for _ in 0..10_000 {
        let d20 = rng.roll(1, 20, 0);
        assert!((1..=20).contains(&d20));
        let damage = rng.roll(1, 8, 1);
        assert!((2..=9).contains(&damage));
        let three = rng.roll(3, 6, -3);
        assert!((0..=15).contains(&three));
    }
}

#[test]
fn d6_is_uniform_by_chi_square() {
    const DRAWS: usize = 60_000;
    let mut rng = Rng::new(0xB0B);
    let mut counts = [0usize; 6];
    for _ in 0..DRAWS {
        counts[(rng.die(6) - 1) as usize] += 1;
    }
    let expected = DRAWS as f64 / 6.0;
    let chi_square: f64 = counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();
    // Five degrees of freedom; 25.7 is the 0.0001 critical value.
    assert!(chi_square < 25.7, "chi-square {chi_square} for counts {counts:?}");
}
