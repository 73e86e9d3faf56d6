//! The fixed party and the fixed goblin band.
//!
//! Roster order matters: slots 0 and 1 are the front line.

use crate::combat::combatant::{Combatant, DamageSpec, Role};
use crate::combat::rng::DiceSource;

pub const PARTY_SIZE: usize = 4;
pub const GOBLIN_COUNT: usize = 4;

/// House rule: roll the hit die twice and keep the better result.
pub fn roll_hit_points<D: DiceSource + ?Sized>(dice: &mut D, hit_die: u32) -> i32 {
    let first = dice.roll(1, hit_die, 0);
    let second = dice.roll(1, hit_die, 0);
    first.max(second)
}

/// Fighter, cleric, thief, magic-user, in that order.
pub fn build_party_roster<D: DiceSource + ?Sized>(dice: &mut D) -> Vec<Combatant> {
    let fighter = Combatant {
        armor_class: 16,
        attack_bonus: 2,
        melee_damage: DamageSpec::new(1, 8, 1),
        ..Combatant::new(Role::Fighter, roll_hit_points(dice, 8))
    };
    let cleric = Combatant {
        armor_class: 16,
        melee_damage: DamageSpec::new(1, 8, 0),
        ..Combatant::new(Role::Cleric, roll_hit_points(dice, 6))
    };
    let thief = Combatant {
        armor_class: 14,
        missiles: 5,
        missile_bonus: 2,
        missile_damage: DamageSpec::new(1, 4, 0),
        ..Combatant::new(Role::Thief, roll_hit_points(dice, 4))
    };
    let magic_user = Combatant {
        armor_class: 11,
        spells: 1,
        missiles: 5,
        missile_bonus: 1,
        missile_damage: DamageSpec::new(1, 4, 0),
        ..Combatant::new(Role::MagicUser, roll_hit_points(dice, 4))
    };

    vec![fighter, cleric, thief, magic_user]
}

/// Four goblins with `1d8-1` hit points, never fewer than 1.
pub fn build_monster_roster<D: DiceSource + ?Sized>(dice: &mut D) -> Vec<Combatant> {
    (0..GOBLIN_COUNT)
        .map(|_| Combatant {
            armor_class: 14,
            ..Combatant::new(Role::Goblin, dice.roll(1, 8, -1).max(1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::{FixedDice, Rng};

    #[test]
    fn party_order_and_stats() {
        let party = build_party_roster(&mut FixedDice::Maximum);

        let roles: Vec<Role> = party.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![Role::Fighter, Role::Cleric, Role::Thief, Role::MagicUser]
        );
        let hp: Vec<i32> = party.iter().map(|c| c.max_hp).collect();
        assert_eq!(hp, vec![8, 6, 4, 4]);
        let ac: Vec<i32> = party.iter().map(|c| c.armor_class).collect();
        assert_eq!(ac, vec![16, 16, 14, 11]);

        assert_eq!(party[0].attack_bonus, 2);
        assert_eq!(party[1].attack_bonus, 1);
        assert_eq!(party[2].missiles, 5);
        assert_eq!(party[2].missile_bonus, 2);
        assert_eq!(party[3].spells, 1);
        assert_eq!(party[3].missile_bonus, 1);
        assert!(party.iter().all(|c| c.hp == c.max_hp));
    }

    #[test]
    fn goblins_never_start_below_one_hit_point() {
        let goblins = build_monster_roster(&mut FixedDice::Minimum);
        assert_eq!(goblins.len(), GOBLIN_COUNT);
        assert!(goblins.iter().all(|g| g.hp == 1 && g.armor_class == 14));
        assert!(goblins.iter().all(|g| g.missiles == 0 && g.spells == 0));

        let goblins = build_monster_roster(&mut FixedDice::Maximum);
        assert!(goblins.iter().all(|g| g.hp == 7));
    }

    #[test]
    fn best_of_two_is_never_below_either_roll() {
        for seed in 0..200 {
            let mut rng = Rng::new(seed);
            let mut replay = rng;
            let hp = roll_hit_points(&mut rng, 8);
            let first = replay.roll(1, 8, 0);
            let second = replay.roll(1, 8, 0);
            assert_eq!(hp, first.max(second));
            assert!(hp >= first && hp >= second);
        }
    }

    #[test]
    fn random_party_hit_points_stay_within_hit_dice() {
        let mut rng = Rng::new(21);
        for _ in 0..1_000 {
            let party = build_party_roster(&mut rng);
            for (member, die) in party.iter().zip([8, 6, 4, 4]) {
                assert!((1..=die).contains(&member.max_hp));
            }
        }
    }
}
