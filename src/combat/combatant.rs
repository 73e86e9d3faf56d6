use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::rng::DiceSource;

/// `count`d`sides`+`bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageSpec {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DamageSpec {
    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    pub fn roll<D: DiceSource + ?Sized>(&self, dice: &mut D) -> i32 {
        dice.roll(self.count, self.sides, self.bonus)
    }
}

impl fmt::Display for DamageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bonus.cmp(&0) {
            Ordering::Greater => write!(f, "{}d{}+{}", self.count, self.sides, self.bonus),
            Ordering::Less => write!(f, "{}d{}{}", self.count, self.sides, self.bonus),
            Ordering::Equal => write!(f, "{}d{}", self.count, self.sides),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Fighter,
    Cleric,
    Thief,
    MagicUser,
    Goblin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fighter => "fighter",
            Self::Cleric => "cleric",
            Self::Thief => "thief",
            Self::MagicUser => "magic-user",
            Self::Goblin => "goblin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    pub roll: i32,
    pub hit: bool,
    pub damage: i32,
}

/// One participant in one encounter. Hit points only ever go down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combatant {
    pub role: Role,
    pub max_hp: i32,
    pub hp: i32,
    pub initiative_modifier: i32,
    /// Rolled at the start of every round.
    pub initiative: i32,
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub melee_damage: DamageSpec,
    pub missiles: u32,
    pub missile_bonus: i32,
    pub missile_damage: DamageSpec,
    pub spells: u32,
}

impl Combatant {
    /// A combatant with `hp` hit points and baseline stats: AC 11, +1 to hit, 1d6 melee,
    /// no missiles (1d4 at +0 if given some), no spells.
    pub fn new(role: Role, hp: i32) -> Self {
        Self {
            role,
            max_hp: hp,
            hp,
            initiative_modifier: 0,
            initiative: 0,
            armor_class: 11,
            attack_bonus: 1,
            melee_damage: DamageSpec::new(1, 6, 0),
            missiles: 0,
            missile_bonus: 0,
            missile_damage: DamageSpec::new(1, 4, 0),
            spells: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp < 1
    }

    /// Hit points lost so far, as a non-positive number.
    pub fn damage_taken(&self) -> i32 {
        self.hp - self.max_hp
    }

    pub fn roll_initiative<D: DiceSource + ?Sized>(&mut self, dice: &mut D) {
        self.initiative = dice.roll(1, 6, self.initiative_modifier);
    }

    pub fn melee_attack<D: DiceSource + ?Sized>(
        &self,
        target: &mut Combatant,
        dice: &mut D,
    ) -> AttackOutcome {
        strike(self.attack_bonus, self.melee_damage, target, dice)
    }

    /// Spends one missile whether or not it hits.
    pub fn ranged_attack<D: DiceSource + ?Sized>(
        &mut self,
        target: &mut Combatant,
        dice: &mut D,
    ) -> AttackOutcome {
        assert!(self.missiles > 0, "{} fired with no missiles left", self.role);
        let outcome = strike(self.missile_bonus, self.missile_damage, target, dice);
        self.missiles -= 1;
        outcome
    }

    /// Spends one spell charge; the spell always lands. Returns the damage dealt.
    pub fn cast_spell<D: DiceSource + ?Sized>(
        &mut self,
        target: &mut Combatant,
        damage: DamageSpec,
        dice: &mut D,
    ) -> i32 {
        assert!(self.spells > 0, "{} cast with no spells left", self.role);
        let dealt = damage.roll(dice);
        target.hp -= dealt;
        self.spells -= 1;
        dealt
    }
}

fn strike<D: DiceSource + ?Sized>(
    bonus: i32,
    damage: DamageSpec,
    target: &mut Combatant,
    dice: &mut D,
) -> AttackOutcome {
    let roll = dice.roll(1, 20, bonus);
    if roll >= target.armor_class {
        let dealt = damage.roll(dice);
        target.hp -= dealt;
        AttackOutcome {
            roll,
            hit: true,
            damage: dealt,
        }
    } else {
        AttackOutcome {
            roll,
            hit: false,
            damage: 0,
        }
    }
}

/// Acting order within a round: higher initiative first. Equal initiative is simultaneous and
/// compares `Equal`, so a stable sort keeps roster order among them.
pub fn initiative_order(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative.cmp(&a.initiative)
}
