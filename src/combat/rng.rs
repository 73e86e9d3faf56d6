//! Dice for combat simulation. `Rng` is a SplitMix64 stream: fast, good statistical quality,
//! deterministic per seed. Not cryptographically secure.

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Source of die faces. Everything that rolls dice takes one of these, so a fight can be
/// replayed from a seed or forced through a degenerate case.
pub trait DiceSource {
    /// One face of a `sides`-sided die, uniform in `1..=sides`.
    fn die(&mut self, sides: u32) -> u32;

    /// `count` dice of `sides` sides, summed, plus `bonus`.
    fn roll(&mut self, count: u32, sides: u32, bonus: i32) -> i32 {
        debug_assert!(count >= 1 && sides >= 1, "invalid dice {count}d{sides}");
        let faces: i64 = (0..count).map(|_| i64::from(self.die(sides))).sum();
        // Saturates rather than wrapping on absurd dice.
        i32::try_from(faces).unwrap_or(i32::MAX).saturating_add(bonus)
    }
}

impl<D: DiceSource + ?Sized> DiceSource for &mut D {
    fn die(&mut self, sides: u32) -> u32 {
        (**self).die(sides)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform value in `0..bound`. Multiply-shift with rejection of the short low
    /// interval, so every value is exactly equally likely.
    #[inline]
    pub fn below(&mut self, bound: u32) -> u32 {
        assert!(bound > 0, "bound must be positive");
        let bound = u64::from(bound);
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let wide = u128::from(self.next_u64()) * u128::from(bound);
            if (wide as u64) >= threshold {
                return (wide >> 64) as u32;
            }
        }
    }
}

impl DiceSource for Rng {
    #[inline]
    fn die(&mut self, sides: u32) -> u32 {
        self.below(sides) + 1
    }
}

/// Dice that always land on the same extreme face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedDice {
    Minimum,
    Maximum,
}

impl DiceSource for FixedDice {
    fn die(&mut self, sides: u32) -> u32 {
        match self {
            Self::Minimum => 1,
            Self::Maximum => sides,
        }
    }
}
