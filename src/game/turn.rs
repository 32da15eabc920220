use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::Slot;

/// Decides which slot moves first in each new game
pub enum TurnPolicy {
    /// Always the same slot
    Fixed(Slot),
    /// Coin flip per game, reproducible for a given seed
    Random(StdRng),
}

impl TurnPolicy {
    pub fn fixed(slot: Slot) -> Self {
        TurnPolicy::Fixed(slot)
    }

    /// Seeded coin flip; `None` seeds from the operating system
    pub fn random(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        TurnPolicy::Random(rng)
    }

    pub fn starting_slot(&mut self) -> Slot {
        match self {
            TurnPolicy::Fixed(slot) => *slot,
            TurnPolicy::Random(rng) => {
                if rng.random_bool(0.5) {
                    Slot::One
                } else {
                    Slot::Two
                }
            }
        }
    }
}

impl Default for TurnPolicy {
    fn default() -> Self {
        TurnPolicy::Fixed(Slot::One)
    }
}

impl fmt::Debug for TurnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnPolicy::Fixed(slot) => f.debug_tuple("Fixed").field(slot).finish(),
            TurnPolicy::Random(_) => f.write_str("Random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_starts_with_slot_one() {
        let mut policy = TurnPolicy::default();
        for _ in 0..10 {
            assert_eq!(policy.starting_slot(), Slot::One);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = TurnPolicy::random(Some(42));
        let mut b = TurnPolicy::random(Some(42));
        let seq_a: Vec<Slot> = (0..32).map(|_| a.starting_slot()).collect();
        let seq_b: Vec<Slot> = (0..32).map(|_| b.starting_slot()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_random_policy_uses_both_slots() {
        let mut policy = TurnPolicy::random(Some(7));
        let slots: Vec<Slot> = (0..64).map(|_| policy.starting_slot()).collect();
        assert!(slots.contains(&Slot::One));
        assert!(slots.contains(&Slot::Two));
    }
}
