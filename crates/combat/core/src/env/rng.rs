//! RNG oracle for deterministic random number generation.
//!
//! Every roll in an encounter (initiative, to-hit, damage, opposed checks,
//! multi-attack triggers, target picks) goes through [`RngOracle`] with a seed
//! derived from the encounter seed and a per-encounter roll counter. Given the
//! same encounter seed and the same inputs, a fight replays identically.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::types::CombatantId;

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides) + 1
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// Implements the PCG-XSH-RR variant: 32-bit output from 64-bit state.
/// Stateless; every call derives its state from the supplied seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Replays a fixed list of raw values, ignoring the seed.
///
/// A raw value `v` rolled on an N-sided die yields `v % N + 1`, so `19`
/// produces a natural 20 on a d20 and `0` produces a 1 on any die. The list
/// wraps around when exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    cursor: AtomicUsize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of values consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl RngOracle for SequenceRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[index % self.values.len()]
    }
}

/// Compute deterministic seed from encounter components.
///
/// * `encounter_seed` - Seed fixed when the encounter is created
/// * `nonce` - Roll sequence number within the encounter
/// * `actor_id` - Combatant the roll is made for
/// * `context` - Distinguishes independent rolls sharing a nonce
pub fn compute_seed(encounter_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = encounter_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Per-encounter roll stream: an encounter seed plus a monotonically
/// increasing nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dice {
    seed: u64,
    nonce: u64,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self { seed, nonce: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rolls made so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Rolls a die with `sides` faces (1..=sides). A zero-sided die rolls 0.
    pub fn roll(&mut self, rng: &dyn RngOracle, actor: CombatantId, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        let seed = compute_seed(self.seed, self.nonce, actor.0 as u32, sides);
        self.nonce += 1;
        rng.roll_die(seed, sides)
    }

    pub fn d20(&mut self, rng: &dyn RngOracle, actor: CombatantId) -> u32 {
        self.roll(rng, actor, 20)
    }

    pub fn d100(&mut self, rng: &dyn RngOracle, actor: CombatantId) -> u32 {
        self.roll(rng, actor, 100)
    }

    /// Picks an index in `0..len`, or `None` for an empty range.
    pub fn pick(&mut self, rng: &dyn RngOracle, actor: CombatantId, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let sides = u32::try_from(len).unwrap_or(u32::MAX);
        Some((self.roll(rng, actor, sides) - 1) as usize)
    }
}
