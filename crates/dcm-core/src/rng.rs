//! Deterministic draw streams keyed by decision unit and purpose.
//!
//! # Determinism strategy
//!
//! Every realized choice draws from a generator reseeded by:
//!
//!   seed = global_seed XOR (unit_id * UNIT_MIXING) XOR (purpose * PURPOSE_MIXING)
//!
//! Both mixing constants are fixed odd 64-bit multipliers (the first is the
//! fractional part of the golden ratio), which spread consecutive unit ids
//! and purpose constants uniformly across the seed space.  This means:
//!
//! - The same (unit, purpose) pair draws the same sequence on any worker,
//!   in any processing order, in any run with the same global seed.
//! - Adding models (new purposes) or units never disturbs the draws of
//!   existing (unit, purpose) pairs.
//! - All draws are local to the owning worker; no synchronisation needed.
//!
//! A model that simulates repeated choices for one entity (e.g. several
//! tours per person) derives the n-th stream with [`Purpose::offset`]
//! rather than consuming extra values from the first stream, so inserting
//! a tour never shifts the draws of its siblings.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::UnitId;

/// 64-bit fractional golden-ratio constant for unit-id seed mixing.
const UNIT_MIXING: u64 = 0x9e37_79b9_7f4a_7c15;

/// Second fixed odd constant for the purpose axis, so (unit, purpose)
/// never collapses to an XOR of two small integers.
const PURPOSE_MIXING: u64 = 0xc2b2_ae3d_27d4_eb4f;

// ── Purpose ───────────────────────────────────────────────────────────────────

/// Model-specific purpose constant mixed into every draw-stream seed.
///
/// Each model declares one fixed `Purpose`; two models never share a value,
/// so their draws for the same unit are independent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Purpose(pub u32);

impl Purpose {
    /// Purpose for the `n`-th repeated choice by the same entity.
    #[inline]
    pub fn offset(self, n: u32) -> Purpose {
        Purpose(self.0 + n)
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Purpose({})", self.0)
    }
}

// ── DrawStream ────────────────────────────────────────────────────────────────

/// Reseedable deterministic uniform stream for one worker.
///
/// Create one per worker at pass startup and [`reseed`][Self::reseed] it for
/// every decision unit.  The type is `Send` but deliberately not shared:
/// each worker owns its stream exclusively.
pub struct DrawStream {
    global_seed: u64,
    rng:         SmallRng,
}

impl DrawStream {
    /// Create a stream for `global_seed`.  Call [`reseed`][Self::reseed]
    /// before drawing for a unit.
    pub fn new(global_seed: u64) -> Self {
        DrawStream {
            global_seed,
            rng: SmallRng::seed_from_u64(global_seed),
        }
    }

    /// One-step construction: a stream already positioned for `(unit, purpose)`.
    pub fn for_unit(global_seed: u64, unit: UnitId, purpose: Purpose) -> Self {
        let mut stream = DrawStream::new(global_seed);
        stream.reseed(unit, purpose);
        stream
    }

    /// Re-derive the generator state from the fixed hash of `(unit, purpose)`.
    ///
    /// Reseeding with the same pair always restarts the identical sequence,
    /// regardless of which worker calls it or how many draws were consumed
    /// since the last reseed.
    pub fn reseed(&mut self, unit: UnitId, purpose: Purpose) {
        let seed = self.global_seed
            ^ unit.0.wrapping_mul(UNIT_MIXING)
            ^ (purpose.0 as u64).wrapping_mul(PURPOSE_MIXING);
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// The global seed this stream derives all unit seeds from.
    #[inline]
    pub fn global_seed(&self) -> u64 {
        self.global_seed
    }

    /// One uniform draw in `[0, 1)`.  Exactly one is consumed per realized
    /// choice.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Normal draw by the Kinderman-Monahan ratio-of-uniforms method with
    /// quadratic bounding curves (ACM algorithm 712).
    ///
    /// Consumes only [`uniform`][Self::uniform] values (two per attempt,
    /// acceptance rate ≈ 0.73), keeping draw accounting uniform-based.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        const S: f64 = 0.449871;
        const T: f64 = -0.386595;
        const A: f64 = 0.196;
        const B: f64 = 0.25472;
        const R1: f64 = 0.27597;
        const R2: f64 = 0.27846;
        const VMULT: f64 = 1.7156;
        const TINY: f64 = 1e-12;

        loop {
            let mut u = self.uniform();
            while u < TINY {
                u = self.uniform();
            }
            let v = VMULT * (self.uniform() - 0.5);

            // Quadratic form around the acceptance region.
            let x = u - S;
            let y = v.abs() - T;
            let q = x * x + y * (A * y - B * x);

            // Accept inside the inner ellipse, or after the exact log test
            // between the bounding curves.
            if q < R1 || (q <= R2 && v * v < -4.0 * u.ln() * u * u) {
                return mean + std_dev * (v / u);
            }
        }
    }

    /// Log-normal draw with the given arithmetic mean and standard deviation
    /// (moment-matched to the underlying normal).  Non-positive parameters
    /// yield 0.
    pub fn log_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        const TINY: f64 = 1e-12;

        if mean <= TINY || std_dev <= TINY {
            return 0.0;
        }

        let c = std_dev / mean;
        let c_sqr = c * c;
        let m = mean.ln() - 0.5 * (c_sqr + 1.0).ln();
        let s = (c_sqr + 1.0).ln().sqrt();

        self.normal(m, s).exp()
    }
}
