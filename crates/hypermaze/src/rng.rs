//! Random value source for maze generation.
//!
//! Generation draws from a seedable [`RandomSource`]; sub-cell opening
//! placement instead uses the stateless [`opening_coordinate`] projector so
//! that openings land in the same spot every redraw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Uniform integer in `[floor, ceiling]`, both bounds inclusive.
    pub fn rand_int(&mut self, floor: i32, ceiling: i32) -> i32 {
        debug_assert!(floor <= ceiling);
        self.rng.random_range(floor..=ceiling)
    }

    /// Fair coin flip.
    pub fn rand_bool(&mut self) -> bool {
        self.rng.random()
    }

    /// True with probability 1 in `chance`. A chance of zero always yields
    /// true, matching the division guard of the capability contract.
    pub fn rand_bool_one_in(&mut self, chance: i32) -> bool {
        if chance == 0 {
            return true;
        }
        debug_assert!(chance > 0);
        self.rand_int(0, chance - 1) == 0
    }
}

/// Deterministic center coordinate for an opening within a cell interior.
///
/// `constant` folds in the cell coordinates orthogonal to the opening axis,
/// `variable` the coordinate along it, and `parity` selects the X (1) or
/// Y (3) component. The same inputs always produce the same center, placed so
/// an opening of `opening_scale` fits inside `interior_scale`.
pub fn opening_coordinate(
    constant: i32,
    variable: i32,
    parity: i32,
    interior_scale: i32,
    opening_scale: i32,
) -> i32 {
    let delta = variable - parity;

    // Section 0 spans the whole interior; sections 1 and 2 restrict the
    // center to the first or second half.
    let section = if delta % 4 == 0 {
        0
    } else if (delta % 8).abs() > 4 {
        (delta.abs() % 8 + 1) % 2 + 1
    } else {
        delta.abs() % 8 % 2 + 1
    };

    let span = interior_scale / if section == 0 { 1 } else { 2 } - opening_scale + 1;
    debug_assert!(span > 0);
    let add_back = (interior_scale / 2) * if section == 0 { 0 } else { section - 1 }
        + opening_scale / 2;

    let mixed = constant as i64 * variable as i64 + variable as i64;
    let offset = (mixed % span as i64).unsigned_abs() as i32;

    offset + add_back
}
