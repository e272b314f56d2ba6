//! cr-rng: random primitives for the combat rules engine
//!
//! Everything that rolls goes through [`RandomSource`]. The game uses the
//! seeded [`GameRng`]; tests that need to pin a particular roll use
//! [`RiggedRng`].

mod game;
mod rigged;

pub use game::GameRng;
pub use rigged::{Bias, RiggedRng};

/// Source of uniform random integers plus the derived helpers combat code
/// is written in terms of.
///
/// Only [`RandomSource::below`] must be implemented. All other methods are
/// built on it, so a rigged source controls every roll.
pub trait RandomSource {
    /// Uniform value in `0..n`. Must return 0 when `n == 0`.
    fn below(&mut self, n: u32) -> u32;

    /// Uniform value in `0..n`, or 0 when `n <= 0`.
    fn random2(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.below(n as u32) as i32
    }

    /// Same as [`RandomSource::random2`]; the name used by the collaborator
    /// contract.
    fn uniform(&mut self, n: i32) -> i32 {
        self.random2(n)
    }

    /// Inclusive range `lo..=hi`.
    fn random_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        lo + self.random2(hi - lo + 1)
    }

    /// True with probability `x / y`.
    fn chance(&mut self, x: i32, y: i32) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.random2(y) < x
    }

    /// True with probability `1 / n`.
    fn one_in(&mut self, n: i32) -> bool {
        if n <= 1 {
            return true;
        }
        self.random2(n) == 0
    }

    fn coinflip(&mut self) -> bool {
        self.random2(2) == 0
    }

    /// Sum of `n` rolls of `1..=sides`.
    fn dice(&mut self, n: i32, sides: i32) -> i32 {
        if sides <= 0 {
            return 0;
        }
        (0..n.max(0)).map(|_| 1 + self.random2(sides)).sum()
    }

    /// Average of `rolls` draws below `max`, biased toward the middle.
    fn random2avg(&mut self, max: i32, rolls: i32) -> i32 {
        let rolls = rolls.max(1);
        let mut sum = self.random2(max);
        for _ in 1..rolls {
            sum += self.random2(max + 1);
        }
        sum / rolls
    }

    /// `num / den`, rounding the remainder up with probability `rem / den`.
    fn div_rand_round(&mut self, num: i32, den: i32) -> i32 {
        if den == 0 {
            return 0;
        }
        let rem = num % den;
        if rem > 0 {
            num / den + i32::from(self.random2(den) < rem)
        } else {
            num / den
        }
    }

    /// Uniform fraction in `[0, 1)` with 24 bits of resolution.
    fn fraction(&mut self) -> f64 {
        const RESOLUTION: u32 = 1 << 24;
        f64::from(self.below(RESOLUTION)) / f64::from(RESOLUTION)
    }

    /// Round a real value down or up, with the fractional part as the
    /// chance of rounding up.
    fn rand_round(&mut self, value: f64) -> i32 {
        let floor = value.floor();
        let bump = i32::from(self.fraction() < value - floor);
        floor as i32 + bump
    }

    /// `random2(n)` when rolling, otherwise the expected value.
    fn maybe_random2(&mut self, n: i32, random: bool) -> i32 {
        if random { self.random2(n) } else { n / 2 }
    }

    /// Index into `weights`, chosen in proportion to each weight.
    ///
    /// Non-positive weights are never chosen. Returns `None` when nothing
    /// carries weight.
    fn weighted_index(&mut self, weights: &[i32]) -> Option<usize> {
        let total: i32 = weights.iter().filter(|w| **w > 0).sum();
        if total <= 0 {
            return None;
        }
        let mut roll = self.random2(total);
        for (idx, &weight) in weights.iter().enumerate() {
            if weight <= 0 {
                continue;
            }
            if roll < weight {
                return Some(idx);
            }
            roll -= weight;
        }
        None
    }
}

/// Pick one value from `(value, weight)` pairs.
pub fn choose_weighted<R, T>(rng: &mut R, entries: &[(T, i32)]) -> Option<T>
where
    R: RandomSource + ?Sized,
    T: Clone,
{
    let weights: Vec<i32> = entries.iter().map(|(_, w)| *w).collect();
    rng.weighted_index(&weights)
        .map(|idx| entries[idx].0.clone())
}
