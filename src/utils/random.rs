use std::sync::atomic::{AtomicU32, Ordering};

const M: u32 = 2_147_483_647; // 2^31-1
const A: u64 = 16807; // bits 14, 8, 7, 5, 2, 1, 0

pub trait RandomGenerator {
    fn next(&self) -> u32;

    /// Returns a uniformly distributed value in the range [0..n-1]
    /// REQUIRES: n > 0
    fn uniform(&self, n: u32) -> u32 {
        self.next() % n
    }

    /// Randomly returns true ~"1/n" of the time, and false otherwise.
    /// REQUIRES: n > 0
    fn one_in(&self, n: u32) -> bool {
        self.uniform(n) == 0
    }
}

/// A very simple Park-Miller random number generator.
/// The state lives in an atomic so a shared reference can draw numbers.
pub struct Random {
    seed: AtomicU32,
}

impl Random {
    pub fn new(s: u32) -> Self {
        let mut seed = s & 0x7fff_ffff;
        // Avoid bad seeds.
        if seed == 0 || seed == M {
            seed = 1;
        }
        Self {
            seed: AtomicU32::new(seed),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(0xdead_beef)
    }
}

impl RandomGenerator for Random {
    fn next(&self) -> u32 {
        let seed = self.seed.load(Ordering::Relaxed) as u64;
        // We are computing
        //       seed_ = (seed_ * A) % M,    where M = 2^31-1
        //
        // seed_ must not be zero or M, or else all subsequent computed values
        // will be zero or M respectively.  For all other values, seed_ will end
        // up cycling through every number in [1,M-1]
        let product = seed * A;

        // Compute (product % M) using the fact that ((x << 31) % M) == x.
        let mut next = ((product >> 31) + (product & M as u64)) as u32;
        // The first reduction may overflow by 1 bit, so we may need to
        // repeat.  mod == M is not possible; using > allows the faster
        // sign-bit-based test.
        if next > M {
            next -= M;
        }
        self.seed.store(next, Ordering::Relaxed);
        next
    }
}
