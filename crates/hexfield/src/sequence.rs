//! Seeded pseudo-random sequence used for normalization jitter.
//!
//! [`SeededSequence`] is a 32-bit linear congruential generator. It is not meant for
//! statistics or security; it exists so that a field built twice from the same seed
//! receives the exact same jitter, cell for cell. Each field build owns its own
//! instance.
use rand::RngCore;

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;
const MODULUS: f64 = 4_294_967_296.0;

/// Linear congruential generator over a single `u32` register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededSequence {
    state: u32,
}

impl SeededSequence {
    /// Creates a generator whose first draw is derived from `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current register value.
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Advances the register and returns the new value mapped into `[0, 1)`.
    #[inline]
    pub fn next_unit(&mut self) -> f64 {
        self.step() as f64 / MODULUS
    }
}

impl RngCore for SeededSequence {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Generate a random float in the range [0, 1) from any RNG.
#[inline]
pub fn unit_f64(rng: &mut dyn RngCore) -> f64 {
    rng.next_u32() as f64 / MODULUS
}
