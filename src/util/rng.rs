// Copyright (c) 2024 Mike Tsao

//! Provides the random-number generator behind the tone synthesizer's noise
//! component.

use crate::error::Result;
use byteorder::{BigEndian, ByteOrder};
use delegate::delegate;

/// A pseudorandom number generator (PRNG) for noise generation. Not
/// cryptographically secure, and doesn't need to be.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        let seed = Self::generate_seed().unwrap_or_else(|e| {
            log::warn!("Falling back to a fixed noise seed: {e}");
            Self::FALLBACK_SEED
        });
        Self::new_with_seed(seed)
    }
}
#[allow(missing_docs)]
impl Rng {
    /// Used only when the OS can't give us entropy.
    const FALLBACK_SEED: u128 = 0x70f4_f854_e1e9_f0a7;

    /// Pass the same number to [Rng::new_with_seed()] to get the same stream
    /// back again. This is what makes noise-bearing tones reproducible in
    /// tests.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    /// Creates a seed from OS entropy.
    pub fn generate_seed() -> Result<u128> {
        let mut bytes = [0u8; 16];

        getrandom::getrandom(&mut bytes)?;
        Ok(BigEndian::read_u128(&bytes))
    }

    /// A uniformly distributed value in [-1.0, 1.0).
    pub fn rand_bipolar(&mut self) -> f64 {
        self.rand_float() * 2.0 - 1.0
    }

    delegate! {
        to self.0 {
            pub fn rand_u64(&mut self) -> u64;
            pub fn rand_float(&mut self) -> f64;
        }
    }
}
