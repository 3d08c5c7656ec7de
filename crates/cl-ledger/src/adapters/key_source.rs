//! # Key Sources
//!
//! `KeySource` adapters: OS randomness for deployments, a seeded generator
//! for reproducible tests and simulations.

use crate::ports::outbound::KeySource;
use cl_crypto::RingKeyPair;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fresh key pairs from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    fn next_keypair(&mut self) -> RingKeyPair {
        RingKeyPair::generate()
    }
}

/// Deterministic key pairs from a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededKeySource {
    rng: StdRng,
}

impl SeededKeySource {
    /// Create from a 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl KeySource for SeededKeySource {
    fn next_keypair(&mut self) -> RingKeyPair {
        RingKeyPair::generate_with(&mut self.rng)
    }
}
