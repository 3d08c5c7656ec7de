//! # Ring Key Manager
//!
//! Fixed-capacity ring buffer of decryption key pairs.
//!
//! - `rotate` writes the newest key at the head cursor. At capacity the slot
//!   under the cursor holds the oldest key, which is evicted (FIFO).
//! - `active_keys` yields newest first; that is the decryption try order.
//! - Evicted keys are dropped (secret zeroized) unless a grace window is
//!   configured, in which case the most recent `grace` evictions remain
//!   usable as decryption fallbacks after every active key.

use crate::config::{EvictionPolicy, RingConfig, MAX_RING_CAPACITY};
use crate::errors::LedgerError;
use cl_crypto::{RingKeyPair, RingPublicKey};
use std::collections::VecDeque;

/// Slot status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingKeyStatus {
    /// In the active set.
    Active,
    /// Evicted, retained only inside the grace window.
    Evicted,
}

/// One ring slot.
#[derive(Debug)]
pub struct RingKey {
    epoch: u64,
    slot: usize,
    keypair: RingKeyPair,
    status: RingKeyStatus,
}

impl RingKey {
    /// Rotation number that produced this key (0 for the first).
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Physical slot index in the ring buffer.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> RingKeyStatus {
        self.status
    }

    /// Public half, for sealing.
    #[must_use]
    pub fn public_key(&self) -> RingPublicKey {
        self.keypair.public_key()
    }

    /// Secret half, for opening envelopes.
    #[must_use]
    pub fn keypair(&self) -> &RingKeyPair {
        &self.keypair
    }
}

/// Result of one rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Epoch assigned to the new key.
    pub epoch: u64,
    /// Slot the key was written to.
    pub slot: usize,
    /// Public key of the new slot.
    pub public_key: RingPublicKey,
    /// Epoch of the key pushed out, if the ring was full.
    pub evicted_epoch: Option<u64>,
}

/// Bounded, rotating set of decryption keys.
#[derive(Debug)]
pub struct RingKeyManager {
    config: RingConfig,
    slots: Vec<Option<RingKey>>,
    head: usize,
    active: usize,
    grace: VecDeque<RingKey>,
    rotations: u64,
}

impl RingKeyManager {
    /// Creates an empty ring. Capacity is clamped to `1..=MAX_RING_CAPACITY`;
    /// slots are allocated as rotations fill them.
    #[must_use]
    pub fn new(config: RingConfig) -> Self {
        let capacity = config.capacity.clamp(1, MAX_RING_CAPACITY);
        Self {
            config: RingConfig { capacity, ..config },
            slots: Vec::new(),
            head: 0,
            active: 0,
            grace: VecDeque::new(),
            rotations: 0,
        }
    }

    /// Maximum number of active keys.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of active keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active
    }

    /// True before the first rotation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// True once the ring has been topped up to capacity.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.active == self.config.capacity
    }

    /// Total rotations performed.
    #[must_use]
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Push a new key, evicting the oldest at capacity.
    ///
    /// # Errors
    ///
    /// `RingCapacityExceeded` when full and the policy is `Reject`. The ring
    /// is left untouched in that case.
    pub fn rotate(&mut self, keypair: RingKeyPair) -> Result<RotationOutcome, LedgerError> {
        if self.is_saturated() && self.config.eviction == EvictionPolicy::Reject {
            return Err(LedgerError::RingCapacityExceeded {
                capacity: self.config.capacity,
            });
        }

        let slot = self.head;
        let epoch = self.rotations;
        let public_key = keypair.public_key();

        if slot == self.slots.len() {
            self.slots.push(None);
        }
        let evicted_epoch = match self.slots[slot].take() {
            Some(mut oldest) => {
                oldest.status = RingKeyStatus::Evicted;
                let evicted_epoch = oldest.epoch;
                self.retire(oldest);
                Some(evicted_epoch)
            }
            None => {
                self.active += 1;
                None
            }
        };

        self.slots[slot] = Some(RingKey {
            epoch,
            slot,
            keypair,
            status: RingKeyStatus::Active,
        });
        self.head = (self.head + 1) % self.config.capacity;
        self.rotations += 1;

        Ok(RotationOutcome {
            epoch,
            slot,
            public_key,
            evicted_epoch,
        })
    }

    fn retire(&mut self, key: RingKey) {
        if self.config.grace == 0 {
            return;
        }
        self.grace.push_front(key);
        self.grace.truncate(self.config.grace);
    }

    /// Active keys, most recent first.
    #[must_use]
    pub fn active_keys(&self) -> Vec<&RingKey> {
        let capacity = self.config.capacity;
        (1..=self.active)
            .filter_map(|back| {
                self.slots
                    .get((self.head + capacity - back) % capacity)
                    .and_then(Option::as_ref)
            })
            .collect()
    }

    /// Keys to try when opening an envelope: active (newest first), then grace.
    #[must_use]
    pub fn decryption_candidates(&self) -> Vec<&RingKey> {
        let mut keys = self.active_keys();
        keys.extend(self.grace.iter());
        keys
    }

    /// `(epoch, public key)` of every active key, most recent first.
    #[must_use]
    pub fn public_keys(&self) -> Vec<(u64, RingPublicKey)> {
        self.active_keys()
            .into_iter()
            .map(|key| (key.epoch, key.public_key()))
            .collect()
    }

    /// Public key of the most recent rotation.
    #[must_use]
    pub fn current_public_key(&self) -> Option<RingPublicKey> {
        self.active_keys().first().map(|key| key.public_key())
    }
}

// =============================================================================
// TESTS
// =============================================================================
