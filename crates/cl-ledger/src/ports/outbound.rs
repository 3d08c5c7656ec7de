//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the engine depends on:
//! - Ledger storage (one instance per logical ledger)
//! - Key material for ring rotations
//!
//! Adapters implement these traits; the domain never names a concrete store.

use crate::domain::entities::{Account, StateChange};
use crate::domain::value_objects::{Address, U256};
use cl_crypto::RingKeyPair;

// =============================================================================
// LEDGER STORE
// =============================================================================

/// Durable account-balance storage for one logical ledger.
///
/// ## Implementation Notes
///
/// - Reads never fail; unknown accounts read as zero.
/// - `apply` must make the whole batch visible at once. The engine computes
///   every value with checked arithmetic before calling it, so `apply` has no
///   failure path.
/// - Accounts are never removed, only zeroed.
pub trait LedgerStore: Send + Sync {
    /// Balance of `account` (zero if unknown).
    fn balance(&self, account: &Address) -> U256;

    /// Allowance granted by `owner` to `spender` (zero if unset).
    fn allowance(&self, owner: &Address, spender: &Address) -> U256;

    /// Sum of all balances.
    fn total_supply(&self) -> U256;

    /// Apply a batch of writes atomically.
    fn apply(&mut self, changes: &[StateChange]);

    /// Snapshot of every account ever credited.
    fn accounts(&self) -> Vec<Account>;
}

// =============================================================================
// KEY SOURCE
// =============================================================================

/// Supplies fresh key material for ring rotations.
pub trait KeySource: Send {
    /// Produce the key pair for the next ring slot.
    fn next_keypair(&mut self) -> RingKeyPair;
}
