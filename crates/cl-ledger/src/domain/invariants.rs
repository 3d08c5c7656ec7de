//! # Domain Invariants
//!
//! Properties that must hold between any two engine operations:
//!
//! - Ring: at most K active keys, newest first, with consecutive epochs.
//! - Supply: the sum of all balances equals total supply.
//! - Receipts: a failure carries no output and no logs.
//! - Relay: no call runs deeper than `max_forward_depth`.

use crate::config::{LedgerConfig, MAX_FORWARD_DEPTH};
use crate::domain::entities::{CallContext, Receipt};
use crate::domain::ring::RingKeyManager;
use crate::domain::value_objects::U256;
use crate::ports::outbound::LedgerStore;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Ring holds at most `capacity` keys, ordered newest first by epoch, and
/// exactly the most recent `min(rotations, capacity)` of them.
#[must_use]
pub fn check_ring_invariant(ring: &RingKeyManager) -> bool {
    let active = ring.active_keys();
    if active.len() > ring.capacity() {
        return false;
    }

    let expected_len = usize::try_from(ring.rotations())
        .map_or(ring.capacity(), |rotations| rotations.min(ring.capacity()));
    if active.len() != expected_len {
        return false;
    }

    active
        .iter()
        .zip(1u64..)
        .all(|(key, back)| ring.rotations().checked_sub(back) == Some(key.epoch()))
}

/// Sum of balances equals total supply.
#[must_use]
pub fn check_supply_invariant<S: LedgerStore + ?Sized>(store: &S) -> bool {
    store
        .accounts()
        .iter()
        .try_fold(U256::zero(), |sum, account| sum.checked_add(account.balance))
        .is_some_and(|sum| sum == store.total_supply())
}

/// A failed receipt exposes nothing but its kind.
#[must_use]
pub fn check_receipt_invariant(receipt: &Receipt) -> bool {
    receipt.is_success() || (receipt.output.is_empty() && receipt.logs.is_empty())
}

/// Relay depth within the configured bound, never above `MAX_FORWARD_DEPTH`
/// even when the config skipped validation.
#[must_use]
pub fn check_relay_depth_invariant(ctx: &CallContext, config: &LedgerConfig) -> bool {
    ctx.depth <= config.max_forward_depth.min(MAX_FORWARD_DEPTH)
}

/// Check the ledger-level invariants at once.
#[must_use]
pub fn check_ledger_invariants<S: LedgerStore + ?Sized>(
    store: &S,
    ring: &RingKeyManager,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_ring_invariant(ring) {
        violations.push(InvariantViolation::RingDisordered {
            active: ring.len(),
            capacity: ring.capacity(),
        });
    }

    if !check_supply_invariant(store) {
        violations.push(InvariantViolation::SupplyMismatch {
            supply: store.total_supply(),
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Ring over capacity or out of epoch order.
    RingDisordered {
        /// Active keys.
        active: usize,
        /// Configured capacity.
        capacity: usize,
    },
    /// Balances do not add up to total supply.
    SupplyMismatch {
        /// Recorded total supply.
        supply: U256,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RingDisordered { active, capacity } => {
                write!(f, "ring disordered: {active} active keys, capacity {capacity}")
            }
            Self::SupplyMismatch { supply } => {
                write!(f, "balances do not sum to total supply {supply}")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
