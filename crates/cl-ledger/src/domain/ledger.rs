//! # Ledger Operations
//!
//! Balance-moving operations planned against a read-only view of a
//! [`LedgerStore`] and committed in one `apply` call.
//!
//! Planning does all validation and checked arithmetic; a plan that returns
//! `Ok` always commits, so no operation is ever partially applied.

use crate::domain::entities::StateChange;
use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use crate::ports::outbound::LedgerStore;

/// Validated writes plus the events they produce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// Writes, applied as one batch.
    pub changes: Vec<StateChange>,
    /// Events to log on success.
    pub events: Vec<LedgerEvent>,
}

impl Commit {
    /// Apply to `store` and hand back the events.
    pub fn apply_to<S: LedgerStore + ?Sized>(self, store: &mut S) -> Vec<LedgerEvent> {
        store.apply(&self.changes);
        self.events
    }
}

fn require_positive(amount: U256) -> Result<(), LedgerError> {
    if amount.is_zero() {
        Err(LedgerError::InvalidAmount)
    } else {
        Ok(())
    }
}

/// Plan `mint(to, amount)`.
///
/// # Errors
///
/// `InvalidAmount` for zero, `Overflow` if the balance or supply would wrap.
pub fn plan_mint<S: LedgerStore + ?Sized>(
    store: &S,
    to: Address,
    amount: U256,
) -> Result<Commit, LedgerError> {
    require_positive(amount)?;

    let balance = store
        .balance(&to)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { account: to })?;
    let supply = store
        .total_supply()
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { account: to })?;

    Ok(Commit {
        changes: vec![
            StateChange::Balance {
                account: to,
                value: balance,
            },
            StateChange::TotalSupply { value: supply },
        ],
        events: vec![LedgerEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        }],
    })
}

/// Plan `transfer(from -> to, amount)`.
///
/// # Errors
///
/// `InvalidAmount` for zero, `InsufficientBalance` if `from` is short.
pub fn plan_transfer<S: LedgerStore + ?Sized>(
    store: &S,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<Commit, LedgerError> {
    require_positive(amount)?;

    Ok(Commit {
        changes: balance_moves(store, from, to, amount)?,
        events: vec![LedgerEvent::Transfer {
            from,
            to,
            value: amount,
        }],
    })
}

/// Plan `approve(owner -> spender, amount)`. Zero revokes.
#[must_use]
pub fn plan_approve(owner: Address, spender: Address, amount: U256) -> Commit {
    Commit {
        changes: vec![StateChange::Allowance {
            owner,
            spender,
            value: amount,
        }],
        events: vec![LedgerEvent::Approval {
            owner,
            spender,
            value: amount,
        }],
    }
}

/// Plan `transferFrom` by `spender`, moving `amount` from `from` to `to`.
///
/// # Errors
///
/// `InvalidAmount` for zero; `InsufficientBalance` if either the allowance
/// or the balance of `from` is short.
pub fn plan_transfer_from<S: LedgerStore + ?Sized>(
    store: &S,
    spender: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<Commit, LedgerError> {
    require_positive(amount)?;

    let allowance = store.allowance(&from, &spender);
    let remaining = allowance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance {
            required: amount,
            available: allowance,
        })?;

    let mut changes = balance_moves(store, from, to, amount)?;
    changes.push(StateChange::Allowance {
        owner: from,
        spender,
        value: remaining,
    });

    Ok(Commit {
        changes,
        events: vec![
            LedgerEvent::Transfer {
                from,
                to,
                value: amount,
            },
            LedgerEvent::Approval {
                owner: from,
                spender,
                value: remaining,
            },
        ],
    })
}

/// Debit + credit pair. A self-transfer only checks the balance.
fn balance_moves<S: LedgerStore + ?Sized>(
    store: &S,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<Vec<StateChange>, LedgerError> {
    let available = store.balance(&from);
    let debited = available
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance {
            required: amount,
            available,
        })?;

    if from == to {
        return Ok(Vec::new());
    }

    let credited = store
        .balance(&to)
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { account: to })?;

    Ok(vec![
        StateChange::Balance {
            account: from,
            value: debited,
        },
        StateChange::Balance {
            account: to,
            value: credited,
        },
    ])
}

// =============================================================================
// TESTS
// =============================================================================
