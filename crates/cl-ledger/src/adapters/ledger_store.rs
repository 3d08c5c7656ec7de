//! # In-Memory Ledger Store
//!
//! `LedgerStore` adapter backed by hash maps. Serialization of access is the
//! engine's job (single writer behind the service lock), so no interior locking.

use crate::domain::entities::{Account, StateChange};
use crate::domain::value_objects::{Address, U256};
use crate::ports::outbound::LedgerStore;
use std::collections::HashMap;

/// In-memory ledger state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerStore {
    /// Account balances. Entries are zeroed, never removed.
    balances: HashMap<Address, U256>,
    /// Allowances keyed by (owner, spender).
    allowances: HashMap<(Address, Address), U256>,
    /// Sum of balances.
    total_supply: U256,
}

impl InMemoryLedgerStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts ever credited.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn apply(&mut self, changes: &[StateChange]) {
        for change in changes {
            match change {
                StateChange::Balance { account, value } => {
                    self.balances.insert(*account, *value);
                }
                StateChange::Allowance {
                    owner,
                    spender,
                    value,
                } => {
                    self.allowances.insert((*owner, *spender), *value);
                }
                StateChange::TotalSupply { value } => {
                    self.total_supply = *value;
                }
            }
        }
    }

    fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .balances
            .iter()
            .map(|(address, balance)| Account {
                address: *address,
                balance: *balance,
            })
            .collect();
        accounts.sort_by_key(|account| account.address);
        accounts
    }
}

// =============================================================================
// TESTS
// =============================================================================
