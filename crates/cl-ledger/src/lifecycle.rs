//! # Unit Lifecycle Controller
//!
//! Owns the ledger arena and the unit registry.
//!
//! ```text
//! Uninitialized --create--> Alive --destroy--> Destroyed
//!                             ^                    |
//!                             +-----recreate-------+
//! ```
//!
//! Ledgers live in an append-only arena indexed by [`LedgerId`]. A unit record
//! holds only that index, so destroying a unit never touches the ledger, its
//! ring, or its replay window. Re-creating reattaches the same index.

use crate::codec::ReplayGuard;
use crate::config::LedgerConfig;
use crate::domain::entities::{
    ConstructorArgs, LedgerRef, TokenMetadata, UnitRecord, UnitState, UnitTemplate,
};
use crate::domain::ring::RingKeyManager;
use crate::domain::services::compute_unit_address;
use crate::domain::value_objects::{Address, LedgerId};
use crate::errors::LedgerError;
use crate::ports::outbound::LedgerStore;
use std::collections::HashMap;

/// Everything that survives unit destruction.
#[derive(Debug)]
pub struct LedgerContext<S> {
    /// Balances, allowances, supply.
    pub store: S,
    /// Decryption keys.
    pub ring: RingKeyManager,
    /// Sealed-envelope nonces already accepted.
    pub replay: ReplayGuard,
    /// Token metadata.
    pub metadata: TokenMetadata,
}

impl<S: LedgerStore + Default> LedgerContext<S> {
    /// Fresh, empty ledger.
    #[must_use]
    pub fn new(config: &LedgerConfig, metadata: TokenMetadata) -> Self {
        Self {
            store: S::default(),
            ring: RingKeyManager::new(config.ring),
            replay: ReplayGuard::new(config.replay_window),
            metadata,
        }
    }
}

/// Ledger arena plus unit registry.
#[derive(Debug)]
pub struct UnitLifecycle<S> {
    config: LedgerConfig,
    ledgers: Vec<LedgerContext<S>>,
    units: HashMap<Address, UnitRecord>,
    deployer_nonces: HashMap<Address, u64>,
}

impl<S: LedgerStore + Default> UnitLifecycle<S> {
    /// Empty arena and registry.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ledgers: Vec::new(),
            units: HashMap::new(),
            deployer_nonces: HashMap::new(),
        }
    }

    /// Create a unit. Allocates a ledger unless `args.attach` names one.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if `args.attach` names a ledger that does not exist.
    pub fn create(
        &mut self,
        template: UnitTemplate,
        args: ConstructorArgs,
    ) -> Result<UnitRecord, LedgerError> {
        let ledger = match args.attach {
            Some(id) => {
                if id.index() >= self.ledgers.len() {
                    return Err(LedgerError::SchemaMismatch(format!("unknown ledger {id}")));
                }
                id
            }
            None => self.allocate_ledger(args.metadata.unwrap_or_default())?,
        };

        let address = self.next_address(args.deployer);
        let record = UnitRecord {
            address,
            template,
            ledger,
            relay_target: args.relay_target,
            incarnation: 0,
            state: UnitState::Alive,
        };
        self.units.insert(address, record.clone());
        Ok(record)
    }

    /// Mark a live unit destroyed. The ledger is left untouched.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` if the unit is unknown or already destroyed;
    /// `SchemaMismatch` if its template cannot be destroyed.
    pub fn destroy(&mut self, address: Address) -> Result<UnitRecord, LedgerError> {
        let record = self
            .units
            .get_mut(&address)
            .filter(|record| record.is_alive())
            .ok_or(LedgerError::UnitNotLive(address))?;

        if !record.template.can_destroy() {
            return Err(LedgerError::SchemaMismatch(format!(
                "{} units cannot be destroyed",
                record.template
            )));
        }

        record.state = UnitState::Destroyed;
        Ok(record.clone())
    }

    /// Bring a destroyed unit back at the same address, on the same ledger.
    /// A live unit is returned unchanged.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` if nothing was ever created at `address`.
    pub fn recreate(&mut self, address: Address) -> Result<UnitRecord, LedgerError> {
        let record = self
            .units
            .get_mut(&address)
            .ok_or(LedgerError::UnitNotLive(address))?;

        if record.state == UnitState::Destroyed {
            record.state = UnitState::Alive;
            record.incarnation = record.incarnation.saturating_add(1);
        }
        Ok(record.clone())
    }

    /// Record of a live unit.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` if the unit is unknown or destroyed.
    pub fn live_unit(&self, address: Address) -> Result<&UnitRecord, LedgerError> {
        self.units
            .get(&address)
            .filter(|record| record.is_alive())
            .ok_or(LedgerError::UnitNotLive(address))
    }

    /// Lifecycle state; `Uninitialized` for unknown addresses.
    #[must_use]
    pub fn state(&self, address: Address) -> UnitState {
        self.units
            .get(&address)
            .map_or(UnitState::Uninitialized, |record| record.state)
    }

    /// True if `address` hosts a live unit.
    #[must_use]
    pub fn is_alive(&self, address: Address) -> bool {
        self.live_unit(address).is_ok()
    }

    /// Ledger fronted by `address`, live or destroyed.
    #[must_use]
    pub fn ledger_of(&self, address: Address) -> Option<LedgerId> {
        self.units.get(&address).map(|record| record.ledger)
    }

    /// Resolve a ledger reference to an existing ledger.
    #[must_use]
    pub fn resolve(&self, reference: LedgerRef) -> Option<LedgerId> {
        match reference {
            LedgerRef::Unit(address) => self.ledger_of(address),
            LedgerRef::Ledger(id) => (id.index() < self.ledgers.len()).then_some(id),
        }
    }

    /// Ledger by id.
    #[must_use]
    pub fn ledger(&self, id: LedgerId) -> Option<&LedgerContext<S>> {
        self.ledgers.get(id.index())
    }

    /// Mutable ledger by id.
    pub fn ledger_mut(&mut self, id: LedgerId) -> Option<&mut LedgerContext<S>> {
        self.ledgers.get_mut(id.index())
    }

    /// Every ledger in the arena.
    pub fn ledgers(&self) -> impl Iterator<Item = (LedgerId, &LedgerContext<S>)> {
        self.ledgers
            .iter()
            .enumerate()
            .filter_map(|(index, ledger)| Some((LedgerId(u32::try_from(index).ok()?), ledger)))
    }

    /// Number of ledgers allocated.
    #[must_use]
    pub fn ledger_count(&self) -> usize {
        self.ledgers.len()
    }

    /// Number of unit addresses ever occupied.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn allocate_ledger(&mut self, metadata: TokenMetadata) -> Result<LedgerId, LedgerError> {
        let index = u32::try_from(self.ledgers.len())
            .map_err(|_| LedgerError::SchemaMismatch("ledger arena exhausted".to_string()))?;
        self.ledgers.push(LedgerContext::new(&self.config, metadata));
        Ok(LedgerId(index))
    }

    fn next_address(&mut self, deployer: Address) -> Address {
        let nonce = self.deployer_nonces.entry(deployer).or_insert(0);
        loop {
            let address = compute_unit_address(deployer, *nonce);
            *nonce += 1;
            if !self.units.contains_key(&address) {
                return address;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
