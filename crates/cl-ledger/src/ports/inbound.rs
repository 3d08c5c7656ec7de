//! # Driving Ports (API - Inbound)
//!
//! The surface a harness drives: instantiate units, submit raw envelopes,
//! read balances and receipts.
//!
//! Every method is synchronous and atomic with respect to the others.
//! Failures of submitted calls come back as failed [`Receipt`]s carrying only
//! an [`ErrorKind`](crate::errors::ErrorKind); the `Result`-returning methods
//! are administrative.

use crate::domain::entities::{ConstructorArgs, LedgerRef, Receipt, UnitState};
use crate::domain::value_objects::{Address, LedgerId, U256};
use crate::errors::LedgerError;
use crate::service::ServiceStats;
use cl_crypto::RingPublicKey;

/// Primary API of the confidential ledger.
///
/// ## Usage
///
/// ```ignore
/// let unit = api.create("MyToken", ConstructorArgs::from_deployer(deployer))?;
/// let receipt = api.submit(caller, unit, &envelope, U256::zero());
/// assert!(receipt.is_success());
/// ```
pub trait ConfidentialLedgerApi: Send + Sync {
    /// Instantiate a unit from a named template.
    ///
    /// Names: `plain` (`MyToken`), `self-destruct` (`MyTokenSelfDestruct`),
    /// `indirection`, `ring-key`.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` for an unknown template name or unknown ledger to
    /// attach to.
    fn create(&self, template: &str, args: ConstructorArgs) -> Result<Address, LedgerError>;

    /// Submit a raw envelope to `unit` on behalf of `caller`.
    fn submit(&self, caller: Address, unit: Address, raw: &[u8], value: U256) -> Receipt;

    /// Balance of `account` in a ledger. Zero for unknown ledgers or accounts.
    fn balance_of(&self, ledger: LedgerRef, account: Address) -> U256;

    /// Destroy a unit. Its ledger survives.
    fn destroy(&self, unit: Address) -> Receipt;

    /// Re-create a destroyed unit at the same address. A live unit is
    /// returned as-is.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` if no unit ever existed at `unit`.
    fn recreate(&self, unit: Address) -> Result<Address, LedgerError>;

    /// One ring rotation for a ring-key unit.
    fn update_ring_key(&self, unit: Address) -> Receipt;

    /// Active ring public keys, most recent first.
    fn ring_public_keys(&self, unit: Address) -> Vec<(u64, RingPublicKey)>;

    /// Ledger fronted by `unit`, live or destroyed.
    fn ledger_of(&self, unit: Address) -> Option<LedgerId>;

    /// Lifecycle state of `unit`.
    fn unit_state(&self, unit: Address) -> UnitState;

    /// Counters since start-up.
    fn stats(&self) -> ServiceStats;
}
