//! # Confidential Ledger Service
//!
//! Thread-safe front of the [`LedgerEngine`]: one lock around the engine, so
//! every entrypoint is atomic and a decryption attempt always sees a single
//! ring snapshot. Relayed calls run inside the same critical section.
//!
//! Call failures are turned into receipts here; `warn!` records the kind
//! only, never key material or plaintext.

use crate::adapters::{InMemoryLedgerStore, OsKeySource, SeededKeySource};
use crate::config::LedgerConfig;
use crate::dispatcher::Outcome;
use crate::domain::entities::{
    CallContext, ConstructorArgs, LedgerRef, Receipt, UnitState, UnitTemplate,
};
use crate::domain::invariants::{check_receipt_invariant, InvariantCheckResult};
use crate::domain::services::event_topic;
use crate::domain::value_objects::{Address, LedgerId, U256};
use crate::engine::LedgerEngine;
use crate::errors::{ErrorKind, LedgerError};
use crate::events::topics;
use crate::ports::inbound::ConfidentialLedgerApi;
use crate::ports::outbound::{KeySource, LedgerStore};
use cl_crypto::RingPublicKey;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

/// Statistics for the confidential ledger service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Envelopes submitted.
    pub envelopes_submitted: u64,
    /// Submissions that produced a success receipt.
    pub successful_calls: u64,
    /// Submissions that produced a failure receipt.
    pub failed_calls: u64,
    /// Failures reported as `DecryptionFailed` (wrong key, tamper, replay).
    pub decryption_failures: u64,
    /// Ring rotations performed.
    pub ring_rotations: u64,
    /// Units created.
    pub units_created: u64,
    /// Units destroyed.
    pub units_destroyed: u64,
    /// Units brought back after destruction.
    pub units_recreated: u64,
}

/// The confidential ledger service.
pub struct LedgerService<S, K> {
    engine: Mutex<LedgerEngine<S, K>>,
    stats: Mutex<ServiceStats>,
}

impl<S: LedgerStore + Default, K: KeySource> LedgerService<S, K> {
    /// Create a service with the given configuration and key source.
    pub fn new(config: LedgerConfig, keys: K) -> Self {
        info!(
            ring_capacity = config.ring.capacity,
            ring_grace = config.ring.grace,
            max_forward_depth = config.max_forward_depth,
            "Confidential ledger service starting"
        );
        Self {
            engine: Mutex::new(LedgerEngine::new(config, keys)),
            stats: Mutex::new(ServiceStats::default()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> LedgerConfig {
        self.engine.lock().config().clone()
    }

    /// Create a unit from a parsed template.
    ///
    /// # Errors
    ///
    /// `SchemaMismatch` if `args.attach` names an unknown ledger.
    #[instrument(skip(self, args), fields(deployer = %args.deployer))]
    pub fn create_unit(
        &self,
        template: UnitTemplate,
        args: ConstructorArgs,
    ) -> Result<Address, LedgerError> {
        let record = self.engine.lock().create(template, args)?;
        self.stats.lock().units_created += 1;
        Ok(record.address)
    }

    /// Check ledger invariants across every ledger.
    pub fn check_invariants(&self) -> InvariantCheckResult {
        self.engine.lock().check_invariants()
    }

    /// Submit with a full call context.
    #[instrument(skip(self, raw), fields(caller = %ctx.caller, unit = %unit, len = raw.len()))]
    pub fn submit_with(&self, ctx: CallContext, unit: Address, raw: &[u8]) -> Receipt {
        let result = self.engine.lock().submit(ctx, unit, raw);
        let receipt = self.receipt(unit, result);

        let mut stats = self.stats.lock();
        stats.envelopes_submitted += 1;
        if receipt.is_success() {
            stats.successful_calls += 1;
        } else {
            stats.failed_calls += 1;
        }
        receipt
    }

    fn receipt(&self, unit: Address, result: Result<Outcome, LedgerError>) -> Receipt {
        match result {
            Ok(outcome) => {
                self.tally_logs(&outcome);
                debug!(unit = %unit, logs = outcome.logs.len(), "Call succeeded");
                Receipt::success(unit, outcome.output, outcome.logs)
            }
            Err(error) => {
                let kind = error.kind();
                if kind == ErrorKind::DecryptionFailed {
                    self.stats.lock().decryption_failures += 1;
                }
                warn!(unit = %unit, kind = ?kind, "Call rejected");
                let receipt = Receipt::failure(unit, kind);
                debug_assert!(check_receipt_invariant(&receipt));
                receipt
            }
        }
    }

    /// Lifecycle events may come from nested or relayed calls, so they are
    /// counted from the logs rather than from the entrypoint.
    fn tally_logs(&self, outcome: &Outcome) {
        let destroyed = event_topic(topics::UNIT_DESTROYED);
        let rotated = event_topic(topics::RING_KEY_ROTATED);

        let mut stats = self.stats.lock();
        for log in &outcome.logs {
            match log.topics.first() {
                Some(topic) if *topic == destroyed => stats.units_destroyed += 1,
                Some(topic) if *topic == rotated => stats.ring_rotations += 1,
                _ => {}
            }
        }
    }
}

impl<S: LedgerStore + Default, K: KeySource> ConfidentialLedgerApi for LedgerService<S, K> {
    fn create(&self, template: &str, args: ConstructorArgs) -> Result<Address, LedgerError> {
        let template: UnitTemplate = template.parse().map_err(LedgerError::SchemaMismatch)?;
        self.create_unit(template, args)
    }

    fn submit(&self, caller: Address, unit: Address, raw: &[u8], value: U256) -> Receipt {
        let mut ctx = CallContext::new(caller);
        ctx.value = value;
        self.submit_with(ctx, unit, raw)
    }

    fn balance_of(&self, ledger: LedgerRef, account: Address) -> U256 {
        self.engine.lock().balance_of(ledger, account)
    }

    #[instrument(skip(self), fields(unit = %unit))]
    fn destroy(&self, unit: Address) -> Receipt {
        let result = self.engine.lock().destroy(unit);
        self.receipt(unit, result)
    }

    #[instrument(skip(self), fields(unit = %unit))]
    fn recreate(&self, unit: Address) -> Result<Address, LedgerError> {
        let mut engine = self.engine.lock();
        let was_destroyed = engine.unit_state(unit) == UnitState::Destroyed;
        let record = engine.recreate(unit)?;
        drop(engine);

        if was_destroyed {
            self.stats.lock().units_recreated += 1;
        }
        Ok(record.address)
    }

    #[instrument(skip(self), fields(unit = %unit))]
    fn update_ring_key(&self, unit: Address) -> Receipt {
        let result = self.engine.lock().update_ring_key(unit);
        self.receipt(unit, result)
    }

    fn ring_public_keys(&self, unit: Address) -> Vec<(u64, RingPublicKey)> {
        self.engine.lock().ring_public_keys(unit)
    }

    fn ledger_of(&self, unit: Address) -> Option<LedgerId> {
        self.engine.lock().ledger_of(unit)
    }

    fn unit_state(&self, unit: Address) -> UnitState {
        self.engine.lock().unit_state(unit)
    }

    fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }
}

/// Service with in-memory storage and OS randomness.
#[must_use]
pub fn create_service(config: LedgerConfig) -> LedgerService<InMemoryLedgerStore, OsKeySource> {
    LedgerService::new(config, OsKeySource)
}

/// Deterministic service with in-memory adapters (for testing).
#[must_use]
pub fn create_test_service() -> LedgerService<InMemoryLedgerStore, SeededKeySource> {
    LedgerService::new(LedgerConfig::default(), SeededKeySource::new(0x5eed))
}

// =============================================================================
// TESTS
// =============================================================================
