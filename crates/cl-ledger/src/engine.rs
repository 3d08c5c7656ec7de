//! # Ledger Engine
//!
//! Single-threaded core tying lifecycle, codec, dispatcher, ring and relay
//! together. The service serializes access; everything here takes `&mut self`.
//!
//! Submission pipeline:
//!
//! 1. Confirm the unit is live (`UnitNotLive`).
//! 2. Decode or decrypt against the ledger's ring snapshot.
//! 3. Admit the sealing nonce into the replay window.
//! 4. Resolve the selector for the unit's template and check the schema.
//! 5. Reject attached value.
//! 6. Execute: ledger calls in the dispatcher, the rest here or in the relay.

use crate::codec;
use crate::config::LedgerConfig;
use crate::dispatcher::{self, Call, Outcome};
use crate::domain::entities::{
    CallContext, ConstructorArgs, LedgerRef, UnitRecord, UnitState, UnitTemplate,
};
use crate::domain::invariants::{check_ledger_invariants, InvariantCheckResult};
use crate::domain::ring::{RingKey, RotationOutcome};
use crate::domain::value_objects::{Address, Bytes, LedgerId, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use crate::lifecycle::{LedgerContext, UnitLifecycle};
use crate::ports::outbound::{KeySource, LedgerStore};
use cl_crypto::{RingKeyPair, RingPublicKey};
use tracing::{debug, info};

/// The confidential ledger engine.
#[derive(Debug)]
pub struct LedgerEngine<S, K> {
    pub(crate) config: LedgerConfig,
    pub(crate) lifecycle: UnitLifecycle<S>,
    keys: K,
}

impl<S: LedgerStore + Default, K: KeySource> LedgerEngine<S, K> {
    /// Engine with no units.
    #[must_use]
    pub fn new(config: LedgerConfig, keys: K) -> Self {
        Self {
            lifecycle: UnitLifecycle::new(config.clone()),
            config,
            keys,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Lifecycle controller (read-only).
    #[must_use]
    pub fn lifecycle(&self) -> &UnitLifecycle<S> {
        &self.lifecycle
    }

    /// Create a unit from `template`.
    ///
    /// # Errors
    ///
    /// As [`UnitLifecycle::create`].
    pub fn create(
        &mut self,
        template: UnitTemplate,
        args: ConstructorArgs,
    ) -> Result<UnitRecord, LedgerError> {
        let record = self.lifecycle.create(template, args)?;
        info!(
            unit = %record.address,
            template = %record.template,
            ledger = %record.ledger,
            "Unit created"
        );
        Ok(record)
    }

    /// Submit a raw envelope to `unit`.
    ///
    /// # Errors
    ///
    /// Any [`LedgerError`]. The ledger is untouched on error, but once a
    /// sealed envelope decrypts its nonce stays consumed even if resolution
    /// or execution fails afterwards.
    pub fn submit(
        &mut self,
        ctx: CallContext,
        unit: Address,
        raw: &[u8],
    ) -> Result<Outcome, LedgerError> {
        let record = self.lifecycle.live_unit(unit)?.clone();
        let require_sealed =
            record.template.consumes_ring_keys() && self.config.require_sealed_for_ring_units;

        let ledger = self.ledger_mut(record.ledger)?;
        let decoded = {
            let candidates: Vec<&RingKeyPair> = ledger
                .ring
                .decryption_candidates()
                .into_iter()
                .map(RingKey::keypair)
                .collect();
            codec::open(raw, &candidates)?
        };
        if require_sealed && !decoded.confidential {
            return Err(LedgerError::DecryptionFailed);
        }
        if let Some(nonce) = decoded.nonce {
            ledger.replay.admit(nonce)?;
        }

        let call = dispatcher::resolve(record.template, &decoded.call())?;
        if !ctx.value.is_zero() {
            return Err(LedgerError::SchemaMismatch(format!(
                "{} is not payable",
                call.name()
            )));
        }

        debug!(
            unit = %unit,
            call = call.name(),
            confidential = decoded.confidential,
            depth = ctx.depth,
            "Dispatching"
        );
        self.execute(ctx, &record, call)
    }

    fn execute(
        &mut self,
        ctx: CallContext,
        record: &UnitRecord,
        call: Call,
    ) -> Result<Outcome, LedgerError> {
        if matches!(call, Call::ProxyForward { .. } | Call::Forward { .. })
            && !record.template.can_forward()
        {
            return Err(LedgerError::SchemaMismatch(format!(
                "{} units do not relay",
                record.template
            )));
        }
        match call {
            Call::Destroy => self.destroy(record.address),
            Call::ProxyForward { target, payload } => self.relay(ctx, target, &payload),
            Call::Forward { payload } => {
                let target = record
                    .relay_target
                    .ok_or(LedgerError::TargetUnreachable(Address::ZERO))?;
                self.relay(ctx, target, &payload)
            }
            Call::UpdateRingKey => self.update_ring_key(record.address),
            ledger_call => {
                let ledger = self.ledger_mut(record.ledger)?;
                dispatcher::execute_ledger_call(ledger, record.address, ctx.caller, &ledger_call)?
                    .ok_or_else(|| {
                        LedgerError::SchemaMismatch(format!(
                            "{} not executable",
                            ledger_call.name()
                        ))
                    })
            }
        }
    }

    /// Destroy a live, destroyable unit. Its ledger is untouched.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` or `SchemaMismatch`, as [`UnitLifecycle::destroy`].
    pub fn destroy(&mut self, unit: Address) -> Result<Outcome, LedgerError> {
        let record = self.lifecycle.destroy(unit)?;
        info!(unit = %unit, ledger = %record.ledger, "Unit destroyed");

        let log = LedgerEvent::UnitDestroyed {
            unit,
            ledger: record.ledger,
        }
        .to_log(unit);
        Ok(Outcome {
            output: Bytes::new(),
            logs: vec![log],
        })
    }

    /// Re-create a destroyed unit at its address.
    ///
    /// # Errors
    ///
    /// `UnitNotLive` if no unit was ever created at `unit`.
    pub fn recreate(&mut self, unit: Address) -> Result<UnitRecord, LedgerError> {
        let before = self.lifecycle.state(unit);
        let record = self.lifecycle.recreate(unit)?;
        if before == UnitState::Destroyed {
            info!(
                unit = %unit,
                ledger = %record.ledger,
                incarnation = record.incarnation,
                "Unit re-created"
            );
        }
        Ok(record)
    }

    /// Rotate the ring of a live ring-key unit.
    ///
    /// # Errors
    ///
    /// `UnitNotLive`; `SchemaMismatch` for other templates;
    /// `RingCapacityExceeded` under the `Reject` policy.
    pub fn update_ring_key(&mut self, unit: Address) -> Result<Outcome, LedgerError> {
        let record = self.lifecycle.live_unit(unit)?.clone();
        if !record.template.consumes_ring_keys() {
            return Err(LedgerError::SchemaMismatch(format!(
                "{} units have no ring",
                record.template
            )));
        }

        let keypair = self.keys.next_keypair();
        let ledger = self.ledger_mut(record.ledger)?;
        let RotationOutcome {
            epoch,
            evicted_epoch,
            ..
        } = ledger.ring.rotate(keypair)?;

        info!(unit = %unit, epoch, evicted = ?evicted_epoch, "Ring key rotated");

        let log = LedgerEvent::RingKeyRotated {
            epoch,
            evicted_epoch,
        }
        .to_log(unit);
        Ok(Outcome {
            output: Bytes::from_u256(U256::from(epoch)),
            logs: vec![log],
        })
    }

    /// `(epoch, public key)` of every active key, most recent first.
    /// Destroyed units still resolve; unknown units yield nothing.
    #[must_use]
    pub fn ring_public_keys(&self, unit: Address) -> Vec<(u64, RingPublicKey)> {
        self.lifecycle
            .ledger_of(unit)
            .and_then(|id| self.lifecycle.ledger(id))
            .map(|ledger| ledger.ring.public_keys())
            .unwrap_or_default()
    }

    /// Balance of `account` in the referenced ledger; zero if unknown.
    #[must_use]
    pub fn balance_of(&self, reference: LedgerRef, account: Address) -> U256 {
        self.lifecycle
            .resolve(reference)
            .and_then(|id| self.lifecycle.ledger(id))
            .map(|ledger| ledger.store.balance(&account))
            .unwrap_or_default()
    }

    /// Ledger fronted by `unit`, live or destroyed.
    #[must_use]
    pub fn ledger_of(&self, unit: Address) -> Option<LedgerId> {
        self.lifecycle.ledger_of(unit)
    }

    /// Lifecycle state of `unit`.
    #[must_use]
    pub fn unit_state(&self, unit: Address) -> UnitState {
        self.lifecycle.state(unit)
    }

    /// Check ledger invariants across the whole arena.
    #[must_use]
    pub fn check_invariants(&self) -> InvariantCheckResult {
        let violations: Vec<_> = self
            .lifecycle
            .ledgers()
            .flat_map(|(_, ledger)| match check_ledger_invariants(&ledger.store, &ledger.ring) {
                InvariantCheckResult::Valid => Vec::new(),
                InvariantCheckResult::Invalid(violations) => violations,
            })
            .collect();

        if violations.is_empty() {
            InvariantCheckResult::Valid
        } else {
            InvariantCheckResult::Invalid(violations)
        }
    }

    pub(crate) fn ledger_mut(
        &mut self,
        id: LedgerId,
    ) -> Result<&mut LedgerContext<S>, LedgerError> {
        // Unit records only ever hold ids handed out by the arena.
        self.lifecycle
            .ledger_mut(id)
            .ok_or_else(|| LedgerError::SchemaMismatch(format!("unknown ledger {id}")))
    }
}

// =============================================================================
// TESTS
// =============================================================================
