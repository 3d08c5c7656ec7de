//! # Indirection Relay
//!
//! Forwards an opaque envelope from an indirection unit to another unit.
//! The payload is handed over verbatim: the relay never decodes it, never
//! touches its own ledger, and keeps nothing afterwards. The original
//! caller's authority travels with the call.

use crate::dispatcher::Outcome;
use crate::domain::entities::CallContext;
use crate::domain::invariants::check_relay_depth_invariant;
use crate::domain::value_objects::{Address, Bytes};
use crate::engine::LedgerEngine;
use crate::errors::LedgerError;
use crate::ports::outbound::{KeySource, LedgerStore};
use tracing::{debug, warn};

impl<S: LedgerStore + Default, K: KeySource> LedgerEngine<S, K> {
    /// Submit `payload` to `target` one hop deeper than `ctx`.
    ///
    /// # Errors
    ///
    /// `TargetUnreachable` if `target` is not live or the hop limit is hit.
    /// Otherwise the target's own failure, unchanged.
    pub(crate) fn relay(
        &mut self,
        ctx: CallContext,
        target: Address,
        payload: &Bytes,
    ) -> Result<Outcome, LedgerError> {
        let child = ctx.forwarded();
        if !check_relay_depth_invariant(&child, &self.config) {
            warn!(target = %target, depth = ctx.depth, "Forward depth limit reached");
            return Err(LedgerError::TargetUnreachable(target));
        }
        if !self.lifecycle.is_alive(target) {
            return Err(LedgerError::TargetUnreachable(target));
        }

        debug!(target = %target, depth = child.depth, "Forwarding envelope");
        self.submit(child, target, payload.as_slice())
    }
}
