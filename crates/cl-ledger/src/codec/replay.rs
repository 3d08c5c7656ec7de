//! Per-ledger replay guard for sealed envelopes.

use crate::errors::LedgerError;
use cl_crypto::Nonce;
use std::collections::{HashSet, VecDeque};

/// Remembers the most recent `window` sealed-envelope nonces (FIFO).
#[derive(Debug, Clone)]
pub struct ReplayGuard {
    window: usize,
    order: VecDeque<Nonce>,
    seen: HashSet<Nonce>,
}

impl ReplayGuard {
    /// Guard remembering up to `window` nonces.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window,
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Record `nonce`, rejecting it if already inside the window.
    ///
    /// # Errors
    ///
    /// `DecryptionFailed` for a replay, so callers cannot tell it apart from
    /// a wrong key.
    pub fn admit(&mut self, nonce: Nonce) -> Result<(), LedgerError> {
        if self.window == 0 {
            return Ok(());
        }
        if !self.seen.insert(nonce) {
            return Err(LedgerError::DecryptionFailed);
        }
        self.order.push_back(nonce);
        if self.order.len() > self.window {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        Ok(())
    }

    /// Nonces currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if nothing has been admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
