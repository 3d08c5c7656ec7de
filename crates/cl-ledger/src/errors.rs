//! # Error Types
//!
//! All error types for the confidential ledger.
//!
//! `LedgerError` carries context for logs and tests; receipts only ever expose
//! the payload-free [`ErrorKind`].

use crate::domain::value_objects::{Address, Selector, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERROR KIND (receipt-visible)
// =============================================================================

/// Failure kinds surfaced to callers in receipts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Amount was zero where a positive amount is required.
    InvalidAmount,
    /// Balance or supply would exceed `U256::MAX`.
    Overflow,
    /// Balance or allowance below the requested amount.
    InsufficientBalance,
    /// Envelope failed structural parsing.
    MalformedEnvelope,
    /// Sealed envelope could not be opened (any cause).
    DecryptionFailed,
    /// Selector or arguments do not match a known schema.
    SchemaMismatch,
    /// Unit is destroyed or was never created.
    UnitNotLive,
    /// Relay target has no live unit.
    TargetUnreachable,
    /// Ring is full and eviction is disabled.
    RingCapacityExceeded,
}

impl ErrorKind {
    /// Stable numeric status code (0 is reserved for success).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::InvalidAmount => 1,
            Self::Overflow => 2,
            Self::InsufficientBalance => 3,
            Self::MalformedEnvelope => 4,
            Self::DecryptionFailed => 5,
            Self::SchemaMismatch => 6,
            Self::UnitNotLive => 7,
            Self::TargetUnreachable => 8,
            Self::RingCapacityExceeded => 9,
        }
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors produced by ledger, ring, codec, dispatch and lifecycle operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount must be positive.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow crediting {account:?}")]
    Overflow {
        /// Account being credited.
        account: Address,
    },

    /// Source balance or allowance too small.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Requested amount.
        required: U256,
        /// Amount available.
        available: U256,
    },

    /// Structural defect in an envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// No candidate key opened the envelope, or it was replayed.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Unknown selector for the unit's template.
    #[error("unknown selector {0:?}")]
    UnknownSelector(Selector),

    /// Argument arity or width mismatch.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Unit is not alive.
    #[error("unit not live: {0:?}")]
    UnitNotLive(Address),

    /// Relay target unreachable.
    #[error("target unreachable: {0:?}")]
    TargetUnreachable(Address),

    /// Ring full with eviction disabled.
    #[error("ring capacity exceeded: {capacity} keys")]
    RingCapacityExceeded {
        /// Configured ring capacity.
        capacity: usize,
    },
}

impl LedgerError {
    /// Projects the error onto its receipt-visible kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount => ErrorKind::InvalidAmount,
            Self::Overflow { .. } => ErrorKind::Overflow,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            Self::DecryptionFailed => ErrorKind::DecryptionFailed,
            Self::UnknownSelector(_) | Self::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            Self::UnitNotLive(_) => ErrorKind::UnitNotLive,
            Self::TargetUnreachable(_) => ErrorKind::TargetUnreachable,
            Self::RingCapacityExceeded { .. } => ErrorKind::RingCapacityExceeded,
        }
    }
}

impl From<cl_crypto::CryptoError> for LedgerError {
    fn from(_: cl_crypto::CryptoError) -> Self {
        LedgerError::DecryptionFailed
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },

    /// TOML parse error.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================
