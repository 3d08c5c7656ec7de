//! # CL-Ledger - Resilient Confidential Ledger Engine
//!
//! An account-balance ledger whose storage outlives the code unit fronting
//! it, behind a decrypt-then-dispatch pipeline keyed by a rotating ring of
//! asymmetric decryption keys.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Ledger survives unit destruction | `lifecycle.rs` - arena indexed by `LedgerId` |
//! | At most K active ring keys, FIFO eviction | `domain/ring.rs` - `RingKeyManager::rotate()` |
//! | Balances sum to total supply | `domain/ledger.rs` - checked plans; `domain/invariants.rs` |
//! | No partial application | `domain/ledger.rs` - `Commit` applied in one batch |
//! | Failures reveal only a kind | `service.rs` - `Receipt::failure()` |
//! | Relay depth bounded | `relay.rs` - `check_relay_depth_invariant()` |
//!
//! ## Submission Pipeline
//!
//! ```text
//! raw bytes -> lifecycle (UnitNotLive)
//!           -> codec::open (MalformedEnvelope | DecryptionFailed)
//!           -> replay window (DecryptionFailed)
//!           -> dispatcher::resolve (SchemaMismatch)
//!           -> ledger / lifecycle / relay / ring
//!           -> Receipt
//! ```
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Ledger store | `ports/outbound.rs`, `adapters/ledger_store.rs` | Balances, allowances, supply |
//! | Ring key manager | `domain/ring.rs` | Bounded rotating decryption keys |
//! | Envelope codec | `codec/` | Frames, call bodies, sealing, replay |
//! | Dispatcher | `dispatcher.rs` | Selector table and ledger calls |
//! | Lifecycle | `lifecycle.rs` | Create / destroy / recreate |
//! | Relay | `relay.rs` | Opaque forwarding between units |
//! | Service | `service.rs` | Locking, receipts, stats |
//!
//! ## Usage Example
//!
//! ```ignore
//! use cl_ledger::prelude::*;
//!
//! let service = create_service(LedgerConfig::default());
//! let unit = service.create("MyToken", ConstructorArgs::from_deployer(deployer))?;
//!
//! let mint = codec::encode(
//!     selector_of("mint(address,uint256)"),
//!     vec![Bytes::from_address(alice), Bytes::from_u256(U256::from(10))],
//! )?;
//! let receipt = service.submit(alice, unit, &mint, U256::zero());
//! assert!(receipt.is_success());
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod relay;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Account, CallContext, ConstructorArgs, LedgerRef, Log, Receipt, ReceiptStatus,
        StateChange, TokenMetadata, UnitRecord, UnitState, UnitTemplate,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, Hash, LedgerId, Selector, U256};

    // Domain services
    pub use crate::domain::services::{compute_unit_address, event_topic, keccak256, selector_of};

    // Ring
    pub use crate::domain::ring::{RingKey, RingKeyManager, RingKeyStatus, RotationOutcome};

    // Invariants
    pub use crate::domain::invariants::{
        check_ledger_invariants, check_receipt_invariant, check_relay_depth_invariant,
        check_ring_invariant, check_supply_invariant, InvariantCheckResult, InvariantViolation,
    };

    // Codec
    pub use crate::codec::{self, CallData, DecodedEnvelope, FrameKind, ReplayGuard};

    // Dispatcher
    pub use crate::dispatcher::{resolve, selector_for, Call, Outcome};

    // Ports
    pub use crate::ports::inbound::ConfidentialLedgerApi;
    pub use crate::ports::outbound::{KeySource, LedgerStore};

    // Events
    pub use crate::events::{log_amount, topics, LedgerEvent};

    // Config & errors
    pub use crate::config::{EvictionPolicy, LedgerConfig, RingConfig};
    pub use crate::errors::{ConfigError, ErrorKind, LedgerError};

    // Engine, adapters, service
    pub use crate::adapters::{InMemoryLedgerStore, OsKeySource, SeededKeySource};
    pub use crate::engine::LedgerEngine;
    pub use crate::lifecycle::{LedgerContext, UnitLifecycle};
    pub use crate::service::{create_service, create_test_service, LedgerService, ServiceStats};

    // Crypto
    pub use cl_crypto::{RingKeyPair, RingPublicKey};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire frame version understood by this build.
pub const WIRE_VERSION: u8 = codec::FRAME_VERSION;

/// Component name.
pub const COMPONENT_NAME: &str = "Confidential Ledger";

// =============================================================================
// TESTS
// =============================================================================
