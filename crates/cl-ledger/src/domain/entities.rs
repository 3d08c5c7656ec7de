//! # Core Domain Entities
//!
//! Main business entities of the confidential ledger: accounts, units,
//! receipts and the state changes that move the ledger forward.

use crate::domain::value_objects::{Address, Bytes, Hash, LedgerId, U256};
use crate::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ACCOUNT
// =============================================================================

/// Account entry in a ledger store. Never deleted, only zeroed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub address: Address,
    /// Current balance.
    pub balance: U256,
}

// =============================================================================
// STATE CHANGE
// =============================================================================

/// One write in an atomic ledger commit.
///
/// Values are absolute (the new value), computed with checked arithmetic
/// before any of them is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Set an account balance.
    Balance {
        /// Account.
        account: Address,
        /// New balance.
        value: U256,
    },
    /// Set an allowance.
    Allowance {
        /// Token owner.
        owner: Address,
        /// Approved spender.
        spender: Address,
        /// New allowance.
        value: U256,
    },
    /// Set total supply.
    TotalSupply {
        /// New supply.
        value: U256,
    },
}

// =============================================================================
// TOKEN METADATA
// =============================================================================

/// ERC-20 style metadata stored with a logical ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Display decimals.
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "MyToken".to_string(),
            symbol: "MTK".to_string(),
            decimals: 18,
        }
    }
}

// =============================================================================
// UNIT
// =============================================================================

/// Unit variants selectable by template name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitTemplate {
    /// Plain ledger-fronting unit.
    Plain,
    /// Unit that accepts `destroy()`.
    SelfDestruct,
    /// Unit that can forward opaque calls to other units.
    Indirection,
    /// Unit that consumes ring-key sealed envelopes and rotates its ring.
    RingKey,
}

impl UnitTemplate {
    /// Whether the unit can be destroyed.
    #[must_use]
    pub const fn can_destroy(self) -> bool {
        matches!(self, Self::SelfDestruct)
    }

    /// Whether the unit can relay calls.
    #[must_use]
    pub const fn can_forward(self) -> bool {
        matches!(self, Self::Indirection)
    }

    /// Whether the unit owns a rotating ring.
    #[must_use]
    pub const fn consumes_ring_keys(self) -> bool {
        matches!(self, Self::RingKey)
    }

    /// Canonical template name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::SelfDestruct => "self-destruct",
            Self::Indirection => "indirection",
            Self::RingKey => "ring-key",
        }
    }
}

impl FromStr for UnitTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" | "MyToken" => Ok(Self::Plain),
            "self-destruct" | "MyTokenSelfDestruct" => Ok(Self::SelfDestruct),
            "indirection" => Ok(Self::Indirection),
            "ring-key" => Ok(Self::RingKey),
            other => Err(format!("unknown unit template: {other}")),
        }
    }
}

impl fmt::Display for UnitTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Liveness of one unit incarnation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    /// Never created at this address.
    Uninitialized,
    /// Accepting dispatch.
    Alive,
    /// Destroyed; may be re-created.
    Destroyed,
}

/// Front-end record of a unit. Holds only an index into the ledger arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitRecord {
    /// Unit address.
    pub address: Address,
    /// Template the unit was created from.
    pub template: UnitTemplate,
    /// Ledger this unit fronts.
    pub ledger: LedgerId,
    /// Held indirection target, if any.
    pub relay_target: Option<Address>,
    /// Incarnation counter, bumped on every re-creation.
    pub incarnation: u32,
    /// Liveness.
    pub state: UnitState,
}

impl UnitRecord {
    /// Whether this incarnation accepts dispatch.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state == UnitState::Alive
    }
}

/// Constructor arguments for `create`.
#[derive(Clone, Debug, Default)]
pub struct ConstructorArgs {
    /// Deploying account; feeds address derivation.
    pub deployer: Address,
    /// Existing ledger to attach instead of allocating a new one.
    pub attach: Option<LedgerId>,
    /// Indirection target held by the unit.
    pub relay_target: Option<Address>,
    /// Token metadata for a freshly allocated ledger.
    pub metadata: Option<TokenMetadata>,
}

impl ConstructorArgs {
    /// Arguments for a deployer with default metadata.
    #[must_use]
    pub fn from_deployer(deployer: Address) -> Self {
        Self {
            deployer,
            ..Self::default()
        }
    }

    /// Attach to an existing ledger.
    #[must_use]
    pub fn attach_to(mut self, ledger: LedgerId) -> Self {
        self.attach = Some(ledger);
        self
    }

    /// Hold an indirection target.
    #[must_use]
    pub fn with_relay_target(mut self, target: Address) -> Self {
        self.relay_target = Some(target);
        self
    }

    /// Use custom token metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: TokenMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Reference used by read entrypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerRef {
    /// Resolve through a unit address (destroyed units still resolve).
    Unit(Address),
    /// Address the ledger directly.
    Ledger(LedgerId),
}

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Caller-side context of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Account on whose authority the call runs.
    pub caller: Address,
    /// Value attached to the call.
    pub value: U256,
    /// Relay depth (0 for direct submissions).
    pub depth: u16,
}

impl CallContext {
    /// Top-level call with no value.
    #[must_use]
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::zero(),
            depth: 0,
        }
    }

    /// Child context for a relayed call; authority and value pass through.
    #[must_use]
    pub fn forwarded(&self) -> Self {
        Self {
            caller: self.caller,
            value: self.value,
            depth: self.depth.saturating_add(1),
        }
    }
}

// =============================================================================
// LOGS & RECEIPTS
// =============================================================================

/// Event emitted during a successful call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Unit address that emitted the log.
    pub address: Address,
    /// Indexed topics (signature hash first).
    pub topics: Vec<Hash>,
    /// Non-indexed data.
    pub data: Bytes,
}

impl Log {
    /// Creates a new log.
    #[must_use]
    pub fn new(address: Address, topics: Vec<Hash>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }
}

/// Outcome of a call: success, or exactly one failure kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// Call applied.
    Success,
    /// Call rejected; nothing applied.
    Failure(ErrorKind),
}

/// Result of a submission as seen by the external caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unit the call was submitted to.
    pub unit: Address,
    /// Status.
    pub status: ReceiptStatus,
    /// Return data (empty on failure).
    pub output: Bytes,
    /// Logs (empty on failure).
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Successful receipt.
    #[must_use]
    pub fn success(unit: Address, output: Bytes, logs: Vec<Log>) -> Self {
        Self {
            unit,
            status: ReceiptStatus::Success,
            output,
            logs,
        }
    }

    /// Failed receipt carrying only the error kind.
    #[must_use]
    pub fn failure(unit: Address, kind: ErrorKind) -> Self {
        Self {
            unit,
            status: ReceiptStatus::Failure(kind),
            output: Bytes::new(),
            logs: Vec::new(),
        }
    }

    /// True on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    /// Failure kind, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.status {
            ReceiptStatus::Success => None,
            ReceiptStatus::Failure(kind) => Some(kind),
        }
    }

    /// Numeric status code: 0 on success, else [`ErrorKind::code`].
    #[must_use]
    pub fn status_code(&self) -> u8 {
        self.error_kind().map_or(0, ErrorKind::code)
    }

    /// Return data decoded as a U256 word.
    #[must_use]
    pub fn output_u256(&self) -> Option<U256> {
        self.output.to_u256()
    }
}

// =============================================================================
// TESTS
// =============================================================================
