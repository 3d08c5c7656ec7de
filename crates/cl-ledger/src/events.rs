//! # Ledger Events
//!
//! Events emitted by successful calls, and their log encoding.
//!
//! Topic 0 is `keccak256` of the event signature; indexed addresses follow as
//! left-padded words; amounts go in the data section as 32-byte words.

use crate::domain::entities::Log;
use crate::domain::services::event_topic;
use crate::domain::value_objects::{Address, Bytes, Hash, LedgerId, U256};

/// Event signatures.
pub mod topics {
    /// ERC-20 transfer (mint uses the zero address as source).
    pub const TRANSFER: &str = "Transfer(address,address,uint256)";
    /// ERC-20 approval.
    pub const APPROVAL: &str = "Approval(address,address,uint256)";
    /// Unit destruction; data carries the surviving ledger id.
    pub const UNIT_DESTROYED: &str = "UnitDestroyed(address,uint32)";
    /// Ring rotation; data carries the new epoch and the evicted epoch (or `u64::MAX`).
    pub const RING_KEY_ROTATED: &str = "RingKeyRotated(uint64,uint64)";
}

/// Domain events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Tokens moved (or minted from the zero address).
    Transfer {
        /// Source.
        from: Address,
        /// Destination.
        to: Address,
        /// Amount.
        value: U256,
    },
    /// Allowance set.
    Approval {
        /// Owner.
        owner: Address,
        /// Spender.
        spender: Address,
        /// New allowance.
        value: U256,
    },
    /// A unit incarnation was destroyed; its ledger survives.
    UnitDestroyed {
        /// Destroyed unit.
        unit: Address,
        /// Ledger left intact.
        ledger: LedgerId,
    },
    /// The ring rotated.
    RingKeyRotated {
        /// Epoch of the new key.
        epoch: u64,
        /// Epoch of the evicted key, if any.
        evicted_epoch: Option<u64>,
    },
}

impl LedgerEvent {
    /// Encode as a log emitted by `unit`.
    #[must_use]
    pub fn to_log(&self, unit: Address) -> Log {
        match self {
            Self::Transfer { from, to, value } => Log::new(
                unit,
                vec![
                    event_topic(topics::TRANSFER),
                    Hash::from_address(*from),
                    Hash::from_address(*to),
                ],
                Bytes::from_u256(*value),
            ),
            Self::Approval {
                owner,
                spender,
                value,
            } => Log::new(
                unit,
                vec![
                    event_topic(topics::APPROVAL),
                    Hash::from_address(*owner),
                    Hash::from_address(*spender),
                ],
                Bytes::from_u256(*value),
            ),
            Self::UnitDestroyed { unit: destroyed, ledger } => Log::new(
                unit,
                vec![
                    event_topic(topics::UNIT_DESTROYED),
                    Hash::from_address(*destroyed),
                ],
                Bytes::from(ledger.0.to_be_bytes().to_vec()),
            ),
            Self::RingKeyRotated {
                epoch,
                evicted_epoch,
            } => {
                let mut data = Vec::with_capacity(16);
                data.extend_from_slice(&epoch.to_be_bytes());
                data.extend_from_slice(&evicted_epoch.unwrap_or(u64::MAX).to_be_bytes());
                Log::new(unit, vec![event_topic(topics::RING_KEY_ROTATED)], Bytes::from(data))
            }
        }
    }
}

/// Amount carried by a Transfer/Approval log, if the log is one of those.
#[must_use]
pub fn log_amount(log: &Log) -> Option<U256> {
    let first = log.topics.first()?;
    let is_amount_event =
        *first == event_topic(topics::TRANSFER) || *first == event_topic(topics::APPROVAL);
    if is_amount_event {
        log.data.to_u256()
    } else {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
