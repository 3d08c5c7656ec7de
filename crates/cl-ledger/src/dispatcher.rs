//! # Dispatcher
//!
//! Resolves a decoded selector against the unit's template, validates the
//! argument schema, and executes ledger operations.
//!
//! Lifecycle, relay and rotation calls resolve here but execute in the
//! engine, which owns the unit registry and key source.

use crate::codec::CallData;
use crate::domain::entities::{Log, UnitTemplate};
use crate::domain::ledger::{plan_approve, plan_mint, plan_transfer, plan_transfer_from, Commit};
use crate::domain::services::selector_of;
use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::LedgerError;
use crate::lifecycle::LedgerContext;
use crate::ports::outbound::LedgerStore;
use std::sync::OnceLock;

// =============================================================================
// SCHEMA
// =============================================================================

/// Argument type in a call signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    /// 20-byte address.
    Address,
    /// 32-byte big-endian word.
    Uint256,
    /// Opaque bytes of any length.
    Bytes,
}

impl Param {
    fn accepts(self, arg: &Bytes) -> bool {
        match self {
            Self::Address => arg.len() == Address::LEN,
            Self::Uint256 => arg.len() == 32,
            Self::Bytes => true,
        }
    }
}

/// Which templates expose a selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exposure {
    All,
    Only(UnitTemplate),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Mint,
    Transfer,
    Approve,
    TransferFrom,
    BalanceOf,
    Allowance,
    TotalSupply,
    Name,
    Symbol,
    Decimals,
    Destroy,
    ProxyForward,
    Forward,
    UpdateRingKey,
}

/// One row of the selector table.
#[derive(Clone, Copy, Debug)]
pub struct SchemaEntry {
    /// Canonical signature, e.g. `mint(address,uint256)`.
    pub signature: &'static str,
    /// Expected arguments.
    pub params: &'static [Param],
    op: Op,
    exposure: Exposure,
}

const ENTRIES: &[SchemaEntry] = &[
    SchemaEntry {
        signature: "mint(address,uint256)",
        params: &[Param::Address, Param::Uint256],
        op: Op::Mint,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "transfer(address,uint256)",
        params: &[Param::Address, Param::Uint256],
        op: Op::Transfer,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "approve(address,uint256)",
        params: &[Param::Address, Param::Uint256],
        op: Op::Approve,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "transferFrom(address,address,uint256)",
        params: &[Param::Address, Param::Address, Param::Uint256],
        op: Op::TransferFrom,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "balanceOf(address)",
        params: &[Param::Address],
        op: Op::BalanceOf,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "allowance(address,address)",
        params: &[Param::Address, Param::Address],
        op: Op::Allowance,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "totalSupply()",
        params: &[],
        op: Op::TotalSupply,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "name()",
        params: &[],
        op: Op::Name,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "symbol()",
        params: &[],
        op: Op::Symbol,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "decimals()",
        params: &[],
        op: Op::Decimals,
        exposure: Exposure::All,
    },
    SchemaEntry {
        signature: "destroy()",
        params: &[],
        op: Op::Destroy,
        exposure: Exposure::Only(UnitTemplate::SelfDestruct),
    },
    SchemaEntry {
        signature: "proxyForward(address,bytes)",
        params: &[Param::Address, Param::Bytes],
        op: Op::ProxyForward,
        exposure: Exposure::Only(UnitTemplate::Indirection),
    },
    SchemaEntry {
        signature: "forward(bytes)",
        params: &[Param::Bytes],
        op: Op::Forward,
        exposure: Exposure::Only(UnitTemplate::Indirection),
    },
    SchemaEntry {
        signature: "updateRingKey()",
        params: &[],
        op: Op::UpdateRingKey,
        exposure: Exposure::Only(UnitTemplate::RingKey),
    },
];

fn table() -> &'static [(Selector, SchemaEntry)] {
    static TABLE: OnceLock<Vec<(Selector, SchemaEntry)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ENTRIES
            .iter()
            .map(|entry| (selector_of(entry.signature), *entry))
            .collect()
    })
}

/// Selector for a signature in the table, if it is known.
#[must_use]
pub fn selector_for(signature: &str) -> Option<Selector> {
    table()
        .iter()
        .find(|(_, entry)| entry.signature == signature)
        .map(|(selector, _)| *selector)
}

/// Selectors the template answers to.
#[must_use]
pub fn exposed_signatures(template: UnitTemplate) -> Vec<&'static str> {
    table()
        .iter()
        .filter(|(_, entry)| entry.exposure.includes(template))
        .map(|(_, entry)| entry.signature)
        .collect()
}

impl Exposure {
    fn includes(self, template: UnitTemplate) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == template,
        }
    }
}

// =============================================================================
// CALLS
// =============================================================================

/// A resolved, schema-checked call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// Credit `to`.
    Mint {
        /// Recipient.
        to: Address,
        /// Amount.
        amount: U256,
    },
    /// Move from the caller to `to`.
    Transfer {
        /// Recipient.
        to: Address,
        /// Amount.
        amount: U256,
    },
    /// Set the caller's allowance for `spender`.
    Approve {
        /// Spender.
        spender: Address,
        /// New allowance.
        amount: U256,
    },
    /// Spend the caller's allowance from `from`.
    TransferFrom {
        /// Owner.
        from: Address,
        /// Recipient.
        to: Address,
        /// Amount.
        amount: U256,
    },
    /// Read a balance.
    BalanceOf {
        /// Account.
        account: Address,
    },
    /// Read an allowance.
    Allowance {
        /// Owner.
        owner: Address,
        /// Spender.
        spender: Address,
    },
    /// Read total supply.
    TotalSupply,
    /// Read token name.
    Name,
    /// Read token symbol.
    Symbol,
    /// Read token decimals.
    Decimals,
    /// Destroy the unit.
    Destroy,
    /// Relay `payload` to `target`.
    ProxyForward {
        /// Target unit.
        target: Address,
        /// Opaque envelope.
        payload: Bytes,
    },
    /// Relay `payload` to the unit's held target.
    Forward {
        /// Opaque envelope.
        payload: Bytes,
    },
    /// Rotate the ring.
    UpdateRingKey,
}

impl Call {
    /// Short operation name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transferFrom",
            Self::BalanceOf { .. } => "balanceOf",
            Self::Allowance { .. } => "allowance",
            Self::TotalSupply => "totalSupply",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Decimals => "decimals",
            Self::Destroy => "destroy",
            Self::ProxyForward { .. } => "proxyForward",
            Self::Forward { .. } => "forward",
            Self::UpdateRingKey => "updateRingKey",
        }
    }
}

/// Resolve `call` for a unit of `template`.
///
/// # Errors
///
/// `UnknownSelector` if the template does not expose the selector;
/// `SchemaMismatch` on wrong arity or argument width.
pub fn resolve(template: UnitTemplate, call: &CallData) -> Result<Call, LedgerError> {
    let entry = table()
        .iter()
        .find(|(selector, entry)| *selector == call.selector && entry.exposure.includes(template))
        .map(|(_, entry)| entry)
        .ok_or(LedgerError::UnknownSelector(call.selector))?;

    if call.args.len() != entry.params.len() {
        return Err(LedgerError::SchemaMismatch(format!(
            "{} expects {} arguments, got {}",
            entry.signature,
            entry.params.len(),
            call.args.len()
        )));
    }
    for (index, (param, arg)) in entry.params.iter().zip(&call.args).enumerate() {
        if !param.accepts(arg) {
            return Err(LedgerError::SchemaMismatch(format!(
                "{} argument {index}: {param:?} of {} bytes",
                entry.signature,
                arg.len()
            )));
        }
    }

    let args = &call.args;
    let call = match entry.op {
        Op::Mint => Call::Mint {
            to: address(&args[0]),
            amount: word(&args[1]),
        },
        Op::Transfer => Call::Transfer {
            to: address(&args[0]),
            amount: word(&args[1]),
        },
        Op::Approve => Call::Approve {
            spender: address(&args[0]),
            amount: word(&args[1]),
        },
        Op::TransferFrom => Call::TransferFrom {
            from: address(&args[0]),
            to: address(&args[1]),
            amount: word(&args[2]),
        },
        Op::BalanceOf => Call::BalanceOf {
            account: address(&args[0]),
        },
        Op::Allowance => Call::Allowance {
            owner: address(&args[0]),
            spender: address(&args[1]),
        },
        Op::TotalSupply => Call::TotalSupply,
        Op::Name => Call::Name,
        Op::Symbol => Call::Symbol,
        Op::Decimals => Call::Decimals,
        Op::Destroy => Call::Destroy,
        Op::ProxyForward => Call::ProxyForward {
            target: address(&args[0]),
            payload: args[1].clone(),
        },
        Op::Forward => Call::Forward {
            payload: args[0].clone(),
        },
        Op::UpdateRingKey => Call::UpdateRingKey,
    };
    Ok(call)
}

// Widths are checked in `resolve` before these run.
fn address(arg: &Bytes) -> Address {
    Address::from_slice(arg.as_slice()).unwrap_or(Address::ZERO)
}

fn word(arg: &Bytes) -> U256 {
    U256::from_big_endian(arg.as_slice())
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Return data and logs of a successful call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Return data.
    pub output: Bytes,
    /// Emitted logs.
    pub logs: Vec<Log>,
}

impl Outcome {
    /// Outcome returning `output` with no logs.
    #[must_use]
    pub fn returning(output: Bytes) -> Self {
        Self {
            output,
            logs: Vec::new(),
        }
    }
}

/// Execute a ledger call against `ledger` on behalf of `caller`.
///
/// Returns `None` for calls the engine handles itself (destroy, relay,
/// rotation).
///
/// # Errors
///
/// Ledger failures (`InvalidAmount`, `Overflow`, `InsufficientBalance`).
/// Nothing is written on error.
pub fn execute_ledger_call<S: LedgerStore>(
    ledger: &mut LedgerContext<S>,
    unit: Address,
    caller: Address,
    call: &Call,
) -> Result<Option<Outcome>, LedgerError> {
    let store = &ledger.store;
    let commit = match call {
        Call::Mint { to, amount } => plan_mint(store, *to, *amount)?,
        Call::Transfer { to, amount } => plan_transfer(store, caller, *to, *amount)?,
        Call::Approve { spender, amount } => plan_approve(caller, *spender, *amount),
        Call::TransferFrom { from, to, amount } => {
            plan_transfer_from(store, caller, *from, *to, *amount)?
        }
        Call::BalanceOf { account } => {
            return Ok(Some(Outcome::returning(Bytes::from_u256(
                store.balance(account),
            ))))
        }
        Call::Allowance { owner, spender } => {
            return Ok(Some(Outcome::returning(Bytes::from_u256(
                store.allowance(owner, spender),
            ))))
        }
        Call::TotalSupply => {
            return Ok(Some(Outcome::returning(Bytes::from_u256(
                store.total_supply(),
            ))))
        }
        Call::Name => {
            return Ok(Some(Outcome::returning(Bytes::from_slice(
                ledger.metadata.name.as_bytes(),
            ))))
        }
        Call::Symbol => {
            return Ok(Some(Outcome::returning(Bytes::from_slice(
                ledger.metadata.symbol.as_bytes(),
            ))))
        }
        Call::Decimals => {
            return Ok(Some(Outcome::returning(Bytes::from_u256(U256::from(
                ledger.metadata.decimals,
            )))))
        }
        Call::Destroy
        | Call::ProxyForward { .. }
        | Call::Forward { .. }
        | Call::UpdateRingKey => return Ok(None),
    };
    Ok(Some(commit_outcome(commit, &mut ledger.store, unit)))
}

fn commit_outcome<S: LedgerStore>(commit: Commit, store: &mut S, unit: Address) -> Outcome {
    let logs = commit
        .apply_to(store)
        .iter()
        .map(|event| event.to_log(unit))
        .collect();
    Outcome {
        output: Bytes::from_u256(U256::one()),
        logs,
    }
}

// =============================================================================
// TESTS
// =============================================================================
