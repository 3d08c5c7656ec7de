//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the confidential ledger.
//!
//! - **Driving Ports (Inbound)**: `ConfidentialLedgerApi`
//! - **Driven Ports (Outbound)**: `LedgerStore`, `KeySource`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
