//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.

pub mod key_source;
pub mod ledger_store;

pub use key_source::*;
pub use ledger_store::*;
