//! # Domain Layer (Inner Hexagon)
//!
//! Pure ledger logic: value objects, entities, ledger operations, the ring
//! key manager, invariants. No I/O, no locking.

pub mod entities;
pub mod invariants;
pub mod ledger;
pub mod ring;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use ledger::*;
pub use ring::*;
pub use services::*;
pub use value_objects::*;
